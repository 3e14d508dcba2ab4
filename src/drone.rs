//  DRONE.rs
//    by Lut99
//
//  Created:
//    18 Feb 2025, 09:12:40
//  Last edited:
//    21 Feb 2025, 11:20:36
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the drone-delivery planning domain.
//!
//!   A drone starts at its base with a full battery. Packages wait at a
//!   pickup point, one per target, and the drone has to bring every package
//!   to its target (carrying one at a time) and then return to base. Every
//!   flight drains the battery by its length; the battery can be recharged
//!   for free, but only at the base.
//!
//!   [`DroneDomain`] describes the parameters of such a problem, and grounds
//!   them into an [`ActionSet`] that any search driver can work with.
//!   [`DeliveryHeuristic`] is a consistent heuristic for A*.
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::action::{self, Action, ActionSet, Cost};
use crate::fluent::{Fluent, Interner};
use crate::log::{debug, trace};
use crate::search::Heuristic;
use crate::state::{Goal, State};


/***** CONSTANTS *****/
/// Location names that targets may not use, since they already mean something else.
pub const RESERVED_NAMES: [&str; 3] = ["base", "pickup", "none"];





/***** ERRORS *****/
/// Defines errors that occur when grounding a [`DroneDomain`].
#[derive(Debug)]
pub enum Error {
    /// A flight costs nothing, or more than a full battery.
    IllegalCost { flight: String, cost: Cost, capacity: Cost },
    /// A target was given without a name.
    EmptyTarget,
    /// A target uses a name that is reserved for another location.
    ReservedTarget { id: String },
    /// The grounded actions did not form a valid action set.
    Actions { err: action::Error },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::IllegalCost { flight, cost, capacity } => {
                write!(f, "Flight {flight} costs {cost}, but flights must cost at least 1 and at most the battery capacity ({capacity})")
            },
            Self::EmptyTarget => write!(f, "Target with an empty name given"),
            Self::ReservedTarget { id } => write!(f, "Target name \"{id}\" is reserved (cannot be any of {})", RESERVED_NAMES.iter().join(", ")),
            Self::Actions { .. } => write!(f, "Failed to build action set from grounded actions"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn 'static + error::Error)> {
        match self {
            Self::IllegalCost { .. } | Self::EmptyTarget | Self::ReservedTarget { .. } => None,
            Self::Actions { err } => Some(err),
        }
    }
}





/***** HELPERS *****/
/// Grounds a single flight.
///
/// # Arguments
/// - `fluents`: An [`Interner`] to take the battery fluents from.
/// - `from`: The location fluent of where the flight departs.
/// - `to`: The location fluent of where the flight arrives.
/// - `level`: The battery level before the flight.
/// - `cost`: The length of the flight.
///
/// # Returns
/// An [`Action`] named `fly_<from>_to_<to>_b<level>`.
fn flight(fluents: &mut Interner, from: (&str, &Fluent), to: (&str, &Fluent), level: Cost, cost: Cost) -> Action {
    let (before, after): (Fluent, Fluent) = (battery(fluents, level), battery(fluents, level - cost));
    Action::new(format!("fly_{}_to_{}_b{level}", from.0, to.0))
        .pre([from.1.clone(), before.clone()])
        .add([to.1.clone(), after])
        .del([from.1.clone(), before])
        .cost(cost)
}

/// Returns the fluent that says the battery is at the given level.
#[inline]
fn battery(fluents: &mut Interner, level: Cost) -> Fluent { fluents.intern(format!("battery_{level}")) }





/***** LIBRARY *****/
/// The parameters of a drone-delivery problem.
///
/// The [`Default`] is a drone with a battery of 10 units, a pickup point 2 units away from the base
/// and five targets `c1` to `c5`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DroneDomain {
    /// The battery level when full.
    capacity: Cost,
    /// The length of a flight between the base and the pickup point.
    base_pickup_cost: Cost,
    /// The targets to deliver to, mapped to the length of a flight between them and the pickup
    /// point, which is also the length of a flight between them and the base.
    targets: IndexMap<String, Cost>,
}
impl Default for DroneDomain {
    #[inline]
    fn default() -> Self {
        Self::new(10, 2).target("c1", 2).target("c2", 2).target("c3", 3).target("c4", 4).target("c5", 3)
    }
}

// Constructors
impl DroneDomain {
    /// Constructor for the DroneDomain without any targets.
    ///
    /// # Arguments
    /// - `capacity`: The battery level when full.
    /// - `base_pickup_cost`: The length of a flight between the base and the pickup point.
    ///
    /// # Returns
    /// A new DroneDomain. Use [`DroneDomain::target()`] to add targets.
    #[inline]
    pub fn new(capacity: Cost, base_pickup_cost: Cost) -> Self { Self { capacity, base_pickup_cost, targets: IndexMap::new() } }

    /// Sets the battery capacity.
    #[inline]
    pub fn capacity(mut self, capacity: Cost) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the length of a flight between the base and the pickup point.
    #[inline]
    pub fn base_pickup_cost(mut self, cost: Cost) -> Self {
        self.base_pickup_cost = cost;
        self
    }

    /// Adds a target, or changes the cost of an existing one.
    ///
    /// # Arguments
    /// - `id`: The name of the target.
    /// - `cost`: The length of a flight between the target and either the pickup point or the base.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn target(mut self, id: impl Into<String>, cost: Cost) -> Self {
        self.targets.insert(id.into(), cost);
        self
    }

    /// Replaces all targets.
    ///
    /// # Arguments
    /// - `targets`: The new (name, cost)-pairs, in the order in which their actions are grounded.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn targets(mut self, targets: impl IntoIterator<Item = (impl Into<String>, Cost)>) -> Self {
        self.targets = targets.into_iter().map(|(id, cost)| (id.into(), cost)).collect();
        self
    }
}

// Collection
impl DroneDomain {
    /// Returns the battery capacity.
    #[inline]
    pub fn get_capacity(&self) -> Cost { self.capacity }

    /// Returns the length of a flight between the base and the pickup point.
    #[inline]
    pub fn get_base_pickup_cost(&self) -> Cost { self.base_pickup_cost }

    /// Returns the targets and the lengths of the flights to them.
    #[inline]
    pub fn get_targets(&self) -> &IndexMap<String, Cost> { &self.targets }
}

// Grounding
impl DroneDomain {
    /// Checks that the parameters describe a sensible problem.
    ///
    /// # Errors
    /// This function errors if any flight costs nothing or more than a full battery, or if any
    /// target's name is empty or reserved (see [`RESERVED_NAMES`]).
    pub fn validate(&self) -> Result<(), Error> {
        let check = |flight: String, cost: Cost| -> Result<(), Error> {
            if cost < 1 || cost > self.capacity {
                return Err(Error::IllegalCost { flight, cost, capacity: self.capacity });
            }
            Ok(())
        };

        check("base <-> pickup".into(), self.base_pickup_cost)?;
        for (id, cost) in &self.targets {
            if id.is_empty() {
                return Err(Error::EmptyTarget);
            }
            if RESERVED_NAMES.contains(&id.as_str()) {
                return Err(Error::ReservedTarget { id: id.clone() });
            }
            check(format!("pickup <-> {id}"), *cost)?;
        }
        Ok(())
    }

    /// Builds every ground action of this domain.
    ///
    /// Nothing is pruned: there is one flight for every battery level that can afford it, even if
    /// the drone can never be at that level in that place.
    ///
    /// # Returns
    /// An [`ActionSet`] with, in order: the base/pickup-flights, every target's flights, the
    /// package pickups, the deliveries and the recharges. Flights are ordered by the battery level
    /// they start with.
    ///
    /// # Errors
    /// This function errors if the domain does not [validate](DroneDomain::validate()), or if two
    /// targets' names combine into the same action name.
    pub fn ground_actions(&self) -> Result<ActionSet, Error> {
        self.validate()?;

        let mut fluents = Interner::new();
        let at_base: Fluent = fluents.intern("at_base");
        let at_pickup: Fluent = fluents.intern("at_pickup");
        let carrying_none: Fluent = fluents.intern("carrying_none");
        let full: Fluent = battery(&mut fluents, self.capacity);

        let mut actions: Vec<Action> = Vec::new();
        for level in self.base_pickup_cost..=self.capacity {
            actions.push(flight(&mut fluents, ("base", &at_base), ("pickup", &at_pickup), level, self.base_pickup_cost));
            actions.push(flight(&mut fluents, ("pickup", &at_pickup), ("base", &at_base), level, self.base_pickup_cost));
        }
        for (id, cost) in &self.targets {
            let at_target: Fluent = fluents.intern(format!("at_{id}"));
            for level in *cost..=self.capacity {
                actions.push(flight(&mut fluents, ("pickup", &at_pickup), (id.as_str(), &at_target), level, *cost));
                actions.push(flight(&mut fluents, (id.as_str(), &at_target), ("pickup", &at_pickup), level, *cost));
                actions.push(flight(&mut fluents, (id.as_str(), &at_target), ("base", &at_base), level, *cost));
            }
        }
        for id in self.targets.keys() {
            let waiting: Fluent = fluents.intern(format!("package_{id}_at_pickup"));
            actions.push(
                Action::new(format!("pickup_package_{id}"))
                    .pre([at_pickup.clone(), carrying_none.clone(), waiting.clone()])
                    .add([fluents.intern(format!("carrying_{id}"))])
                    .del([carrying_none.clone(), waiting])
                    .cost(0),
            );
        }
        for id in self.targets.keys() {
            let carrying: Fluent = fluents.intern(format!("carrying_{id}"));
            actions.push(
                Action::new(format!("deliver_package_{id}"))
                    .pre([fluents.intern(format!("at_{id}")), carrying.clone()])
                    .add([fluents.intern(format!("delivered_{id}")), carrying_none.clone()])
                    .del([carrying])
                    .cost(0),
            );
        }
        for level in 0..self.capacity {
            let low: Fluent = battery(&mut fluents, level);
            actions.push(Action::new(format!("recharge_at_base_b{level}")).pre([at_base.clone(), low.clone()]).add([full.clone()]).del([low]).cost(0));
        }
        debug!("Grounded {} action(s) over {} fluent(s) for {self}", actions.len(), fluents.len());
        for action in &actions {
            trace!("--> {action}");
        }

        ActionSet::new(actions).map_err(|err| Error::Actions { err })
    }

    /// Builds the state in which the drone starts.
    ///
    /// # Returns
    /// A [`State`] where the drone is at base with a full battery and all packages wait at the pickup
    /// point.
    pub fn initial_state(&self) -> State {
        let mut fluents: Vec<Fluent> = vec![Fluent::new("at_base"), Fluent::new(format!("battery_{}", self.capacity)), Fluent::new("carrying_none")];
        fluents.extend(self.targets.keys().map(|id| Fluent::new(format!("package_{id}_at_pickup"))));
        State::new(fluents)
    }

    /// Builds the goal of delivering every package and returning to base.
    #[inline]
    pub fn goal(&self) -> Goal {
        Goal::new(std::iter::once(Fluent::new("at_base")).chain(self.targets.keys().map(|id| Fluent::new(format!("delivered_{id}")))))
    }

    /// Builds the [`DeliveryHeuristic`] for this domain and the given goal.
    #[inline]
    pub fn heuristic(&self, goal: &Goal) -> DeliveryHeuristic { DeliveryHeuristic::new(self, goal) }
}
impl Display for DroneDomain {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(
            f,
            "drone with capacity {}, base <-> pickup {}, targets {{{}}}",
            self.capacity,
            self.base_pickup_cost,
            self.targets.iter().map(|(id, cost)| format!("{id}: {cost}")).join(", ")
        )
    }
}



/// An admissible and consistent heuristic for the drone-delivery domain.
///
/// It adds two lower bounds that don't share any flights:
/// - every package that still has to be delivered needs at least the flight from the pickup point
///   to its target, unless the drone is already there carrying it; and
/// - if the drone has to end at base but isn't there, it has to fly back at some point. From a
///   target, it must at least leave that target, which costs that target's length; from the pickup
///   point, its last flight home comes from either the pickup point or some target, whichever is
///   shorter.
///
/// Battery levels are ignored; recharging is free.
#[derive(Clone, Debug)]
pub struct DeliveryHeuristic {
    /// Every target, with whether the goal wants its package delivered.
    targets: Vec<(TargetFluents, bool)>,
    /// Whether the goal demands that the drone is at base.
    return_home: bool,
    /// The `at_base`-fluent.
    at_base: Fluent,
    /// The `at_pickup`-fluent.
    at_pickup: Fluent,
    /// The shortest flight home that can follow the pickup point.
    from_pickup: Cost,
}
impl DeliveryHeuristic {
    /// Constructor for the DeliveryHeuristic.
    ///
    /// # Arguments
    /// - `domain`: The [`DroneDomain`] to estimate for.
    /// - `goal`: The [`Goal`] to estimate the distance to.
    ///
    /// # Returns
    /// A new DeliveryHeuristic.
    pub fn new(domain: &DroneDomain, goal: &Goal) -> Self {
        let targets: Vec<(TargetFluents, bool)> = domain
            .targets
            .iter()
            .map(|(id, cost)| {
                let target = TargetFluents {
                    at:        Fluent::new(format!("at_{id}")),
                    carrying:  Fluent::new(format!("carrying_{id}")),
                    delivered: Fluent::new(format!("delivered_{id}")),
                    cost:      *cost,
                };
                let wanted: bool = goal.contains(&target.delivered);
                (target, wanted)
            })
            .collect();
        Self {
            targets,
            return_home: goal.contains("at_base"),
            at_base: Fluent::new("at_base"),
            at_pickup: Fluent::new("at_pickup"),
            from_pickup: domain.targets.values().copied().fold(domain.base_pickup_cost, Cost::min),
        }
    }
}
impl Heuristic for DeliveryHeuristic {
    fn estimate(&self, state: &State) -> Cost {
        let mut estimate: Cost = 0;
        for (target, wanted) in &self.targets {
            if *wanted && !state.contains(&target.delivered) && !(state.contains(&target.at) && state.contains(&target.carrying)) {
                estimate += target.cost;
            }
        }
        if self.return_home && !state.contains(&self.at_base) {
            if state.contains(&self.at_pickup) {
                estimate += self.from_pickup;
            } else if let Some((target, _)) = self.targets.iter().find(|(target, _)| state.contains(&target.at)) {
                estimate += target.cost;
            }
        }
        estimate
    }
}

/// The fluents that [`DeliveryHeuristic`] looks at for a single target.
#[derive(Clone, Debug)]
struct TargetFluents {
    at:        Fluent,
    carrying:  Fluent,
    delivered: Fluent,
    /// The target's length.
    cost:      Cost,
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::audit::{cross_check, replay};
    use crate::search::{astar, bfs, Blind, Limits, Termination};
    use crate::tests::{make_state, setup_logger};


    /// A domain with a single, close target.
    fn small_domain() -> DroneDomain { DroneDomain::new(4, 1).target("a", 1) }


    #[test]
    fn test_ground_default() {
        setup_logger();

        let actions = DroneDomain::default().ground_actions().unwrap();
        assert_eq!(actions.len(), 161);
        assert_eq!(&**actions.get_index(0).unwrap().name(), "fly_base_to_pickup_b2");
        assert_eq!(&**actions.get_index(1).unwrap().name(), "fly_pickup_to_base_b2");
        assert_eq!(&**actions.get_index(18).unwrap().name(), "fly_pickup_to_c1_b2");
        assert_eq!(&**actions.get_index(141).unwrap().name(), "pickup_package_c1");
        assert_eq!(&**actions.get_index(146).unwrap().name(), "deliver_package_c1");
        assert_eq!(&**actions.get_index(160).unwrap().name(), "recharge_at_base_b9");
        assert!(actions.get("fly_c4_to_base_b4").is_some());
        assert!(actions.get("fly_c4_to_base_b3").is_none());
        assert!(actions.get("recharge_at_base_b10").is_none());
    }

    #[test]
    fn test_ground_templates() {
        let actions = DroneDomain::default().ground_actions().unwrap();

        let fly = actions.get("fly_pickup_to_c3_b7").unwrap();
        assert_eq!(fly, &Action::new("fly_pickup_to_c3_b7").pre(["at_pickup", "battery_7"]).add(["at_c3", "battery_4"]).del(["at_pickup", "battery_7"]).cost(3));

        let pickup = actions.get("pickup_package_c2").unwrap();
        assert_eq!(
            pickup,
            &Action::new("pickup_package_c2")
                .pre(["at_pickup", "carrying_none", "package_c2_at_pickup"])
                .add(["carrying_c2"])
                .del(["carrying_none", "package_c2_at_pickup"])
                .cost(0)
        );

        let deliver = actions.get("deliver_package_c5").unwrap();
        assert_eq!(deliver, &Action::new("deliver_package_c5").pre(["at_c5", "carrying_c5"]).add(["delivered_c5", "carrying_none"]).del(["carrying_c5"]).cost(0));

        let recharge = actions.get("recharge_at_base_b0").unwrap();
        assert_eq!(recharge, &Action::new("recharge_at_base_b0").pre(["at_base", "battery_0"]).add(["battery_10"]).del(["battery_0"]).cost(0));
    }

    #[test]
    fn test_initial_and_goal() {
        let domain = small_domain();
        assert_eq!(domain.initial_state(), make_state(["at_base", "battery_4", "carrying_none", "package_a_at_pickup"]));
        assert_eq!(domain.goal(), Goal::new(["at_base", "delivered_a"]));
    }

    #[test]
    fn test_validate() {
        assert!(DroneDomain::default().validate().is_ok());
        assert!(matches!(DroneDomain::default().capacity(1).validate(), Err(Error::IllegalCost { cost: 2, capacity: 1, .. })));
        assert!(matches!(DroneDomain::default().base_pickup_cost(0).validate(), Err(Error::IllegalCost { cost: 0, .. })));
        assert!(matches!(DroneDomain::default().target("c1", 11).validate(), Err(Error::IllegalCost { cost: 11, .. })));
        assert!(matches!(DroneDomain::default().target("", 1).validate(), Err(Error::EmptyTarget)));
        assert!(matches!(DroneDomain::default().target("pickup", 1).validate(), Err(Error::ReservedTarget { id }) if id == "pickup"));
        assert!(matches!(DroneDomain::default().target("c6", 0).ground_actions(), Err(Error::IllegalCost { .. })));
    }

    #[test]
    fn test_ground_name_collision() {
        // `fly_<t>_to_pickup_b2` for the first is `fly_pickup_to_<t>_b2` for the second
        let domain = DroneDomain::new(2, 1).targets([("pickup_to_y", 2), ("y_to_pickup", 2)]);
        let err = domain.ground_actions().unwrap_err();
        assert!(matches!(&err, Error::Actions { err: action::Error::DuplicateName { name } } if &**name == "fly_pickup_to_y_to_pickup_b2"));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn test_heuristic_estimates() {
        let domain = DroneDomain::default();
        let h = domain.heuristic(&domain.goal());
        assert_eq!(h.estimate(&domain.initial_state()), 14);
        assert_eq!(h.estimate(&make_state(["at_pickup", "battery_8", "carrying_none"])), 16);
        assert_eq!(h.estimate(&make_state(["at_c4", "delivered_c1", "delivered_c2", "delivered_c3"])), 11);
        assert_eq!(h.estimate(&make_state(["at_c4", "carrying_c4", "delivered_c1", "delivered_c2", "delivered_c3"])), 7);
        assert_eq!(h.estimate(&make_state(["at_c4", "carrying_none", "delivered_c1", "delivered_c2", "delivered_c3", "delivered_c4"])), 7);
        assert_eq!(h.estimate(&make_state(["at_base", "delivered_c1", "delivered_c2", "delivered_c3", "delivered_c4", "delivered_c5"])), 0);

        // Without having to return, only deliveries count
        let h = domain.heuristic(&Goal::new(["delivered_c4"]));
        assert_eq!(h.estimate(&make_state(["at_c1"])), 4);

        // From the pickup point, the shortest way home may be via a target
        let domain = DroneDomain::new(10, 5).target("near", 1);
        let h = domain.heuristic(&Goal::new(["at_base"]));
        assert_eq!(h.estimate(&make_state(["at_pickup"])), 1);
    }

    #[test]
    fn test_default_problem_astar() {
        setup_logger();

        let domain = DroneDomain::default();
        let actions = domain.ground_actions().unwrap();
        let initial = domain.initial_state();
        let goal = domain.goal();
        let res = astar::search(&actions, &initial, &goal, &domain.heuristic(&goal));
        assert_eq!(res.termination, Termination::Found);
        let plan = res.plan.unwrap();

        // Replay it to check the battery never does anything weird
        let trace = replay(&actions, &initial, &plan).unwrap();
        for state in &trace {
            let levels: Vec<Cost> = state.iter().filter_map(|f| f.name().strip_prefix("battery_")).map(|l| l.parse().unwrap()).collect();
            assert_eq!(levels.len(), 1, "{state} does not have exactly one battery level");
            assert!(levels[0] <= domain.get_capacity());
        }
        let last = trace.last().unwrap();
        assert!(last.contains("at_base"));
        assert!(goal.is_satisfied_by(last));
    }

    #[test]
    fn test_default_problem_cross_check() {
        setup_logger();

        let domain = DroneDomain::default();
        let actions = domain.ground_actions().unwrap();
        let goal = domain.goal();
        let check = cross_check(&actions, &domain.initial_state(), &goal, &domain.heuristic(&goal), &Limits::none()).unwrap();
        let (plan, baseline) = (check.plan.unwrap(), check.baseline.unwrap());
        assert_eq!(plan.cost(), baseline.cost());
    }

    #[test]
    fn test_small_problem_bfs() {
        setup_logger();

        let domain = small_domain();
        let actions = domain.ground_actions().unwrap();
        let res = bfs::search(&actions, &domain.initial_state(), &domain.goal());
        let plan = res.plan.unwrap();
        assert_eq!(plan.iter().collect::<Vec<_>>(), ["fly_base_to_pickup_b4", "pickup_package_a", "fly_pickup_to_a_b3", "deliver_package_a", "fly_a_to_base_b2"]);
    }

    #[test]
    fn test_small_problem_unreachable() {
        let domain = small_domain();
        let actions = domain.ground_actions().unwrap();
        let goal = Goal::new(["delivered_b"]);

        let bfs = bfs::search(&actions, &domain.initial_state(), &goal);
        let astar = astar::search(&actions, &domain.initial_state(), &goal, &Blind);
        assert_eq!(bfs.plan, None);
        assert_eq!(bfs.termination, Termination::Exhausted);
        assert_eq!(astar.plan, None);
        assert_eq!(bfs.explored, astar.explored);
        assert!(bfs.explored > 1);
    }
}
