//  AUDIT.rs
//    by Lut99
//
//  Created:
//    19 Feb 2025, 14:06:33
//  Last edited:
//    21 Feb 2025, 10:55:02
//  Auto updated?
//    Yes
//
//  Description:
//!   Checks plans and heuristics after the fact.
//!
//!   A plan can be [replayed](replay()) against its action set to recover
//!   the states it passes through, and [validated](validate_plan()) against
//!   a goal. [`cross_check()`] runs A* twice, once with a heuristic and once
//!   without, and complains if the heuristic made A* return a costlier plan
//!   or if it overestimated the remaining cost anywhere along the optimal
//!   one.
//

use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::sync::Arc;

use super::{astar, Blind, Cutoff, Heuristic, Limits, Plan, Termination};
use crate::action::{ActionSet, Cost};
use crate::log::debug;
use crate::state::{Goal, State};
use crate::transition::{apply, is_applicable};


/***** ERRORS *****/
/// Defines errors that occur when auditing plans or heuristics.
#[derive(Debug)]
pub enum Error {
    /// A plan refers to an action that isn't in the action set.
    UnknownAction { step: usize, name: Arc<str> },
    /// A plan step can't be executed in the state the plan has led to.
    NotApplicable { step: usize, name: Arc<str>, state: State },
    /// A plan was executed completely, but did not reach the goal.
    GoalNotReached { goal: Goal, state: State },
    /// One of the searches stopped before it could decide anything.
    CutOff { cutoff: Cutoff },
    /// One search found a plan and the other didn't.
    Disagreement { informed: bool },
    /// The informed search returned a costlier plan than the baseline.
    Suboptimal { found: Cost, optimal: Cost },
    /// The heuristic estimated more than the actual remaining cost in some state.
    Overestimate { state: State, estimate: Cost, remaining: Cost },
}
impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::UnknownAction { step, name } => write!(f, "Step {} of the plan executes unknown action \"{name}\"", step + 1),
            Self::NotApplicable { step, name, state } => {
                write!(f, "Step {} of the plan executes action \"{name}\", which is not applicable in {state}", step + 1)
            },
            Self::GoalNotReached { goal, state } => write!(f, "Plan ends in {state}, which does not satisfy goal {goal}"),
            Self::CutOff { cutoff } => write!(f, "Search was cut off before finishing ({cutoff})"),
            Self::Disagreement { informed } => {
                if *informed {
                    write!(f, "Informed search found a plan, but uninformed search did not")
                } else {
                    write!(f, "Uninformed search found a plan, but informed search did not")
                }
            },
            Self::Suboptimal { found, optimal } => write!(f, "Informed search found a plan of cost {found}, but a plan of cost {optimal} exists"),
            Self::Overestimate { state, estimate, remaining } => {
                write!(f, "Heuristic estimates {estimate} in {state}, but the goal can be reached for {remaining}")
            },
        }
    }
}
impl error::Error for Error {}





/***** AUXILLARY *****/
/// The outcome of a successful [`cross_check()`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrossCheck {
    /// The plan found with the heuristic, if any.
    pub plan: Option<Plan>,
    /// The number of states the informed search explored.
    pub explored: usize,
    /// The plan found without the heuristic, if any.
    pub baseline: Option<Plan>,
    /// The number of states the uninformed search explored.
    pub baseline_explored: usize,
}





/***** LIBRARY FUNCTIONS *****/
/// Computes what a plan costs according to its actions.
///
/// # Arguments
/// - `actions`: The [`ActionSet`] the plan was made with.
/// - `plan`: The [`Plan`] to compute the cost of. Its own cost is ignored.
///
/// # Returns
/// The sum of the costs of all steps.
///
/// # Errors
/// This function errors if the plan contains an action not in `actions`.
pub fn plan_cost(actions: &ActionSet, plan: &Plan) -> Result<Cost, Error> {
    let mut cost: Cost = 0;
    for (step, name) in plan.steps().iter().enumerate() {
        match actions.get(name) {
            Some(action) => cost = cost.saturating_add(action.get_cost()),
            None => return Err(Error::UnknownAction { step, name: name.clone() }),
        }
    }
    Ok(cost)
}

/// Executes a plan step by step.
///
/// # Arguments
/// - `actions`: The [`ActionSet`] the plan was made with.
/// - `initial`: The [`State`] to start in.
/// - `plan`: The [`Plan`] to execute.
///
/// # Returns
/// Every state the plan passes through, starting with `initial`. There are always
/// `plan.len() + 1` of them.
///
/// # Errors
/// This function errors if the plan contains an action not in `actions`, or an action that is not
/// applicable at the point where it's executed.
pub fn replay(actions: &ActionSet, initial: &State, plan: &Plan) -> Result<Vec<State>, Error> {
    let mut trace: Vec<State> = Vec::with_capacity(plan.len() + 1);
    trace.push(initial.clone());
    for (step, name) in plan.steps().iter().enumerate() {
        let action = actions.get(name).ok_or_else(|| Error::UnknownAction { step, name: name.clone() })?;
        // NOTE: `trace` is never empty
        let state: &State = &trace[trace.len() - 1];
        if !is_applicable(state, action) {
            return Err(Error::NotApplicable { step, name: name.clone(), state: state.clone() });
        }
        let next: State = apply(state, action);
        trace.push(next);
    }
    Ok(trace)
}

/// Executes a plan and checks that it reaches the goal.
///
/// # Arguments
/// - `actions`: The [`ActionSet`] the plan was made with.
/// - `initial`: The [`State`] to start in.
/// - `goal`: The [`Goal`] the plan should reach.
/// - `plan`: The [`Plan`] to execute.
///
/// # Returns
/// Every state the plan passes through, like [`replay()`].
///
/// # Errors
/// This function errors if the plan cannot be [replayed](replay()), or if its final state does not
/// satisfy `goal`.
pub fn validate_plan(actions: &ActionSet, initial: &State, goal: &Goal, plan: &Plan) -> Result<Vec<State>, Error> {
    let trace: Vec<State> = replay(actions, initial, plan)?;
    match trace.last() {
        Some(last) if !goal.is_satisfied_by(last) => Err(Error::GoalNotReached { goal: goal.clone(), state: last.clone() }),
        _ => Ok(trace),
    }
}

/// Compares A* with a heuristic against A* without one.
///
/// Without a heuristic, A* is uniform-cost search, which is optimal no matter what. Hence, if the
/// informed search returns a costlier plan, the heuristic is not consistent. The check also walks
/// the optimal plan and compares the heuristic's estimate in every state with the cost that remains
/// of the plan from there.
///
/// Note that passing this check does not prove admissibility: it only looks at the states on one
/// optimal plan.
///
/// # Arguments
/// - `actions`: The [`ActionSet`] to plan with.
/// - `initial`: The [`State`] to start in.
/// - `goal`: The [`Goal`] to reach.
/// - `heuristic`: The [`Heuristic`] to check.
/// - `limits`: [`Limits`] that apply to both searches separately.
///
/// # Returns
/// A [`CrossCheck`] with the results of both searches.
///
/// # Errors
/// This function errors if either search was cut off, if they disagree on whether a plan exists,
/// if either plan is invalid, if the informed plan is costlier, or if the heuristic overestimates
/// somewhere along the optimal plan.
pub fn cross_check<H: ?Sized + Heuristic>(actions: &ActionSet, initial: &State, goal: &Goal, heuristic: &H, limits: &Limits) -> Result<CrossCheck, Error> {
    debug!("Cross-checking heuristic over {} action(s)", actions.len());
    let informed = astar::search_with(actions, initial, goal, heuristic, limits);
    let baseline = astar::search_with(actions, initial, goal, &Blind, limits);
    for res in [&informed, &baseline] {
        if let Termination::Cutoff(cutoff) = res.termination {
            return Err(Error::CutOff { cutoff });
        }
    }

    match (&informed.plan, &baseline.plan) {
        (Some(plan), Some(optimal)) => {
            validate_plan(actions, initial, goal, plan)?;
            let trace: Vec<State> = validate_plan(actions, initial, goal, optimal)?;
            if plan.cost() > optimal.cost() {
                return Err(Error::Suboptimal { found: plan.cost(), optimal: optimal.cost() });
            }

            // Walk the optimal plan, keeping track of what's left of it
            let mut remaining: Cost = optimal.cost();
            for (state, name) in trace.iter().zip(optimal.iter().map(Some).chain([None])) {
                let estimate: Cost = heuristic.estimate(state);
                if estimate > remaining {
                    return Err(Error::Overestimate { state: state.clone(), estimate, remaining });
                }
                if let Some(action) = name.and_then(|name| actions.get(name)) {
                    remaining = remaining.saturating_sub(action.get_cost());
                }
            }
        },
        (Some(_), None) => return Err(Error::Disagreement { informed: true }),
        (None, Some(_)) => return Err(Error::Disagreement { informed: false }),
        (None, None) => {},
    }

    debug!("Heuristic passed the cross-check ({} vs. {} state(s) explored)", informed.explored, baseline.explored);
    Ok(CrossCheck { plan: informed.plan, explored: informed.explored, baseline: baseline.plan, baseline_explored: baseline.explored })
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::tests::{delivery_actions, diamond_actions, make_state, setup_logger};


    /// The names of the single-package delivery plan.
    const DELIVERY: [&str; 4] = ["fly_base_to_pickup", "pickup_package", "fly_pickup_to_customer", "deliver_package"];

    /// Makes a plan of unit cost steps.
    fn make_plan(steps: impl IntoIterator<Item = &'static str>) -> Plan {
        let steps: Vec<Arc<str>> = steps.into_iter().map(Arc::<str>::from).collect();
        let cost = steps.len() as Cost;
        Plan::new(steps, cost)
    }

    /// Makes a problem with a cheap two-step route and an expensive direct one.
    fn detour_actions() -> ActionSet {
        ActionSet::new([
            Action::new("expensive").pre(["s"]).add(["g"]).del(["s"]).cost(10),
            Action::new("cheap1").pre(["s"]).add(["m"]).del(["s"]).cost(3),
            Action::new("cheap2").pre(["m"]).add(["g"]).del(["m"]).cost(3),
        ])
        .unwrap()
    }


    #[test]
    fn test_replay() {
        let actions = delivery_actions();
        let trace = replay(&actions, &make_state(["at_base", "battery_full"]), &make_plan(DELIVERY)).unwrap();
        assert_eq!(trace.len(), 5);
        assert_eq!(trace[1], make_state(["at_pickup", "battery_full"]));
        assert_eq!(trace[4], make_state(["at_customer", "battery_full", "delivered"]));

        // The empty plan stays put
        let trace = replay(&actions, &make_state(["at_base"]), &make_plan([])).unwrap();
        assert_eq!(trace, [make_state(["at_base"])]);
    }

    #[test]
    fn test_replay_errors() {
        let actions = delivery_actions();
        let initial = make_state(["at_base", "battery_full"]);
        assert!(matches!(
            replay(&actions, &initial, &make_plan(["fly_base_to_pickup", "teleport"])),
            Err(Error::UnknownAction { step: 1, name }) if &*name == "teleport"
        ));
        assert!(matches!(
            replay(&actions, &initial, &make_plan(["pickup_package"])),
            Err(Error::NotApplicable { step: 0, name, .. }) if &*name == "pickup_package"
        ));
    }

    #[test]
    fn test_validate_plan() {
        let actions = delivery_actions();
        let initial = make_state(["at_base", "battery_full"]);
        let goal = Goal::new(["delivered"]);
        assert!(validate_plan(&actions, &initial, &goal, &make_plan(DELIVERY)).is_ok());
        assert!(matches!(
            validate_plan(&actions, &initial, &goal, &make_plan(["fly_base_to_pickup"])),
            Err(Error::GoalNotReached { state, .. }) if state == make_state(["at_pickup", "battery_full"])
        ));
    }

    #[test]
    fn test_plan_cost() {
        let actions = detour_actions();
        assert_eq!(plan_cost(&actions, &make_plan(["cheap1", "cheap2"])).unwrap(), 6);
        assert_eq!(plan_cost(&actions, &make_plan(["expensive"])).unwrap(), 10);
        assert_eq!(plan_cost(&actions, &make_plan([])).unwrap(), 0);
        assert!(matches!(plan_cost(&actions, &make_plan(["cheap1", "nope"])), Err(Error::UnknownAction { step: 1, .. })));
    }

    #[test]
    fn test_cross_check_blind() {
        setup_logger();

        let actions = delivery_actions();
        let check = cross_check(&actions, &make_state(["at_base", "battery_full"]), &Goal::new(["delivered"]), &Blind, &Limits::none()).unwrap();
        assert_eq!(check.plan, check.baseline);
        assert_eq!(check.plan.map(|p| p.len()), Some(4));
    }

    #[test]
    fn test_cross_check_unreachable() {
        let actions = delivery_actions();
        let check = cross_check(&actions, &make_state(["at_base"]), &Goal::new(["delivered"]), &Blind, &Limits::none()).unwrap();
        assert_eq!(check.plan, None);
        assert_eq!(check.baseline, None);
        assert_eq!(check.baseline_explored, 1);
    }

    #[test]
    fn test_cross_check_suboptimal() {
        setup_logger();

        // Scaring A* away from `m` makes it take the expensive route
        let actions = detour_actions();
        let scared = |state: &State| -> Cost { if state.contains("m") { 100 } else { 0 } };
        assert!(matches!(
            cross_check(&actions, &make_state(["s"]), &Goal::new(["g"]), &scared, &Limits::none()),
            Err(Error::Suboptimal { found: 10, optimal: 6 })
        ));
    }

    #[test]
    fn test_cross_check_overestimate() {
        // A constant heuristic doesn't change the search order, but it is wrong in the goal state
        let actions = delivery_actions();
        let constant = |_: &State| -> Cost { 100 };
        assert!(matches!(
            cross_check(&actions, &make_state(["at_base", "battery_full"]), &Goal::new(["delivered"]), &constant, &Limits::none()),
            Err(Error::Overestimate { estimate: 100, remaining: 4, .. })
        ));
    }

    #[test]
    fn test_cross_check_cutoff() {
        let actions = diamond_actions(4);
        assert!(matches!(
            cross_check(&actions, &make_state(["n0"]), &Goal::new(["n4"]), &Blind, &Limits::none().max_explored(1)),
            Err(Error::CutOff { cutoff: Cutoff::MaxExplored(1) })
        ));
    }
}
