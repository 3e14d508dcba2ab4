//  ASTAR.rs
//    by Lut99
//
//  Created:
//    17 Feb 2025, 13:50:21
//  Last edited:
//    21 Feb 2025, 10:31:57
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements cost-optimal A* search over STRIPS actions.
//!
//!   The open list is a priority queue ordered on `f = g + h`. Ties are
//!   broken on insertion order (earliest first), which makes runs
//!   reproducible. Stale queue entries are not removed when a state is
//!   reached more cheaply; instead, every entry of a state that has already
//!   been expanded is discarded when popped.
//

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::{Budget, Heuristic, Limits, Plan, SearchResult, Termination, Trail};
use crate::action::{ActionSet, Cost};
use crate::log::{debug, trace};
use crate::state::{Goal, State};
use crate::transition::successors;


/***** HELPERS *****/
/// An entry in the open list.
#[derive(Clone, Debug)]
struct Node {
    /// Estimated total cost, `g + h`.
    f:     Cost,
    /// Insertion sequence number.
    seq:   u64,
    /// Cost so far.
    g:     Cost,
    /// The state reached.
    state: State,
    /// The last step of the plan that reached it in the [`Trail`].
    last:  Option<usize>,
}

// NOTE: Ordered such that the std max-heap pops the lowest `f`, then the lowest `seq`
impl Eq for Node {}
impl PartialEq for Node {
    #[inline]
    fn eq(&self, other: &Self) -> bool { self.f == other.f && self.seq == other.seq }
}
impl Ord for Node {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering { other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq)) }
}
impl PartialOrd for Node {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}





/***** LIBRARY FUNCTIONS *****/
/// Searches for the cheapest plan from `initial` to `goal`.
///
/// Convenience wrapper around [`search_with()`] without limits.
///
/// # Arguments
/// - `actions`: The [`ActionSet`] to plan with.
/// - `initial`: The [`State`] to start in.
/// - `goal`: The [`Goal`] to reach.
/// - `heuristic`: A consistent [`Heuristic`] guiding the search.
///
/// # Returns
/// A [`SearchResult`] with the found plan (if any) and the number of states explored.
#[inline]
pub fn search<H: ?Sized + Heuristic>(actions: &ActionSet, initial: &State, goal: &Goal, heuristic: &H) -> SearchResult {
    search_with(actions, initial, goal, heuristic, &Limits::none())
}

/// Searches for the cheapest plan from `initial` to `goal`.
///
/// If `heuristic` is consistent (see [`Heuristic`]), no plan cheaper than the returned one exists.
/// States are never expanded twice, so a heuristic that is merely admissible may make the search
/// settle for a costlier plan. Either way the plan is valid; use
/// [`audit::cross_check()`](super::audit::cross_check()) to compare it with the optimum.
///
/// # Arguments
/// - `actions`: The [`ActionSet`] to plan with.
/// - `initial`: The [`State`] to start in.
/// - `goal`: The [`Goal`] to reach.
/// - `heuristic`: A consistent [`Heuristic`] guiding the search.
/// - `limits`: Any [`Limits`] to stop the search early.
///
/// # Returns
/// A [`SearchResult`] with the found plan (if any) and the number of states explored. If the goal
/// is unreachable, the plan is [`None`] and `explored` counts every reachable state.
pub fn search_with<H: ?Sized + Heuristic>(actions: &ActionSet, initial: &State, goal: &Goal, heuristic: &H, limits: &Limits) -> SearchResult {
    debug!("Running A* over {} action(s) from {initial} to {goal}", actions.len());
    let budget = Budget::start(limits);

    let mut trail = Trail::new();
    let mut seq: u64 = 0;
    let mut open: BinaryHeap<Node> = BinaryHeap::new();
    open.push(Node { f: heuristic.estimate(initial), seq, g: 0, state: initial.clone(), last: None });
    let mut best_g: HashMap<State, Cost> = HashMap::from([(initial.clone(), 0)]);
    let mut explored: HashSet<State> = HashSet::new();
    while let Some(Node { f, g, state, last, .. }) = open.pop() {
        if explored.contains(&state) {
            continue;
        }
        if goal.is_satisfied_by(&state) {
            let steps = trail.unwind(actions, last);
            debug!("A* found a plan of {} step(s) with cost {g} after exploring {} state(s)", steps.len(), explored.len());
            return SearchResult { plan: Some(Plan::new(steps, g)), explored: explored.len(), generated: trail.len() + 1, termination: Termination::Found };
        }
        if let Some(cutoff) = budget.check(explored.len()) {
            debug!("A* stopped after exploring {} state(s): {cutoff}", explored.len());
            return SearchResult { plan: None, explored: explored.len(), generated: trail.len() + 1, termination: Termination::Cutoff(cutoff) };
        }
        trace!("--> Expanding {state} (f = {f}, g = {g})");
        explored.insert(state.clone());

        for (i, action, next) in successors(&state, actions) {
            let new_g: Cost = g.saturating_add(action.get_cost());
            if best_g.get(&next).is_some_and(|old| *old <= new_g) {
                continue;
            }
            best_g.insert(next.clone(), new_g);

            let h: Cost = heuristic.estimate(&next);
            trace!("-----> Queueing '{}' -> {next} (g = {new_g}, h = {h})", action.name());
            seq += 1;
            let step: usize = trail.push(last, i);
            open.push(Node { f: new_g.saturating_add(h), seq, g: new_g, state: next, last: Some(step) });
        }
    }

    debug!("A* exhausted the state space after exploring {} state(s)", explored.len());
    SearchResult { plan: None, explored: explored.len(), generated: trail.len() + 1, termination: Termination::Exhausted }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::search::{bfs, Blind, Cutoff};
    use crate::tests::{delivery_actions, diamond_actions, make_action, make_state, setup_logger};


    #[test]
    fn test_node_ordering() {
        let node = |f: Cost, seq: u64| Node { f, seq, g: 0, state: State::empty(), last: None };
        let mut heap: BinaryHeap<Node> = BinaryHeap::new();
        heap.push(node(5, 0));
        heap.push(node(3, 1));
        heap.push(node(3, 2));
        heap.push(node(4, 3));
        let order: Vec<(Cost, u64)> = std::iter::from_fn(|| heap.pop()).map(|n| (n.f, n.seq)).collect();
        assert_eq!(order, [(3, 1), (3, 2), (4, 3), (5, 0)]);
    }

    #[test]
    fn test_astar_single_delivery() {
        setup_logger();

        let actions = delivery_actions();
        let res = search(&actions, &make_state(["at_base", "battery_full"]), &Goal::new(["delivered"]), &Blind);
        let plan = res.plan.unwrap();
        assert_eq!(plan.iter().collect::<Vec<_>>(), ["fly_base_to_pickup", "pickup_package", "fly_pickup_to_customer", "deliver_package"]);
    }

    #[test]
    fn test_astar_no_battery() {
        let actions = delivery_actions();
        let res = search(&actions, &make_state(["at_base"]), &Goal::new(["delivered"]), &Blind);
        assert_eq!(res.into_pair(), (None, 1));
    }

    #[test]
    fn test_astar_prefers_cheap_plans() {
        setup_logger();

        let actions = ActionSet::new([
            Action::new("expensive").pre(["s"]).add(["g"]).del(["s"]).cost(10),
            Action::new("cheap1").pre(["s"]).add(["m"]).del(["s"]).cost(3),
            Action::new("cheap2").pre(["m"]).add(["g"]).del(["m"]).cost(3),
        ])
        .unwrap();
        let res = search(&actions, &make_state(["s"]), &Goal::new(["g"]), &Blind);
        let plan = res.plan.unwrap();
        assert_eq!(plan.iter().collect::<Vec<_>>(), ["cheap1", "cheap2"]);
        assert_eq!(plan.cost(), 6);
    }

    #[test]
    fn test_astar_improves_queued_states() {
        // `m` is first queued with g = 5 and later improved to g = 2
        let actions = ActionSet::new([
            Action::new("slow_to_m").pre(["s"]).add(["m"]).del(["s"]).cost(5),
            Action::new("to_x").pre(["s"]).add(["x"]).del(["s"]).cost(1),
            Action::new("x_to_m").pre(["x"]).add(["m"]).del(["x"]).cost(1),
            Action::new("m_to_g").pre(["m"]).add(["g"]).del(["m"]).cost(1),
        ])
        .unwrap();
        let plan = search(&actions, &make_state(["s"]), &Goal::new(["g"]), &Blind).plan.unwrap();
        assert_eq!(plan.iter().collect::<Vec<_>>(), ["to_x", "x_to_m", "m_to_g"]);
        assert_eq!(plan.cost(), 3);
    }

    #[test]
    fn test_astar_heuristic_guides_search() {
        setup_logger();

        // A three-step plan next to a dead end of the same length
        let actions = ActionSet::new([
            make_action("p1", ["s"], ["a"], ["s"]),
            make_action("d1", ["s"], ["x"], ["s"]),
            make_action("p2", ["a"], ["b"], ["a"]),
            make_action("d2", ["x"], ["y"], ["x"]),
            make_action("p3", ["b"], ["g"], ["b"]),
            make_action("d3", ["y"], ["z"], ["y"]),
        ])
        .unwrap();
        let perfect = |state: &State| -> Cost {
            if state.contains("s") {
                3
            } else if state.contains("a") {
                2
            } else if state.contains("b") {
                1
            } else if state.contains("g") {
                0
            } else {
                100
            }
        };
        let goal = Goal::new(["g"]);
        let informed = search(&actions, &make_state(["s"]), &goal, &perfect);
        let blind = search(&actions, &make_state(["s"]), &goal, &Blind);
        assert_eq!(informed.plan, blind.plan);
        assert_eq!(informed.plan.as_ref().map(Plan::cost), Some(3));
        assert_eq!(informed.explored, 3);
        assert_eq!(blind.explored, 5);
    }

    #[test]
    fn test_astar_matches_bfs_with_unit_costs() {
        let actions = diamond_actions(7);
        let initial = make_state(["n0"]);
        for goal in [Goal::new(["n7"]), Goal::new(["r3"]), Goal::new(["l6", "n0"])] {
            let a = search(&actions, &initial, &goal, &Blind);
            let b = bfs::search(&actions, &initial, &goal);
            assert_eq!(a.plan.as_ref().map(Plan::len), b.plan.as_ref().map(Plan::len), "for goal {goal}");
        }
    }

    #[test]
    fn test_astar_unreachable_goal_explores_everything() {
        let actions = ActionSet::new([
            make_action("a_on", ["a_off"], ["a_on"], ["a_off"]),
            make_action("a_off", ["a_on"], ["a_off"], ["a_on"]),
            make_action("b_on", ["b_off"], ["b_on"], ["b_off"]),
        ])
        .unwrap();
        let res = search(&actions, &make_state(["a_off", "b_off"]), &Goal::new(["c_on"]), &Blind);
        assert_eq!(res.plan, None);
        assert_eq!(res.explored, 4);
        assert_eq!(res.termination, Termination::Exhausted);
    }

    #[test]
    fn test_astar_cutoff() {
        let actions = diamond_actions(8);
        let res = search_with(&actions, &make_state(["n0"]), &Goal::new(["n8"]), &Blind, &Limits::none().max_explored(2));
        assert_eq!(res.plan, None);
        assert_eq!(res.explored, 2);
        assert_eq!(res.termination, Termination::Cutoff(Cutoff::MaxExplored(2)));
    }

    #[test]
    fn test_astar_deterministic() {
        let actions = diamond_actions(6);
        let initial = make_state(["n0"]);
        let goal = Goal::new(["n6"]);
        assert_eq!(search(&actions, &initial, &goal, &Blind), search(&actions, &initial, &goal, &Blind));
    }
}
