//  BFS.rs
//    by Lut99
//
//  Created:
//    17 Feb 2025, 09:31:48
//  Last edited:
//    20 Feb 2025, 17:12:05
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements uninformed breadth-first search over STRIPS actions.
//!
//!   The frontier is a FIFO-queue of states (with the plan that reached
//!   them), and states are remembered as _explored_ once they are dequeued.
//!   Successors are only checked against the explored set, so a state may
//!   sit on the frontier more than once before it is dequeued for the first
//!   time. That doesn't affect which plan is found nor the number of explored
//!   states, but it does inflate the frontier. Use
//!   [`FrontierPolicy::FrontierAndExplored`] to deduplicate against the
//!   frontier too.
//

use std::collections::{HashSet, VecDeque};

use super::{Budget, Limits, Plan, SearchResult, Termination, Trail};
use crate::action::{ActionSet, Cost};
use crate::log::{debug, trace};
use crate::state::{Goal, State};
use crate::transition::successors;


/***** AUXILLARY *****/
/// Decides which successors the BFS-driver puts on its frontier.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FrontierPolicy {
    /// Only skip successors that have already been expanded. A state may be queued several times
    /// before its first expansion.
    #[default]
    ExploredOnly,
    /// Skip successors that have already been expanded _or_ that are already queued.
    ///
    /// This keeps the frontier smaller, but changes how many states are generated.
    FrontierAndExplored,
}





/***** LIBRARY FUNCTIONS *****/
/// Searches for the plan with the fewest actions from `initial` to `goal`.
///
/// Convenience wrapper around [`search_with()`] with the default [`FrontierPolicy`] and no limits.
///
/// # Arguments
/// - `actions`: The [`ActionSet`] to plan with. Costs are ignored.
/// - `initial`: The [`State`] to start in.
/// - `goal`: The [`Goal`] to reach.
///
/// # Returns
/// A [`SearchResult`] with the found plan (if any) and the number of states explored.
#[inline]
pub fn search(actions: &ActionSet, initial: &State, goal: &Goal) -> SearchResult {
    search_with(actions, initial, goal, FrontierPolicy::default(), &Limits::none())
}

/// Searches for the plan with the fewest actions from `initial` to `goal`.
///
/// The search is deterministic: actions are tried in the order of the `actions`-set, and the
/// frontier is first-in, first-out. If a plan exists in a finite state space, no plan with fewer
/// actions exists.
///
/// # Arguments
/// - `actions`: The [`ActionSet`] to plan with. Costs are ignored; the returned plan's cost is its
///   number of steps.
/// - `initial`: The [`State`] to start in.
/// - `goal`: The [`Goal`] to reach.
/// - `policy`: The [`FrontierPolicy`] that decides which successors are queued.
/// - `limits`: Any [`Limits`] to stop the search early.
///
/// # Returns
/// A [`SearchResult`] with the found plan (if any) and the number of states explored. If the goal
/// is unreachable, the plan is [`None`] and `explored` counts every reachable state.
pub fn search_with(actions: &ActionSet, initial: &State, goal: &Goal, policy: FrontierPolicy, limits: &Limits) -> SearchResult {
    debug!("Running BFS over {} action(s) ({policy:?}) from {initial} to {goal}", actions.len());
    let budget = Budget::start(limits);

    let mut trail = Trail::new();
    let mut frontier: VecDeque<(State, Option<usize>)> = VecDeque::from([(initial.clone(), None)]);
    let mut queued: HashSet<State> = HashSet::new();
    if policy == FrontierPolicy::FrontierAndExplored {
        queued.insert(initial.clone());
    }
    let mut explored: HashSet<State> = HashSet::new();
    while let Some((state, last)) = frontier.pop_front() {
        if goal.is_satisfied_by(&state) {
            let steps = trail.unwind(actions, last);
            debug!("BFS found a plan of {} step(s) after exploring {} state(s)", steps.len(), explored.len());
            let cost = steps.len() as Cost;
            return SearchResult { plan: Some(Plan::new(steps, cost)), explored: explored.len(), generated: trail.len() + 1, termination: Termination::Found };
        }

        // A later copy of an expanded state would only queue successors that its first copy already queued
        if explored.contains(&state) {
            trace!("--> Skipping duplicate of expanded state {state}");
            continue;
        }
        if let Some(cutoff) = budget.check(explored.len()) {
            debug!("BFS stopped after exploring {} state(s): {cutoff}", explored.len());
            return SearchResult { plan: None, explored: explored.len(), generated: trail.len() + 1, termination: Termination::Cutoff(cutoff) };
        }
        trace!("--> Expanding {state}");
        explored.insert(state.clone());

        for (i, action, next) in successors(&state, actions) {
            if explored.contains(&next) {
                continue;
            }
            if policy == FrontierPolicy::FrontierAndExplored && !queued.insert(next.clone()) {
                continue;
            }
            trace!("-----> Queueing '{}' -> {next}", action.name());
            let step: usize = trail.push(last, i);
            frontier.push_back((next, Some(step)));
        }
    }

    debug!("BFS exhausted the state space after exploring {} state(s)", explored.len());
    SearchResult { plan: None, explored: explored.len(), generated: trail.len() + 1, termination: Termination::Exhausted }
}





/***** TESTS *****/
