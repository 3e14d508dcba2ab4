//  MOD.rs
//    by Lut99
//
//  Created:
//    17 Feb 2025, 09:02:16
//  Last edited:
//    21 Feb 2025, 10:48:30
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements forward state-space search over STRIPS actions.
//!
//!   Two drivers are provided:
//!   - [`bfs`], an uninformed breadth-first search that returns plans with
//!     the fewest actions; and
//!   - [`astar`], which returns the cheapest plan w.r.t. the actions'
//!     [costs](crate::action::Action::get_cost()) if given a consistent
//!     [`Heuristic`].
//!
//!   Both produce a [`SearchResult`], which carries the [`Plan`] (if any)
//!   and the number of states that were expanded to find it. Neither
//!   treats an unreachable goal as an error.
//!
//!   The [`audit`]-module can check plans and heuristics after the fact.
//

// Modules
pub mod astar;
pub mod audit;
pub mod bfs;

// Imports
use std::fmt::{Display, Formatter, Result as FResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use bfs::FrontierPolicy;

use crate::action::{ActionSet, Cost};
use crate::state::{Goal, State};


/***** INTERFACES *****/
/// Estimates the remaining cost from a state to the goal.
///
/// For [A*](astar) to return optimal plans, the estimate must be _admissible_: it may never exceed
/// the cost of the cheapest plan from the given state to the goal. Because A* never expands a state
/// twice, it must also be _consistent_: for every action taking `s` to `s'`, the estimate for `s`
/// may not exceed the action's cost plus the estimate for `s'`. Being [`Cost`]s, estimates cannot
/// be negative.
///
/// Any `Fn(&State) -> Cost` is a heuristic.
pub trait Heuristic {
    /// Estimates the cost of reaching the goal from the given state.
    ///
    /// # Arguments
    /// - `state`: The [`State`] to estimate from.
    ///
    /// # Returns
    /// A lower bound on the remaining cost.
    fn estimate(&self, state: &State) -> Cost;
}
impl<F> Heuristic for F
where
    F: Fn(&State) -> Cost,
{
    #[inline]
    fn estimate(&self, state: &State) -> Cost { (self)(state) }
}

/// The heuristic that knows nothing; always estimates zero.
///
/// With it, [A*](astar) degrades to uniform-cost search.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blind;
impl Heuristic for Blind {
    #[inline]
    fn estimate(&self, _state: &State) -> Cost { 0 }
}





/***** AUXILLARY *****/
/// Limits on how long a search may run before it gives up.
///
/// By default, there are none, and searches run until they find a plan or run out of states.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Limits {
    /// The maximum number of states to expand.
    pub max_explored: Option<usize>,
    /// The maximum amount of wall-clock time to spend.
    pub time_budget:  Option<Duration>,
}
impl Limits {
    /// Constructor for the Limits that doesn't limit anything.
    ///
    /// # Returns
    /// A new Limits without any limits.
    #[inline]
    pub const fn none() -> Self { Self { max_explored: None, time_budget: None } }

    /// Limits the number of states expanded.
    ///
    /// # Arguments
    /// - `max`: The maximum number of states that may be expanded.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn max_explored(mut self, max: usize) -> Self {
        self.max_explored = Some(max);
        self
    }

    /// Limits the wall-clock time spent.
    ///
    /// # Arguments
    /// - `budget`: The time after which the search is abandoned.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

/// Keeps track of [`Limits`] during a single run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Budget {
    /// The limits to enforce.
    limits:  Limits,
    /// When the run started.
    started: Instant,
}
impl Budget {
    /// Starts the clock on the given limits.
    #[inline]
    pub(crate) fn start(limits: &Limits) -> Self { Self { limits: *limits, started: Instant::now() } }

    /// Checks whether the search may expand another state.
    ///
    /// # Arguments
    /// - `explored`: The number of states expanded so far.
    ///
    /// # Returns
    /// The [`Cutoff`] that fired, or [`None`] if we may continue.
    #[inline]
    pub(crate) fn check(&self, explored: usize) -> Option<Cutoff> {
        if let Some(max) = self.limits.max_explored {
            if explored >= max {
                return Some(Cutoff::MaxExplored(max));
            }
        }
        if let Some(budget) = self.limits.time_budget {
            if self.started.elapsed() >= budget {
                return Some(Cutoff::TimeBudget(budget));
            }
        }
        None
    }
}



/// Remembers how every state on the frontier was reached.
///
/// Instead of copying a growing list of action names into every frontier entry, entries point to
/// the last step of their plan in this arena, and every step points to its predecessor. Unwinding a
/// step yields the same plan as carrying the list around would.
#[derive(Clone, Debug, Default)]
pub(crate) struct Trail {
    /// The steps, as (predecessor, index of the action taken).
    steps: Vec<(Option<usize>, usize)>,
}
impl Trail {
    /// Constructor for the Trail that initializes it empty.
    #[inline]
    pub(crate) fn new() -> Self { Self { steps: Vec::new() } }

    /// Records that an action was taken after the given step.
    ///
    /// # Arguments
    /// - `parent`: The step this one extends, or [`None`] if it's the first action of the plan.
    /// - `action`: The index of the taken action in the [`ActionSet`].
    ///
    /// # Returns
    /// An identifier for the new step.
    #[inline]
    pub(crate) fn push(&mut self, parent: Option<usize>, action: usize) -> usize {
        self.steps.push((parent, action));
        self.steps.len() - 1
    }

    /// Reconstructs the plan that ends in the given step.
    ///
    /// # Arguments
    /// - `actions`: The [`ActionSet`] the action indices refer to.
    /// - `last`: The last step of the plan, or [`None`] for the empty plan.
    ///
    /// # Returns
    /// The names of the actions in the plan, in execution order.
    pub(crate) fn unwind(&self, actions: &ActionSet, mut last: Option<usize>) -> Vec<Arc<str>> {
        let mut names: Vec<Arc<str>> = Vec::new();
        while let Some(step) = last {
            let (parent, action) = self.steps[step];
            // NOTE: Indices come from enumerating the same set, so they're always in range
            if let Some(action) = actions.get_index(action) {
                names.push(action.name().clone());
            }
            last = parent;
        }
        names.reverse();
        names
    }

    /// Returns the number of steps recorded.
    #[inline]
    pub(crate) fn len(&self) -> usize { self.steps.len() }
}





/***** LIBRARY *****/
/// An ordered sequence of actions that transforms the initial state into a goal state.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Plan {
    /// The names of the actions to execute, in order.
    steps: Vec<Arc<str>>,
    /// The total cost of the plan.
    ///
    /// For plans found by [`bfs`], this is the number of steps.
    cost:  Cost,
}
impl Plan {
    /// Constructor for the Plan.
    ///
    /// # Arguments
    /// - `steps`: The names of the actions, in execution order.
    /// - `cost`: The total cost of executing all of them.
    ///
    /// # Returns
    /// A new Plan.
    #[inline]
    pub fn new(steps: Vec<Arc<str>>, cost: Cost) -> Self { Self { steps, cost } }

    /// Returns the names of the actions in this plan.
    #[inline]
    pub fn steps(&self) -> &[Arc<str>] { &self.steps }

    /// Returns the total cost of this plan.
    #[inline]
    pub fn cost(&self) -> Cost { self.cost }

    /// Returns an iterator over the names of the actions in this plan.
    #[inline]
    pub fn iter(&self) -> impl '_ + Iterator<Item = &'_ str> { self.steps.iter().map(|s| &**s) }

    /// Returns the number of actions in this plan.
    #[inline]
    pub fn len(&self) -> usize { self.steps.len() }

    /// Returns whether this plan does nothing (i.e., the initial state already satisfied the goal).
    #[inline]
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    /// Consumes this plan into its list of action names.
    #[inline]
    pub fn into_steps(self) -> Vec<Arc<str>> { self.steps }
}
impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, step)?;
        }
        Ok(())
    }
}



/// Why a search stopped before running out of states.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cutoff {
    /// It expanded the maximum number of states.
    MaxExplored(usize),
    /// It ran out of time.
    TimeBudget(Duration),
}
impl Display for Cutoff {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::MaxExplored(max) => write!(f, "expanded the maximum of {max} state(s)"),
            Self::TimeBudget(budget) => write!(f, "exceeded the time budget of {budget:?}"),
        }
    }
}

/// Why a search stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Termination {
    /// A goal state was found.
    Found,
    /// All reachable states were expanded without finding a goal state.
    Exhausted,
    /// One of the [`Limits`] fired.
    Cutoff(Cutoff),
}
impl Display for Termination {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Found => write!(f, "found a plan"),
            Self::Exhausted => write!(f, "exhausted the reachable state space"),
            Self::Cutoff(cutoff) => write!(f, "stopped early: {cutoff}"),
        }
    }
}

/// The outcome of a search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchResult {
    /// The plan found, if any.
    pub plan: Option<Plan>,
    /// The number of unique states that were expanded.
    pub explored: usize,
    /// The number of frontier insertions (including the initial state).
    pub generated: usize,
    /// Why the search stopped.
    pub termination: Termination,
}
impl SearchResult {
    /// Returns whether a plan was found.
    #[inline]
    pub fn is_found(&self) -> bool { self.plan.is_some() }

    /// Consumes this result into the plain (plan, explored) pair.
    #[inline]
    pub fn into_pair(self) -> (Option<Plan>, usize) { (self.plan, self.explored) }
}



/// Which driver to run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Strategy {
    /// Breadth-first search, ignoring action costs and any heuristic.
    Bfs(FrontierPolicy),
    /// A* search with the heuristic given to [`Planner::run_with()`].
    #[default]
    AStar,
}
impl Display for Strategy {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match self {
            Self::Bfs(FrontierPolicy::ExploredOnly) => write!(f, "BFS"),
            Self::Bfs(FrontierPolicy::FrontierAndExplored) => write!(f, "BFS (frontier deduplication)"),
            Self::AStar => write!(f, "A*"),
        }
    }
}

/// Bundles an [`ActionSet`] with a [`Strategy`] and [`Limits`], such that the driver can be
/// chosen at runtime.
#[derive(Clone, Copy, Debug)]
pub struct Planner<'a> {
    /// The actions to plan with.
    actions:  &'a ActionSet,
    /// The driver to use.
    strategy: Strategy,
    /// The limits to impose on every run.
    limits:   Limits,
}
impl<'a> Planner<'a> {
    /// Constructor for the Planner.
    ///
    /// # Arguments
    /// - `actions`: The [`ActionSet`] to plan with.
    ///
    /// # Returns
    /// A new Planner that uses [A*](Strategy::AStar) without limits.
    #[inline]
    pub fn new(actions: &'a ActionSet) -> Self { Self { actions, strategy: Strategy::default(), limits: Limits::none() } }

    /// Sets the driver to use.
    #[inline]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the limits for every run.
    #[inline]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Searches for a plan without a heuristic.
    ///
    /// # Arguments
    /// - `initial`: The [`State`] to start in.
    /// - `goal`: The [`Goal`] to reach.
    ///
    /// # Returns
    /// A [`SearchResult`] describing the outcome.
    #[inline]
    pub fn run(&self, initial: &State, goal: &Goal) -> SearchResult { self.run_with(initial, goal, &Blind) }

    /// Searches for a plan.
    ///
    /// # Arguments
    /// - `initial`: The [`State`] to start in.
    /// - `goal`: The [`Goal`] to reach.
    /// - `heuristic`: The [`Heuristic`] to guide A* with. Ignored by BFS.
    ///
    /// # Returns
    /// A [`SearchResult`] describing the outcome.
    pub fn run_with<H: ?Sized + Heuristic>(&self, initial: &State, goal: &Goal, heuristic: &H) -> SearchResult {
        match self.strategy {
            Strategy::Bfs(policy) => bfs::search_with(self.actions, initial, goal, policy, &self.limits),
            Strategy::AStar => astar::search_with(self.actions, initial, goal, heuristic, &self.limits),
        }
    }
}





/***** TESTS *****/
