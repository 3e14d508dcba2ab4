//  LIB.rs
//    by Lut99
//
//  Created:
//    13 Mar 2024, 16:43:01
//  Last edited:
//    21 Feb 2025, 11:02:37
//  Auto updated?
//    Yes
//
//  Description:
//!   A small STRIPS planner.
//!
//!   The crate models worlds as sets of [fluents](fluent::Fluent), changes them with
//!   [actions](action::Action) that have preconditions, add- and delete-effects, and searches for
//!   a [plan](search::Plan) that brings an initial [state](state::State) to one satisfying a
//!   [goal](state::Goal). Two drivers are available:
//!   - [breadth-first search](search::bfs), which finds plans with the fewest actions; and
//!   - [A*](search::astar), which finds the cheapest plan given a consistent
//!     [heuristic](search::Heuristic).
//!
//!   With the `drone`-feature (enabled by default), the [`drone`]-module grounds a
//!   battery-constrained package delivery domain that can be fed straight into either driver.
//

// Declare modules
pub mod action;
#[cfg(feature = "drone")]
pub mod drone;
pub mod fluent;
mod log;
pub mod search;
pub mod state;
pub mod transition;
