//  TRANSITION.rs
//    by Lut99
//
//  Created:
//    14 Feb 2025, 11:37:02
//  Last edited:
//    20 Feb 2025, 15:10:44
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the STRIPS transition function, i.e., deciding whether
//!   [`Action`]s are applicable and computing the [`State`] that results from
//!   applying them.
//

use std::collections::BTreeSet;

use crate::action::{Action, ActionSet};
use crate::fluent::Fluent;
use crate::state::{Goal, State};


/***** LIBRARY FUNCTIONS *****/
/// Checks whether an action can be applied in a state.
///
/// # Arguments
/// - `state`: The [`State`] to check in.
/// - `action`: The [`Action`] to check.
///
/// # Returns
/// True if all of the action's preconditions are true in `state`.
#[inline]
pub fn is_applicable(state: &State, action: &Action) -> bool { state.contains_all(action.preconditions()) }

/// Computes the state that results from applying an action.
///
/// Delete-effects are removed before add-effects are inserted, so a fluent that is both added and
/// deleted is true in the result. Note that this function does not check whether the action is
/// [applicable](is_applicable()); that's up to the caller.
///
/// # Arguments
/// - `state`: The [`State`] to apply the action to. It is left untouched.
/// - `action`: The [`Action`] to apply.
///
/// # Returns
/// A new [`State`] equal to `(state \ del) ∪ add`.
pub fn apply(state: &State, action: &Action) -> State {
    let mut fluents: BTreeSet<Fluent> = state.iter().filter(|f| !action.del_effects().contains(*f)).cloned().collect();
    fluents.extend(action.add_effects().iter().cloned());
    State::from(fluents)
}

/// Checks whether a state satisfies a goal.
///
/// # Arguments
/// - `state`: The [`State`] to check.
/// - `goal`: The [`Goal`] to check for.
///
/// # Returns
/// True if every fluent in `goal` is true in `state`.
#[inline]
pub fn goal_satisfied(state: &State, goal: &Goal) -> bool { goal.is_satisfied_by(state) }

/// Enumerates the applicable actions in a state, together with the states they lead to.
///
/// # Arguments
/// - `state`: The [`State`] to expand.
/// - `actions`: The [`ActionSet`] to try.
///
/// # Returns
/// An [`Iterator`] yielding the position of every applicable action in `actions`, the action
/// itself and its successor state. Actions are visited in `actions`' enumeration order.
#[inline]
pub fn successors<'a>(state: &'a State, actions: &'a ActionSet) -> impl 'a + Iterator<Item = (usize, &'a Action, State)> {
    actions.iter().enumerate().filter(move |(_, a)| is_applicable(state, a)).map(move |(i, a)| (i, a, apply(state, a)))
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{make_action, make_state};


    #[test]
    fn test_is_applicable() {
        let action = make_action("fly", ["at_base", "battery_10"], ["at_pickup"], ["at_base"]);
        assert!(is_applicable(&make_state(["at_base", "battery_10", "carrying_none"]), &action));
        assert!(!is_applicable(&make_state(["at_base"]), &action));
        assert!(is_applicable(&make_state([]), &make_action("free", [], ["x"], [])));
    }

    #[test]
    fn test_apply_does_not_mutate() {
        let state = make_state(["at_base", "battery_10"]);
        let before = state.clone();
        let action = make_action("fly", ["at_base", "battery_10"], ["at_pickup", "battery_8"], ["at_base", "battery_10"]);

        let next = apply(&state, &action);
        assert_eq!(next, make_state(["at_pickup", "battery_8"]));
        assert_eq!(state, before);
        assert!(is_applicable(&state, &action));
        assert!(!is_applicable(&next, &action));
    }

    #[test]
    fn test_apply_add_wins_over_delete() {
        let state = make_state(["x", "y"]);
        let action = make_action("weird", [], ["x"], ["x", "y"]);
        assert_eq!(apply(&state, &action), make_state(["x"]));
    }

    #[test]
    fn test_goal_satisfied() {
        let state = make_state(["at_base", "delivered_c1"]);
        assert!(goal_satisfied(&state, &Goal::new(["delivered_c1"])));
        assert!(goal_satisfied(&state, &Goal::new(Vec::<Fluent>::new())));
        assert!(!goal_satisfied(&state, &Goal::new(["delivered_c1", "delivered_c2"])));
    }

    #[test]
    fn test_successors_in_order() {
        let actions = ActionSet::new([
            make_action("b", ["x"], ["y"], []),
            make_action("never", ["z"], ["y"], []),
            make_action("a", ["x"], [], ["x"]),
        ])
        .unwrap();
        let succs: Vec<(usize, String, State)> = successors(&make_state(["x"]), &actions).map(|(i, a, s)| (i, a.name().to_string(), s)).collect();
        assert_eq!(succs, vec![(0, "b".to_string(), make_state(["x", "y"])), (2, "a".to_string(), make_state([]))]);
    }
}
