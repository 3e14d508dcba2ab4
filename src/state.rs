//  STATE.rs
//    by Lut99
//
//  Created:
//    14 Feb 2025, 09:40:18
//  Last edited:
//    20 Feb 2025, 14:27:51
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the (immutable) [`State`] of the world during search, and the
//!   [`Goal`] that we search a state for.
//

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FResult};
use std::sync::Arc;

use itertools::Itertools as _;

use crate::fluent::Fluent;


/***** LIBRARY *****/
/// A complete description of the world at some point during search.
///
/// A state is simply the set of [`Fluent`]s that are true; anything not in it is false. States are
/// values: two states are equal if (and only if) they contain the same fluents, and they hash
/// accordingly, so they can be used as keys in the search's bookkeeping.
///
/// States never change after construction. The fluents live in a shared, ordered set, so cloning a
/// state is O(1) and hashing or comparing one is linear in its size. Every
/// [transition](crate::transition::apply()) produces a new State.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct State {
    /// The fluents that are true in this state.
    fluents: Arc<BTreeSet<Fluent>>,
}

// Constructors
impl State {
    /// Constructor for the State.
    ///
    /// # Arguments
    /// - `fluents`: The fluents that are true in the new state. Duplicates are ignored.
    ///
    /// # Returns
    /// A new State.
    #[inline]
    pub fn new(fluents: impl IntoIterator<Item = impl Into<Fluent>>) -> Self { fluents.into_iter().map(Into::<Fluent>::into).collect() }

    /// Constructor for the State that initializes it as empty, i.e., nothing is true.
    ///
    /// # Returns
    /// A new State without any fluents in it.
    #[inline]
    pub fn empty() -> Self { Self::default() }
}
impl FromIterator<Fluent> for State {
    #[inline]
    fn from_iter<T: IntoIterator<Item = Fluent>>(iter: T) -> Self { Self::from(iter.into_iter().collect::<BTreeSet<Fluent>>()) }
}
impl From<BTreeSet<Fluent>> for State {
    #[inline]
    fn from(value: BTreeSet<Fluent>) -> Self { Self { fluents: Arc::new(value) } }
}

// Queries
impl State {
    /// Checks whether the given fluent is true in this state.
    ///
    /// # Arguments
    /// - `fluent`: The fluent to check for. Can be given as a [`Fluent`] or as a plain [`str`].
    ///
    /// # Returns
    /// True if the fluent is in this state, false otherwise.
    #[inline]
    pub fn contains<Q>(&self, fluent: &Q) -> bool
    where
        Q: ?Sized + Ord,
        Fluent: Borrow<Q>,
    {
        self.fluents.contains(fluent)
    }

    /// Checks whether every fluent in the given collection is true in this state.
    ///
    /// # Arguments
    /// - `fluents`: The fluents to check for.
    ///
    /// # Returns
    /// True if all of them are in this state. Vacuously true for an empty collection.
    #[inline]
    pub fn contains_all<'f>(&self, fluents: impl IntoIterator<Item = &'f Fluent>) -> bool { fluents.into_iter().all(|f| self.fluents.contains(f)) }

    /// Returns the underlying set of fluents.
    #[inline]
    pub fn fluents(&self) -> &BTreeSet<Fluent> { &self.fluents }

    /// Returns an iterator over the fluents in this state, in lexicographical order.
    #[inline]
    pub fn iter(&self) -> std::collections::btree_set::Iter<'_, Fluent> { self.fluents.iter() }

    /// Returns the number of fluents that are true in this state.
    #[inline]
    pub fn len(&self) -> usize { self.fluents.len() }

    /// Returns whether nothing is true in this state.
    #[inline]
    pub fn is_empty(&self) -> bool { self.fluents.is_empty() }
}
impl<'s> IntoIterator for &'s State {
    type Item = &'s Fluent;
    type IntoIter = std::collections::btree_set::Iter<'s, Fluent>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.fluents.iter() }
}

// Formatting
impl Display for State {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{{{}}}", self.fluents.iter().join(", ")) }
}



/// A partial description of a [`State`] that we want to reach.
///
/// Fluents that do not occur in the goal are "don't care"; a state satisfies the goal as soon as
/// everything in the goal is true in it. The empty goal, then, is satisfied by every state.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Goal {
    /// The fluents that must be true.
    fluents: BTreeSet<Fluent>,
}
impl Goal {
    /// Constructor for the Goal.
    ///
    /// # Arguments
    /// - `fluents`: The fluents that must be true in a goal state.
    ///
    /// # Returns
    /// A new Goal.
    #[inline]
    pub fn new(fluents: impl IntoIterator<Item = impl Into<Fluent>>) -> Self { Self { fluents: fluents.into_iter().map(Into::<Fluent>::into).collect() } }

    /// Checks whether the given state satisfies this goal, i.e., whether the goal is a subset of
    /// the state.
    ///
    /// # Arguments
    /// - `state`: The [`State`] to check.
    ///
    /// # Returns
    /// True if every fluent in the goal is true in `state`.
    #[inline]
    pub fn is_satisfied_by(&self, state: &State) -> bool { self.fluents.is_subset(state.fluents()) }

    /// Checks whether the given fluent is part of this goal.
    #[inline]
    pub fn contains<Q>(&self, fluent: &Q) -> bool
    where
        Q: ?Sized + Ord,
        Fluent: Borrow<Q>,
    {
        self.fluents.contains(fluent)
    }

    /// Returns an iterator over the fluents in this goal.
    #[inline]
    pub fn iter(&self) -> std::collections::btree_set::Iter<'_, Fluent> { self.fluents.iter() }

    #[inline]
    pub fn len(&self) -> usize { self.fluents.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.fluents.is_empty() }
}
impl FromIterator<Fluent> for Goal {
    #[inline]
    fn from_iter<T: IntoIterator<Item = Fluent>>(iter: T) -> Self { Self { fluents: iter.into_iter().collect() } }
}
impl Display for Goal {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{{{}}}", self.fluents.iter().join(", ")) }
}





/***** TESTS *****/
