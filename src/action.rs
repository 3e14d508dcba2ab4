//  ACTION.rs
//    by Lut99
//
//  Created:
//    14 Feb 2025, 10:21:55
//  Last edited:
//    20 Feb 2025, 15:03:09
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines STRIPS [`Action`]s and the validated [`ActionSet`] that the
//!   search drivers work on.
//

use std::collections::BTreeSet;
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::fluent::Fluent;
use crate::log::{debug, warn};


/***** ERRORS *****/
/// Defines errors that occur when [validating](ActionSet::new()) a set of actions.
#[derive(Debug)]
pub enum Error {
    /// An action was given without a name.
    EmptyName { index: usize },
    /// Two actions share the same name.
    DuplicateName { name: Arc<str> },
    /// An action has neither add- nor delete-effects, and would therefore never change anything.
    NoEffects { name: Arc<str> },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::EmptyName { index } => write!(f, "Action {index} has an empty name"),
            Self::DuplicateName { name } => write!(f, "Action name \"{name}\" occurs more than once"),
            Self::NoEffects { name } => write!(f, "Action \"{name}\" has no add- or delete-effects"),
        }
    }
}
impl error::Error for Error {}





/***** AUXILLARY *****/
/// The (non-negative) cost of an action, or a sum of them.
pub type Cost = u64;





/***** LIBRARY *****/
/// A ground STRIPS action.
///
/// An action is _applicable_ in a state if all its preconditions hold; applying it removes its
/// delete-effects from the state and then inserts its add-effects. Hence, should a fluent occur in
/// both, it will be true afterwards.
///
/// Actions are built once (using the builder methods below) and then handed to an [`ActionSet`],
/// after which they are only ever read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Action {
    /// The unique name of the action.
    name: Arc<str>,
    /// The fluents that must be true for the action to be applicable.
    pre:  BTreeSet<Fluent>,
    /// The fluents made true by the action.
    add:  BTreeSet<Fluent>,
    /// The fluents made false by the action.
    del:  BTreeSet<Fluent>,
    /// What it costs to execute the action.
    cost: Cost,
}

// Constructors
impl Action {
    /// Constructor for the Action.
    ///
    /// # Arguments
    /// - `name`: The name of the action. Must be unique within the [`ActionSet`] it ends up in.
    ///
    /// # Returns
    /// A new Action without preconditions or effects and a cost of 1. Use the builder methods to
    /// populate it.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self { name: Arc::from(name.as_ref()), pre: BTreeSet::new(), add: BTreeSet::new(), del: BTreeSet::new(), cost: 1 }
    }

    /// Adds preconditions to the action.
    ///
    /// # Arguments
    /// - `fluents`: The fluents that must hold before the action can be applied.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn pre(mut self, fluents: impl IntoIterator<Item = impl Into<Fluent>>) -> Self {
        self.pre.extend(fluents.into_iter().map(Into::<Fluent>::into));
        self
    }

    /// Adds add-effects to the action.
    ///
    /// # Arguments
    /// - `fluents`: The fluents that become true when the action is applied.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn add(mut self, fluents: impl IntoIterator<Item = impl Into<Fluent>>) -> Self {
        self.add.extend(fluents.into_iter().map(Into::<Fluent>::into));
        self
    }

    /// Adds delete-effects to the action.
    ///
    /// # Arguments
    /// - `fluents`: The fluents that become false when the action is applied.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn del(mut self, fluents: impl IntoIterator<Item = impl Into<Fluent>>) -> Self {
        self.del.extend(fluents.into_iter().map(Into::<Fluent>::into));
        self
    }

    /// Sets the cost of the action.
    ///
    /// # Arguments
    /// - `cost`: The new cost. Only the [A*](crate::search::astar)-driver looks at it.
    ///
    /// # Returns
    /// Self for chaining.
    #[inline]
    pub fn cost(mut self, cost: Cost) -> Self {
        self.cost = cost;
        self
    }
}

// Accessors
impl Action {
    /// Returns the name of this action.
    #[inline]
    pub fn name(&self) -> &Arc<str> { &self.name }

    /// Returns the preconditions of this action.
    #[inline]
    pub fn preconditions(&self) -> &BTreeSet<Fluent> { &self.pre }

    /// Returns the add-effects of this action.
    #[inline]
    pub fn add_effects(&self) -> &BTreeSet<Fluent> { &self.add }

    /// Returns the delete-effects of this action.
    #[inline]
    pub fn del_effects(&self) -> &BTreeSet<Fluent> { &self.del }

    /// Returns the cost of executing this action.
    #[inline]
    pub fn get_cost(&self) -> Cost { self.cost }

    /// Returns an iterator over the fluents both added and deleted by this action.
    ///
    /// For well-formed domains, this is empty.
    #[inline]
    pub fn overlapping_effects(&self) -> impl '_ + Iterator<Item = &'_ Fluent> { self.add.intersection(&self.del) }
}

// Formatting
impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{}[{}]", self.name, self.cost)?;
        write!(f, " pre {{{}}}", self.pre.iter().join(", "))?;
        write!(f, " add {{{}}}", self.add.iter().join(", "))?;
        write!(f, " del {{{}}}", self.del.iter().join(", "))
    }
}



/// A validated, ordered collection of [`Action`]s.
///
/// The order in which actions are given is kept, and is the order in which the search drivers try
/// them. That makes the drivers deterministic.
#[derive(Clone, Debug, Default)]
pub struct ActionSet {
    /// The actions, by name.
    actions: IndexMap<Arc<str>, Action>,
}

// Constructors
impl ActionSet {
    /// Constructor for the ActionSet that validates the given actions.
    ///
    /// # Arguments
    /// - `actions`: The actions to collect. Their order is preserved.
    ///
    /// # Returns
    /// A new ActionSet.
    ///
    /// # Errors
    /// This function errors if any action has an empty name, if a name occurs twice or if any
    /// action has neither add- nor delete-effects.
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Result<Self, Error> {
        let mut set: IndexMap<Arc<str>, Action> = IndexMap::new();
        for (i, action) in actions.into_iter().enumerate() {
            if action.name.is_empty() {
                return Err(Error::EmptyName { index: i });
            }
            if action.add.is_empty() && action.del.is_empty() {
                return Err(Error::NoEffects { name: action.name });
            }
            if action.overlapping_effects().next().is_some() {
                warn!(
                    "Action '{}' both adds and deletes {{{}}}; they will be true after applying it",
                    action.name,
                    action.overlapping_effects().join(", ")
                );
            }
            if set.contains_key(&action.name) {
                return Err(Error::DuplicateName { name: action.name });
            }
            set.insert(action.name.clone(), action);
        }
        debug!("Validated {} action(s)", set.len());
        Ok(Self { actions: set })
    }
}

// Collection
impl ActionSet {
    /// Finds an action by name.
    ///
    /// # Arguments
    /// - `name`: The name of the action to find.
    ///
    /// # Returns
    /// The [`Action`] with that name, or [`None`] if there is no such action.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Action> { self.actions.get(name) }

    /// Returns the action at the given position in the enumeration order.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&Action> { self.actions.get_index(index).map(|(_, a)| a) }

    /// Returns an iterator over the actions in enumeration order.
    #[inline]
    pub fn iter(&self) -> indexmap::map::Values<'_, Arc<str>, Action> { self.actions.values() }

    /// Returns the number of actions in this set.
    #[inline]
    pub fn len(&self) -> usize { self.actions.len() }

    /// Returns whether there are no actions in this set.
    #[inline]
    pub fn is_empty(&self) -> bool { self.actions.is_empty() }
}
impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a Action;
    type IntoIter = indexmap::map::Values<'a, Arc<str>, Action>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.actions.values() }
}





/***** TESTS *****/
