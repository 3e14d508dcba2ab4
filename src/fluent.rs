//  FLUENT.rs
//    by Lut99
//
//  Created:
//    14 Feb 2025, 09:12:40
//  Last edited:
//    19 Feb 2025, 16:55:03
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines [`Fluent`]s, the atomic propositions that make up a
//!   [`State`](crate::state::State).
//

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter, Result as FResult};
use std::hash::{Hash, Hasher};
use std::sync::Arc;


/***** LIBRARY *****/
/// A single atomic proposition, like `at_base` or `battery_10`.
///
/// Fluents are identified by their name. The name is shared behind an [`Arc`], so cloning a
/// fluent is cheap; use an [`Interner`] to make sure equal names also share their allocation,
/// which turns most equality checks into a pointer comparison.
#[derive(Clone)]
pub struct Fluent(Arc<str>);
impl Fluent {
    /// Constructor for the Fluent.
    ///
    /// # Arguments
    /// - `name`: The symbolic name of the fluent.
    ///
    /// # Returns
    /// A new Fluent with its own allocation for `name`.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self { Self(Arc::from(name.as_ref())) }

    /// Returns the name of this fluent.
    #[inline]
    pub fn name(&self) -> &str { &self.0 }
}

impl Eq for Fluent {}
impl PartialEq for Fluent {
    #[inline]
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0 }
}
impl Ord for Fluent {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering { if Arc::ptr_eq(&self.0, &other.0) { Ordering::Equal } else { self.0.cmp(&other.0) } }
}
impl PartialOrd for Fluent {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
impl Hash for Fluent {
    // NOTE: Must agree with `str`'s hash for the `Borrow<str>` impl below.
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) { self.0.hash(state) }
}
impl Borrow<str> for Fluent {
    #[inline]
    fn borrow(&self) -> &str { &self.0 }
}
impl AsRef<str> for Fluent {
    #[inline]
    fn as_ref(&self) -> &str { &self.0 }
}

impl Debug for Fluent {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "Fluent({:?})", &*self.0) }
}
impl Display for Fluent {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.0) }
}

impl From<&str> for Fluent {
    #[inline]
    fn from(value: &str) -> Self { Self::new(value) }
}
impl From<String> for Fluent {
    #[inline]
    fn from(value: String) -> Self { Self(Arc::from(value)) }
}



/// Hands out [`Fluent`]s such that equal names share the same allocation.
///
/// Grounding creates the same few fluents (`at_pickup`, `battery_4`, ...) over and over again;
/// running them through one interner keeps memory down and makes the comparisons in the hot path
/// of the search a pointer check.
#[derive(Clone, Debug, Default)]
pub struct Interner {
    /// The fluents handed out so far.
    known: HashSet<Fluent>,
}
impl Interner {
    /// Constructor for the Interner that initializes it as empty.
    ///
    /// # Returns
    /// A new Interner that has not seen any fluents yet.
    #[inline]
    pub fn new() -> Self { Self { known: HashSet::new() } }

    /// Returns the fluent with the given name, creating it if we haven't seen it before.
    ///
    /// # Arguments
    /// - `name`: The name of the fluent to intern.
    ///
    /// # Returns
    /// A [`Fluent`] that shares its allocation with every other fluent of the same name returned
    /// by this interner.
    pub fn intern(&mut self, name: impl AsRef<str>) -> Fluent {
        let name: &str = name.as_ref();
        if let Some(fluent) = self.known.get(name) {
            return fluent.clone();
        }
        let fluent = Fluent::new(name);
        self.known.insert(fluent.clone());
        fluent
    }

    /// Returns the number of unique fluents seen so far.
    #[inline]
    pub fn len(&self) -> usize { self.known.len() }

    /// Returns whether no fluents have been interned yet.
    #[inline]
    pub fn is_empty(&self) -> bool { self.known.is_empty() }
}





/***** TESTS *****/
