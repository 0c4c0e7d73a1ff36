//! `NonEmptyList`: a sequence that is guaranteed to hold at least one element.
//!
//! The invariant lives in the type, so code that receives a
//! `NonEmptyList<T>` never has to handle the "no elements" case:
//! [`NonEmptyList::head`] returns `&T`, not `Option<&T>`.
//!
//! There are three ways in:
//!
//! - [`NonEmptyList::from_vec`]: safe, returns `Option` (Nothing on empty).
//! - `TryFrom<Vec<T>>`: safe, returns [`AdtError::EmptyList`] on empty.
//! - [`NonEmptyList::unsafe_coerce`]: panics on empty. Only for data the
//!   caller has already checked.

use std::ops::Deref;

use crate::AdtError;

// ---------------------------------------------------------------------------
// NonEmptyList
// ---------------------------------------------------------------------------

/// A `Vec` with at least one element.
///
/// Derefs to `[T]`, so every read-only slice method (`iter`, `len`,
/// `contains`, indexing, ...) works directly on a `NonEmptyList`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyList<T> {
    /// Never empty. Every constructor upholds this.
    items: Vec<T>,
}

impl<T> NonEmptyList<T> {
    /// Creates a list holding exactly one element.
    pub fn new(head: T) -> Self {
        Self { items: vec![head] }
    }

    /// Creates a list from a head and the remaining elements.
    pub fn from_parts(head: T, tail: Vec<T>) -> Self {
        let mut items = Vec::with_capacity(tail.len() + 1);
        items.push(head);
        items.extend(tail);
        Self { items }
    }

    /// Returns `Some(list)` if `items` is non-empty, `None` otherwise.
    pub fn from_vec(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { items })
        }
    }

    /// Converts `items` without a fallible return type.
    ///
    /// # Panics
    /// Panics if `items` is empty. Use [`Self::from_vec`] or `TryFrom`
    /// for untrusted input.
    pub fn unsafe_coerce(items: Vec<T>) -> Self {
        match Self::from_vec(items) {
            Some(list) => list,
            None => panic!("NonEmptyList::unsafe_coerce called with an empty vector"),
        }
    }

    /// The first element. Always present.
    pub fn head(&self) -> &T {
        &self.items[0]
    }

    /// The last element. Always present.
    pub fn last(&self) -> &T {
        &self.items[self.items.len() - 1]
    }

    /// Every element after the head (possibly empty).
    pub fn tail(&self) -> &[T] {
        &self.items[1..]
    }

    /// Applies `f` to every element. Length, and therefore the
    /// non-empty invariant, is preserved.
    pub fn map<U, F>(self, f: F) -> NonEmptyList<U>
    where
        F: FnMut(T) -> U,
    {
        NonEmptyList {
            items: self.items.into_iter().map(f).collect(),
        }
    }

    /// Appends an element.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Gives back the underlying vector.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Deref for NonEmptyList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> TryFrom<Vec<T>> for NonEmptyList<T> {
    type Error = AdtError;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        Self::from_vec(items).ok_or(AdtError::EmptyList)
    }
}

impl<T> From<NonEmptyList<T>> for Vec<T> {
    fn from(list: NonEmptyList<T>) -> Self {
        list.items
    }
}

impl<T> IntoIterator for NonEmptyList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NonEmptyList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ---------------------------------------------------------------------------
// serde
// ---------------------------------------------------------------------------

// Serialized as a plain sequence. Deserializing an empty sequence is an
// error, so the invariant survives a round trip through any format.

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for NonEmptyList<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for NonEmptyList<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::try_from(items).map_err(serde::de::Error::custom)
    }
}
