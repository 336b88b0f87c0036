//! Tri-state field used by partial updates.

use serde::{Deserialize, Deserializer};

/// A single field of a partial update.
///
/// Deserializes from JSON as follows: a missing field is `Unset` (requires
/// `#[serde(default)]` on the containing field), an explicit `null` is
/// `Clear`, and any other value is `Set`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Leave the current value untouched.
    Unset,
    /// Remove the current value.
    Clear,
    /// Replace the current value.
    Set(T),
}

impl<T> Patch<T> {
    /// Returns true when the field was not supplied.
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    /// Returns the new value, if one was supplied.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Converts the contained value, keeping the state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Clear => Patch::Clear,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

/// `Some(v)` sets the field, `None` clears it.
impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}
