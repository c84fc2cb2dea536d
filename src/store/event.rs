//! The habit event record and the delete selector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One logged occurrence of a habit. Immutable once created — the store
/// supports create, read, and delete, never update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HabitEvent {
    /// Unique within the store for its lifetime; monotonically increasing,
    /// assigned by the store, never reused.
    pub id: u64,
    /// User-supplied, non-empty. Not unique — the same habit may be logged
    /// many times.
    pub habit_name: String,
    /// Opaque non-empty label. `Completed` and `Skipped` are conventional,
    /// but the store accepts any non-empty text.
    pub status: String,
    /// Creation time, assigned by the store.
    pub timestamp: DateTime<Utc>,
}

/// Target of a delete operation.
///
/// Deleting by name removes **all** events for that habit; deleting by id
/// removes a single entry. The two are deliberately separate selectors so
/// "delete a habit" is never ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// One specific event.
    ById(u64),
    /// Every event whose `habit_name` matches exactly (case-sensitive).
    ByName(String),
}

/// Reject empty or whitespace-only user input for the named field.
///
/// The stored value is kept exactly as supplied — validation only guards
/// against emptiness, it does not normalize.
pub fn require_nonempty(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(Error::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}
