//! Durable habit event log: append, query, delete.
//!
//! - [`event`] — the [`HabitEvent`] record and delete [`Selector`].
//! - [`log`] — [`HabitLog`], the JSON Lines file store with append-safe
//!   writes, atomic delete rewrites, and torn-final-line recovery.

pub mod event;
pub mod log;

pub use event::{HabitEvent, Selector};
pub use log::HabitLog;
