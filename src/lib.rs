//! Single-user habit log with LLM-generated motivational tips.
//!
//! `habitify` records daily habit-completion events in a durable local
//! JSON Lines file and can produce a short motivational message for a named
//! habit by calling an external chat-completions API. The crate has two
//! cores:
//!
//! - [`store::HabitLog`] — the durable event log: validated appends,
//!   creation-order queries with exact-name filtering, and idempotent
//!   deletes by id or by name (by name removes **all** matching entries).
//! - [`coach::TipGenerator`] — turns a habit name into a validated, bounded
//!   tip string: deterministic prompt, per-call deadline, echo-stripping and
//!   whitespace-collapsing post-processing, and a bounded retry when the
//!   capability returns degenerate output.
//!
//! The external model sits behind the [`coach::TextGenerator`] trait;
//! [`api::CompletionClient`] is the production implementor and test code
//! substitutes stubs. Tips are never persisted, and generation never touches
//! the store.
//!
//! # Getting started
//!
//! ```ignore
//! use habitify::{CoachConfig, CompletionClient, HabitLog, Selector, TipGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), habitify::Error> {
//!     let log = HabitLog::open(".habitify/events.jsonl")?;
//!     log.log("Exercise", "Completed")?;
//!     for event in log.view(Some("Exercise"))? {
//!         println!("{} {}: {}", event.timestamp, event.habit_name, event.status);
//!     }
//!
//!     let api_key = std::env::var("OPENROUTER_KEY").unwrap();
//!     let client = CompletionClient::new(api_key, habitify::DEFAULT_MODEL)?;
//!     let generator = TipGenerator::new(&client, CoachConfig::default());
//!     println!("{}", generator.generate("Exercise").await?);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod coach;
pub mod error;
pub mod store;

// Re-export the crate surface at the root.
pub use api::CompletionClient;
pub use coach::{CapabilityError, CoachConfig, TextGenerator, TipGenerator};
pub use error::Error;
pub use store::{HabitEvent, HabitLog, Selector};

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for tip generation.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
