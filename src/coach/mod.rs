//! Tip generation: prompt construction, capability invocation, and output
//! sanitizing.
//!
//! - [`capability`] — the [`TextGenerator`] seam over the external
//!   text-generation service, with its own failure type.
//! - [`generator`] — [`TipGenerator`], which turns a habit name into a
//!   validated, bounded motivational string with a bounded retry on
//!   degenerate output.

pub mod capability;
pub mod generator;

pub use capability::{CapabilityError, GenerateFuture, GenerationRequest, TextGenerator};
pub use generator::{CoachConfig, TipGenerator};
