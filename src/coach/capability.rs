//! The seam between the tip generator and the external text-generation
//! capability.
//!
//! The capability is a black box: a request carrying prompt text, an output
//! budget, and a randomness parameter goes in; generated text or a failure
//! signal comes out. Model architecture, weights, and loading are out of
//! scope behind this trait. Production code uses
//! [`CompletionClient`](crate::api::CompletionClient); tests substitute
//! stubs.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Boxed future returned by [`TextGenerator::complete`].
///
/// Type alias to keep trait signatures and implementations readable.
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, CapabilityError>> + Send + 'a>>;

/// One request to the text-generation capability.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Maximum tokens the capability may produce.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Failure signals the capability contract allows.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The capability could not be reached or returned something unusable
    /// (transport failure, non-2xx status, malformed or empty response).
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The capability did not answer within its deadline.
    #[error("capability timed out")]
    Timeout,
}

impl From<CapabilityError> for crate::error::Error {
    fn from(err: CapabilityError) -> Self {
        crate::error::Error::Generation(err.to_string())
    }
}

/// An external text-generation capability.
///
/// Implementors receive the request and return the raw generated text —
/// unsanitized, possibly echoing the prompt. The generator owns all
/// post-processing and retry decisions.
pub trait TextGenerator: Send + Sync {
    fn complete(&self, request: GenerationRequest) -> GenerateFuture<'_>;
}
