//! Typed failure kinds shared by the store and the tip generator.
//!
//! Every fallible operation in the crate returns one of these variants, and
//! no kind is ever reported disguised as another: the store only produces
//! `Validation` and `Storage*`, the generator only `Validation` and
//! `Generation`. The CLI façade maps each kind to a distinct exit code.

use thiserror::Error;

/// Errors surfaced by the habit log store and the tip generator.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed input — the caller's fault, never retried.
    #[error("invalid input: {0}")]
    Validation(String),

    /// I/O failure against the durable store. Not retried automatically;
    /// a single local file is either available or not, and masking the
    /// failure would hide data loss.
    #[error("storage failure ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The durable store contains a record that cannot be decoded. A torn
    /// final line (interrupted append) is recovered from silently; this
    /// variant means corruption earlier in the file.
    #[error("storage corrupt at line {line}: {detail}")]
    StorageCorrupt { line: usize, detail: String },

    /// The text-generation capability was unavailable, timed out, or kept
    /// producing degenerate output after the retry budget was exhausted.
    #[error("tip generation failed: {0}")]
    Generation(String),
}

impl Error {
    /// Shorthand for a [`Error::Storage`] with context.
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Storage {
            context: context.into(),
            source,
        }
    }
}
