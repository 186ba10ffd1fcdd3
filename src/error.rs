//! Error taxonomy for book assembly operations
//!
//! Four failure classes with different blast radii: fetch failures abort the
//! current assembly, access failures are policy-gated, image failures are
//! always non-fatal, and batch-item failures are isolated per book.

/// Errors produced while assembling or exporting a book
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    /// Network failure or non-2xx status. Not retried; aborts the current
    /// single-book assembly.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The fetched page is missing the expected content marker, which means
    /// either the page does not exist or the account has no access to it.
    /// Gated by `fail_on_error`: abort the assembly, or skip the page.
    #[error("Could not find page \"{page}\". Make sure you have access to the book!")]
    AccessOrNotFound { page: String },

    /// A single image could not be downloaded or encoded in time.
    /// Always non-fatal; recorded and skipped.
    #[error("Failed to load image {url}: {reason}")]
    Image { url: String, reason: String },

    /// One book's full assembly failed inside a batch run.
    /// Non-fatal at the batch level; remaining books are still processed.
    #[error("Could not print book {title} ({index}) because of error {reason}")]
    BatchItem {
        title: String,
        index: usize,
        reason: String,
    },

    /// Writing an export file to disk failed.
    #[error("Failed to write {path}: {reason}")]
    Export { path: String, reason: String },

    /// An alternate-edition assembly task failed to complete.
    #[error("Edition assembly failed: {0}")]
    Edition(String),

    /// Malformed input that could not be interpreted (bad URL, broken markup).
    #[error("Invalid document input: {0}")]
    Invalid(String),
}

impl PrintError {
    /// Build a fetch error from a reqwest failure
    pub(crate) fn fetch(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate
pub type PrintResult<T> = Result<T, PrintError>;
