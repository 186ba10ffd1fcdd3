//! Bookbinder assembles multi-page online compendium books into single
//! printable documents.
//!
//! The engine crawls a book's table of contents, fetches every sub-page,
//! rewrites heading ids and contents links so cross-references resolve
//! inside the merged document, and renders one composite document with a
//! fixed print style sheet. The export path additionally inlines the site's
//! stylesheets and every image as base64 data URIs, producing a
//! self-contained HTML file. A batch mode discovers accessible books on a
//! sources index and assembles them sequentially.

pub mod batch;
pub mod compose;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod images;
pub mod pacing;
pub mod progress;
pub mod toc;
pub mod transform;
pub mod utils;

pub use batch::{BatchRunner, BookCandidate};
pub use compose::{AssembledBook, BookAssembler, CompositeParts, HtmlParts};
pub use config::{ConfigStore, PrintConfig, StoredConfig};
pub use error::{PrintError, PrintResult};
pub use fetcher::Fetcher;
pub use images::{ExportFile, build_export};
pub use pacing::PacingPolicy;
pub use progress::{
    EditionProgress, LogProgress, NoOpProgress, ProgressKind, ProgressReporter,
};
pub use toc::AnchorRegistry;
pub use transform::{TransformContext, TransformedPage};
