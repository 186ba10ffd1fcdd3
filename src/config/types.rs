//! The configuration record controlling one assembly run
//!
//! A closed set of named booleans and numbers. Treated as immutable input to
//! one run: loaded once at process start, threaded through every entry
//! point, never read ad hoc.

use serde::{Deserialize, Serialize};

/// Current configuration schema version
pub const CONFIG_VERSION: u32 = 1;

/// Options for one book assembly run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintConfig {
    /// Lower pacing bound between network requests, in milliseconds
    pub min_page_delay_ms: u64,
    /// Upper pacing bound between network requests, in milliseconds.
    /// Invariant `min_page_delay_ms <= max_page_delay_ms` is enforced by
    /// [`PrintConfig::normalized`].
    pub max_page_delay_ms: u64,

    /// Shade every other table row in the fixed style sheet
    pub stripped_tables: bool,
    /// Prepend a cover-image section when cover art is found
    pub include_cover: bool,
    /// Synthesize an Introduction entry into the table of contents when the
    /// book links one
    pub include_introduction: bool,
    /// Append "back to contents" anchors after rewritten headings
    pub include_backlinks: bool,

    /// Prepend a title page
    pub include_title: bool,
    /// Suffix the title with the fixed genre hint
    pub include_genre_suffix: bool,
    /// Show the detected username on the title page
    pub include_username: bool,
    /// Show the attribution line on the title page
    pub include_printed_with_hint: bool,

    /// Abort the whole assembly when a sub-page is missing its content
    /// marker; otherwise the page contributes an empty fragment.
    pub fail_on_error: bool,
    /// Produce a self-contained export file (inlined styles and images)
    /// instead of a composite payload for direct printing.
    pub download_html: bool,

    /// Synthesize an inline player-facing duplicate for dual map images
    pub include_player_version_maps: bool,
    /// Upscale game-master map images to the linked full-resolution asset
    pub use_big_map_images: bool,

    /// Force top-level headings onto a new printed page
    pub heading_on_new_page: bool,

    /// Gate completion on an operator confirmation signal.
    /// Carried for the rendering collaborator; the engine never waits on it.
    pub wait_for_confirmation: bool,

    /// Schema version of this record. Persisted configs without a version
    /// are migrated on load.
    pub version: u32,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            min_page_delay_ms: 250,
            max_page_delay_ms: 750,
            stripped_tables: true,
            include_cover: true,
            include_introduction: true,
            include_backlinks: true,
            include_title: true,
            include_genre_suffix: true,
            include_username: true,
            include_printed_with_hint: true,
            fail_on_error: true,
            download_html: true,
            include_player_version_maps: true,
            use_big_map_images: true,
            heading_on_new_page: true,
            wait_for_confirmation: false,
            version: CONFIG_VERSION,
        }
    }
}

impl PrintConfig {
    /// Enforce the pacing invariant by swapping inverted bounds
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.min_page_delay_ms > self.max_page_delay_ms {
            std::mem::swap(&mut self.min_page_delay_ms, &mut self.max_page_delay_ms);
        }
        self
    }
}
