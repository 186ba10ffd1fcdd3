//! Shared constants: brand token, selectors, and fixed strings
//!
//! The selectors describe the compendium site structure the assembler
//! understands. They are data, not policy; changing one here changes it for
//! every component.

use std::time::Duration;

/// Brand token used to namespace heading ids in the merged document.
///
/// Every heading id collected from a sub-page is prefixed with this token so
/// it cannot collide with ids the merged document already contains.
pub const BRAND: &str = "bookbinder";

/// Chrome user agent for outgoing requests
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// A table-of-contents block inside a book's index page
pub const TOC_SELECTOR: &str = ".compendium-toc-full-text";

/// Id assigned to the first TOC block; backlinks jump here
pub const TOC_ANCHOR_ID: &str = "toc";

/// Marker present on every readable article page. Its absence means the page
/// is missing or the account has no access.
pub const CONTENT_MARKER_SELECTOR: &str = ".p-article-content";

/// Region of a page that carries its styles and headings
pub const PRIMARY_CONTENT_SELECTOR: &str = ".primary-content";

/// Sub-headings that carry their own jump anchors
pub const SUBHEADING_SELECTOR: &str = ".primary-content h2.heading-anchor";

/// Book title on the index page
pub const PAGE_TITLE_SELECTOR: &str = ".page-title";

/// Logged-in username shown on the index page
pub const USERNAME_SELECTOR: &str = ".user-interactions-profile-nickname";

/// Known cover-art locations, first match wins
pub const COVER_SELECTORS: [&str; 3] = [".view-cover-art a", "a.view-cover-art", "#CoverImage a"];

/// Link to a book's introduction page, when one exists
pub const INTRODUCTION_LINK_SELECTOR: &str = "a[href$=\"/introduction\"]";

/// Buttons switching between alternate "essentials" editions of a book
pub const EDITION_BUTTON_SELECTOR: &str = ".essentials-button";

/// Class carried by the currently active edition button
pub const EDITION_ACTIVE_CLASS: &str = "essentials-button--active";

/// Dual-map pattern: player-version link inside a figure caption
pub const FIGURE_PLAYER_MAP_SELECTOR: &str =
    "figure > a + figcaption > a[data-title='View Player Version']";

/// Dual-map pattern: dedicated player-version container following the figure
pub const PLAYER_MAP_CONTAINER_SELECTOR: &str = ".compendium-image-view-player a";

/// Caption appended next to synthesized player-version map images
pub const DUAL_MAP_CAPTION: &str = "(DM-Version above, Player-Version below) ";

/// One book listing on the sources index page
pub const SOURCES_LISTING_SELECTOR: &str = "a.sources-listing--item";

/// Listing excluded from batch runs (not a printable book)
pub const SOURCES_EXCLUDED_SUFFIX: &str = "sources/ua";

/// Fixed genre hint optionally appended to the extracted title
pub const GENRE_SUFFIX: &str = " for Dungeons and Dragons Fifth Edition";

/// Attribution line for the title page
pub const PRINTED_WITH_HINT: &str = "Printed with Bookbinder";

/// Upper bound for downloading and encoding one image during export.
/// Images that miss this bound are abandoned; the export continues.
pub const IMAGE_INLINE_TIMEOUT: Duration = Duration::from_secs(3);
