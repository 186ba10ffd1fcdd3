//! Composite document assembly
//!
//! `BookAssembler` drives one assembly run: fetch the index page, prepare
//! the title page, cover and traversal list in a synchronous phase, crawl
//! every sub-page with pacing between requests, then finalize the merged
//! document with a rewritten table-of-contents copy and the fixed print
//! style sheet.
//!
//! Books published in alternate editions (an edition button group whose
//! first button is active) are assembled by fanning out one task per
//! non-active edition and concatenating their parts in button order.

pub mod stylesheet;

use std::sync::Arc;

use crate::config::PrintConfig;
use crate::error::{PrintError, PrintResult};
use crate::fetcher::Fetcher;
use crate::pacing::PacingPolicy;
use crate::progress::{EditionCounters, EditionProgress, ProgressKind, ProgressReporter};
use crate::toc::{self, AnchorRegistry};
use crate::transform::{self, TransformContext};
use crate::utils::constants::{
    COVER_SELECTORS, EDITION_ACTIVE_CLASS, EDITION_BUTTON_SELECTOR, GENRE_SUFFIX,
    PAGE_TITLE_SELECTOR, PRINTED_WITH_HINT, TOC_SELECTOR, USERNAME_SELECTOR,
};
use crate::utils::dom;
use crate::utils::url_utils::{is_image_target, resolve_url};

/// Append-only part buffers for one assembly run, consumed once on join
#[derive(Debug, Default)]
pub struct CompositeParts {
    /// Per-page style fragments, traversal order
    pub header_parts: Vec<String>,
    /// Title page and cover, rendered before the contents copy
    pub pre_toc_parts: Vec<String>,
    /// Contents copy followed by per-page body fragments
    pub body_parts: Vec<String>,
}

impl CompositeParts {
    fn join(self) -> HtmlParts {
        HtmlParts {
            head: self.header_parts.join("\n"),
            body: format!(
                "{}\n{}",
                self.pre_toc_parts.join("\n"),
                self.body_parts.join("\n")
            ),
        }
    }
}

/// Joined head and body markup of one assembled book or edition
#[derive(Debug, Clone, Default)]
pub struct HtmlParts {
    pub head: String,
    pub body: String,
}

/// The finished composite document plus the metadata the export path needs
#[derive(Debug, Clone)]
pub struct AssembledBook {
    /// Display title, genre suffix applied when configured
    pub title: String,
    /// Suffix-free title used for filenames and batch display
    pub file_title: String,
    /// Composite markup: per-page styles, print style sheet, body sections
    pub html: String,
    /// Absolute URLs of the index page's head stylesheets, inlined on export
    pub stylesheet_urls: Vec<String>,
}

/// Everything extracted from the index page in one synchronous pass
#[derive(Debug, Default)]
struct BasePrep {
    title_raw: String,
    pre_toc_parts: Vec<String>,
    registry: AnchorRegistry,
    single_page: bool,
    edition_urls: Vec<String>,
    stylesheet_urls: Vec<String>,
}

/// Assembles one book into a composite printable document
pub struct BookAssembler {
    url: String,
    config: PrintConfig,
    fetcher: Fetcher,
    pacing: PacingPolicy,
    progress: Arc<dyn ProgressReporter>,
}

impl BookAssembler {
    pub fn new(
        url: impl Into<String>,
        config: PrintConfig,
        fetcher: Fetcher,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        let pacing = PacingPolicy::from_config(&config);
        Self {
            url: url.into(),
            config,
            fetcher,
            pacing,
            progress,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Assemble the whole book into a composite document.
    ///
    /// Detects the alternate-edition case on the index page and fans out one
    /// assembly task per non-active edition; otherwise crawls this book's own
    /// pages.
    pub async fn assemble(&self) -> PrintResult<AssembledBook> {
        let base_html = self.fetcher.fetch_document(&self.url).await?;
        let prep = prepare_base(&base_html, &self.url, &self.config);

        let title = display_title(&prep.title_raw, &self.config);
        let file_title = prep.title_raw.clone();
        let stylesheet_urls = prep.stylesheet_urls.clone();

        let parts = if prep.edition_urls.is_empty() {
            self.crawl_and_finalize(&base_html, prep).await?
        } else {
            self.assemble_editions(&prep.edition_urls).await?
        };

        Ok(AssembledBook {
            title,
            file_title,
            html: render_document(&parts, &self.config),
            stylesheet_urls,
        })
    }

    /// Assemble this book's own pages, ignoring edition buttons.
    /// Used for each edition inside a fan-out; fan-outs never nest.
    async fn assemble_parts(&self) -> PrintResult<HtmlParts> {
        let base_html = self.fetcher.fetch_document(&self.url).await?;
        let prep = prepare_base(&base_html, &self.url, &self.config);
        self.crawl_and_finalize(&base_html, prep).await
    }

    async fn assemble_editions(&self, edition_urls: &[String]) -> PrintResult<HtmlParts> {
        log::info!(
            "Assembling {} alternate editions of {}",
            edition_urls.len(),
            self.url
        );
        let counters: EditionCounters = Arc::default();
        let mut handles = Vec::with_capacity(edition_urls.len());
        for (index, edition_url) in edition_urls.iter().enumerate() {
            let assembler = Self {
                url: edition_url.clone(),
                config: self.config.clone(),
                fetcher: self.fetcher.clone(),
                pacing: self.pacing,
                progress: Arc::new(EditionProgress::new(
                    Arc::clone(&self.progress),
                    Arc::clone(&counters),
                    index,
                )),
            };
            handles.push(tokio::spawn(
                async move { assembler.assemble_parts().await },
            ));
        }

        let mut merged = HtmlParts::default();
        for result in futures::future::join_all(handles).await {
            let parts = result.map_err(|e| PrintError::Edition(e.to_string()))??;
            merged.head.push_str(&parts.head);
            merged.body.push_str(&parts.body);
        }
        Ok(merged)
    }

    /// Crawl the traversal list sequentially, then finalize the merged
    /// document with the rewritten contents copy.
    async fn crawl_and_finalize(
        &self,
        base_html: &str,
        prep: BasePrep,
    ) -> PrintResult<HtmlParts> {
        let mut registry = prep.registry;
        let mut parts = CompositeParts {
            pre_toc_parts: prep.pre_toc_parts,
            ..CompositeParts::default()
        };

        let traversal = registry.subpages.clone();
        let total = traversal.len();
        for (index, page) in traversal.iter().enumerate() {
            if is_image_target(page) {
                let caption = registry
                    .primary_text
                    .get(page)
                    .map(String::as_str)
                    .filter(|text| !text.is_empty());
                log::debug!("Including image target {page}");
                parts.body_parts.push(transform::image_fragment(page, caption));
            } else {
                self.crawl_page(page, prep.single_page, &mut registry, &mut parts)
                    .await?;
            }
            self.pacing.wait().await;
            self.progress
                .update_progress(ProgressKind::Subpage, index + 1, total);
        }

        if !prep.single_page {
            let toc_copy = finalize_toc_copy(base_html, &self.url, &self.config, &registry);
            if let Some(toc_copy) = toc_copy {
                parts.body_parts.insert(0, toc_copy);
            }
        }

        Ok(parts.join())
    }

    async fn crawl_page(
        &self,
        page: &str,
        single_page: bool,
        registry: &mut AnchorRegistry,
        parts: &mut CompositeParts,
    ) -> PrintResult<()> {
        let html = self.fetcher.fetch_document(page).await?;
        let ctx = TransformContext {
            config: &self.config,
            single_page,
        };
        match transform::transform_page(&html, page, &ctx) {
            Ok(transformed) => {
                parts.header_parts.push(transformed.header);
                parts.body_parts.push(transformed.body);
                if let Some(id) = transformed.namespaced_id {
                    registry.record_id(page, id);
                }
                Ok(())
            }
            Err(err @ PrintError::AccessOrNotFound { .. }) => {
                if self.config.fail_on_error {
                    return Err(err);
                }
                log::warn!("Skipping inaccessible page {page}: {err}");
                parts.body_parts.push(String::new());
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Extract everything the assembly needs from the index page in one
/// synchronous pass over a single parse tree.
fn prepare_base(base_html: &str, base_url: &str, config: &PrintConfig) -> BasePrep {
    let doc = dom::parse_document(base_html);

    let single_page = toc::is_single_page(&doc);

    let title_raw = dom::select_first(&doc, PAGE_TITLE_SELECTOR)
        .map(|el| el.text_contents().trim().to_string())
        .unwrap_or_default();
    let username = dom::select_first(&doc, USERNAME_SELECTOR)
        .map(|el| el.text_contents().trim().to_string())
        .filter(|name| !name.is_empty());

    let mut pre_toc_parts = Vec::new();
    if let Some(title_page) = title_page_fragment(&title_raw, username.as_deref(), config) {
        pre_toc_parts.push(title_page);
    }
    if config.include_cover
        && let Some(cover) = cover_fragment(&doc, base_url)
    {
        pre_toc_parts.push(cover);
    }

    let registry = if single_page {
        let mut registry = AnchorRegistry::new();
        registry.register(base_url.to_string(), "", None);
        registry
    } else {
        if config.include_introduction {
            toc::inject_introduction(&doc, base_url);
        }
        toc::extract_site_links(&doc, base_url)
    };

    BasePrep {
        title_raw,
        pre_toc_parts,
        registry,
        single_page,
        edition_urls: edition_urls(&doc, base_url),
        stylesheet_urls: head_stylesheet_urls(&doc, base_url),
    }
}

/// Display title with the optional genre suffix
#[must_use]
pub fn display_title(title_raw: &str, config: &PrintConfig) -> String {
    if !title_raw.is_empty() && config.include_genre_suffix {
        format!("{title_raw}{GENRE_SUFFIX}")
    } else {
        title_raw.to_string()
    }
}

/// Title-page section: title and username nested in a centered container,
/// attribution line outside it. `None` when every line is disabled.
fn title_page_fragment(
    title_raw: &str,
    username: Option<&str>,
    config: &PrintConfig,
) -> Option<String> {
    let mut inner: Vec<String> = Vec::new();
    if config.include_title {
        inner.push(format!(
            "<div class=\"title\">{}</div>",
            display_title(title_raw, config)
        ));
    }
    if config.include_username
        && let Some(username) = username
    {
        inner.push(format!("<div class=\"username\">Printed by {username}</div>"));
    }

    let mut lines: Vec<String> = Vec::new();
    if !inner.is_empty() {
        lines.push(format!(
            "<div class=\"title-container\">{}</div>",
            inner.join("\n")
        ));
    }
    if config.include_printed_with_hint {
        lines.push(format!(
            "<div class=\"printed-with-hint\">{PRINTED_WITH_HINT}</div>"
        ));
    }
    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "<div class=\"print-section title-page\">{}</div>",
        lines.join("\n")
    ))
}

/// Cover-image section from the first matching cover-art location
fn cover_fragment(doc: &kuchiki::NodeRef, base_url: &str) -> Option<String> {
    for selector in COVER_SELECTORS {
        let Some(link) = dom::select_first(doc, selector) else {
            continue;
        };
        let Some(href) = dom::attr(&link, "href").filter(|h| !h.is_empty()) else {
            continue;
        };
        match resolve_url(base_url, &href) {
            Ok(href) => {
                log::debug!("Cover art at {href}");
                return Some(format!(
                    "<div class=\"print-section cover-img\"><img src=\"{href}\" alt=\"cover\" /></div>"
                ));
            }
            Err(e) => log::warn!("Skipping cover link: {e}"),
        }
    }
    None
}

/// Absolute target URLs of the non-active edition buttons. Empty unless the
/// button group exists and its first button is the active one, meaning this
/// index page stands for the whole edition set.
fn edition_urls(doc: &kuchiki::NodeRef, base_url: &str) -> Vec<String> {
    let buttons = dom::select_all(doc, EDITION_BUTTON_SELECTOR);
    let first_is_active = buttons.first().is_some_and(|first| {
        dom::attr(first, "class").is_some_and(|classes| {
            classes
                .split_whitespace()
                .any(|class| class == EDITION_ACTIVE_CLASS)
        })
    });
    if !first_is_active {
        return Vec::new();
    }
    buttons
        .iter()
        .skip(1)
        .filter_map(|button| dom::select_first(button.as_node(), "a"))
        .filter_map(|a| dom::attr(&a, "href"))
        .filter_map(|href| resolve_url(base_url, &href).ok())
        .collect()
}

/// Absolute URLs of the index page's head stylesheets
fn head_stylesheet_urls(doc: &kuchiki::NodeRef, base_url: &str) -> Vec<String> {
    dom::select_all(doc, "head link")
        .iter()
        .filter(|link| dom::attr(link, "rel").as_deref() == Some("stylesheet"))
        .filter_map(|link| dom::attr(link, "href"))
        .filter_map(|href| resolve_url(base_url, &href).ok())
        .collect()
}

/// Build the contents copy on an owned re-parse of the index page.
///
/// Ids only exist after the crawl, so the href rewrite has to run here, not
/// during preparation. The re-parse repeats the anchor marking and
/// introduction injection so the copy matches the traversal that was
/// actually crawled.
fn finalize_toc_copy(
    base_html: &str,
    base_url: &str,
    config: &PrintConfig,
    registry: &AnchorRegistry,
) -> Option<String> {
    let doc = dom::parse_document(base_html);
    if dom::select_first(&doc, TOC_SELECTOR).is_none() {
        return None;
    }
    toc::mark_toc_anchor(&doc);
    if config.include_introduction {
        toc::inject_introduction(&doc, base_url);
    }
    toc::rewrite_toc_links(&doc, base_url, &registry.ids);
    let blocks = toc::toc_blocks_html(&doc);
    Some(format!(
        "<div class=\"print-section\">{}</div>",
        blocks.join("\n")
    ))
}

/// Wrap the joined parts with the print style sheet into the composite
/// document fragment.
#[must_use]
pub fn render_document(parts: &HtmlParts, config: &PrintConfig) -> String {
    format!(
        "<div>\n{}\n<style>{}</style>\n{}\n</div>",
        parts.head,
        stylesheet::book_css(config),
        parts.body
    )
}
