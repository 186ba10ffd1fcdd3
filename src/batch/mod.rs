//! Batch orchestration over the sources index
//!
//! Discovery walks the sources listing, probes each book for access (with an
//! access-check progress stream and pacing between probes) and returns the
//! accessible candidates for external selection. The run phase then
//! assembles the selected books strictly sequentially; a failed book is
//! recorded as a permanent error and the batch moves on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compose::BookAssembler;
use crate::config::PrintConfig;
use crate::error::{PrintError, PrintResult};
use crate::fetcher::{Fetcher, has_content_marker};
use crate::images;
use crate::pacing::PacingPolicy;
use crate::progress::{ProgressKind, ProgressReporter};
use crate::utils::constants::{
    PAGE_TITLE_SELECTOR, SOURCES_EXCLUDED_SUFFIX, SOURCES_LISTING_SELECTOR, TOC_SELECTOR,
};
use crate::utils::dom;
use crate::utils::url_utils::{last_path_segment, resolve_url};

/// One accessible book found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCandidate {
    pub url: String,
    /// Suffix-free title used for display and filenames
    pub title: String,
}

/// Runs discovery and sequential assembly over many books
pub struct BatchRunner {
    config: PrintConfig,
    fetcher: Fetcher,
    pacing: PacingPolicy,
    progress: Arc<dyn ProgressReporter>,
}

impl BatchRunner {
    pub fn new(config: PrintConfig, fetcher: Fetcher, progress: Arc<dyn ProgressReporter>) -> Self {
        let pacing = PacingPolicy::from_config(&config);
        Self {
            config,
            fetcher,
            pacing,
            progress,
        }
    }

    /// Walk the sources index and return every accessible book.
    ///
    /// The excluded listing produces neither a probe nor a progress event,
    /// but still counts toward the probe total. Books whose probe fails
    /// (no access, or a network error during probing) are excluded silently.
    pub async fn discover(&self, index_url: &str) -> PrintResult<Vec<BookCandidate>> {
        let index_html = self.fetcher.fetch_document(index_url).await?;
        let listings = listing_urls(&index_html, index_url);
        let total = listings.len();
        log::info!("Sources index lists {total} books");

        let mut candidates = Vec::new();
        for (index, url) in listings.iter().enumerate() {
            if url.trim_end_matches('/').ends_with(SOURCES_EXCLUDED_SUFFIX) {
                continue;
            }
            self.progress
                .update_progress(ProgressKind::CheckAccess, index + 1, total);
            match self.probe(url).await {
                Ok(Some(title)) => candidates.push(BookCandidate {
                    url: url.clone(),
                    title,
                }),
                Ok(None) => log::debug!("No access to {url}"),
                Err(e) => log::warn!("Probe of {url} failed: {e}"),
            }
            self.pacing.wait().await;
        }

        log::info!("{} of {total} books accessible", candidates.len());
        self.progress
            .on_done("Please select the books you want to download");
        Ok(candidates)
    }

    /// Probe one book for access. Returns its title when accessible.
    ///
    /// Single-page books are probed on their own content marker; multi-page
    /// books on their first TOC sub-page, since an index page can render its
    /// TOC even without access to the content behind it.
    async fn probe(&self, url: &str) -> PrintResult<Option<String>> {
        let base_html = self.fetcher.fetch_document(url).await?;
        let probed = probe_base(&base_html, url);

        let accessible = match &probed.first_subpage {
            None if probed.single_page => has_content_marker(&base_html),
            None => false,
            Some(subpage) => {
                let sub_html = self.fetcher.fetch_document(subpage).await?;
                has_content_marker(&sub_html)
            }
        };
        Ok(accessible.then_some(probed.title))
    }

    /// Assemble every candidate in order, writing one file per book into
    /// `out_dir`. Per-book failures are recorded as permanent errors and the
    /// remaining books are still processed.
    pub async fn run(&self, candidates: &[BookCandidate], out_dir: &Path) -> PrintResult<()> {
        let total = candidates.len();
        for (index, candidate) in candidates.iter().enumerate() {
            log::info!("Printing {} ({}/{})", candidate.title, index + 1, total);
            match self.run_one(candidate, out_dir).await {
                Ok(path) => {
                    log::info!("Wrote {}", path.display());
                    self.progress.clear();
                }
                Err(e) => {
                    let error = PrintError::BatchItem {
                        title: candidate.title.clone(),
                        index: index + 1,
                        reason: e.to_string(),
                    };
                    self.progress.add_permanent_error(&error.to_string());
                }
            }
        }
        self.progress.on_done("Done downloading all books!");
        Ok(())
    }

    async fn run_one(&self, candidate: &BookCandidate, out_dir: &Path) -> PrintResult<PathBuf> {
        let assembler = BookAssembler::new(
            candidate.url.clone(),
            self.config.clone(),
            self.fetcher.clone(),
            Arc::clone(&self.progress),
        );
        let book = assembler.assemble().await?;

        // The export path inlines styles and images; the print path keeps
        // remote references and leaves rendering to the print collaborator.
        let (file_name, html) = if self.config.download_html {
            let export = images::build_export(
                &self.fetcher,
                &self.pacing,
                self.progress.as_ref(),
                &book,
            )
            .await;
            (export.file_name, export.html)
        } else {
            (images::export_file_name(&book.file_title), book.html)
        };

        let path = out_dir.join(file_name);
        std::fs::write(&path, html).map_err(|e| PrintError::Export {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

struct ProbedBase {
    title: String,
    single_page: bool,
    first_subpage: Option<String>,
}

/// Synchronous part of a probe: title, page shape and the first TOC link
fn probe_base(base_html: &str, url: &str) -> ProbedBase {
    let doc = dom::parse_document(base_html);
    let title = dom::select_first(&doc, PAGE_TITLE_SELECTOR)
        .map(|el| el.text_contents().trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| last_path_segment(url))
        .unwrap_or_else(|| url.to_string());

    let first_subpage = dom::select_first(&doc, &format!("{TOC_SELECTOR} a"))
        .and_then(|a| dom::attr(&a, "href"))
        .and_then(|href| resolve_url(url, &href).ok());

    ProbedBase {
        title,
        single_page: dom::select_first(&doc, TOC_SELECTOR).is_none(),
        first_subpage,
    }
}

/// Absolute listing URLs from the sources index, in DOM order
fn listing_urls(index_html: &str, index_url: &str) -> Vec<String> {
    let doc = dom::parse_document(index_html);
    dom::select_all(&doc, SOURCES_LISTING_SELECTOR)
        .iter()
        .filter_map(|a| dom::attr(a, "href"))
        .filter_map(|href| resolve_url(index_url, &href).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "https://example.com/sources";

    #[test]
    fn listings_are_resolved_in_dom_order() {
        let urls = listing_urls(
            "<html><body>\
             <a class=\"sources-listing--item\" href=\"/sources/a\">A</a>\
             <a class=\"other\" href=\"/sources/x\">X</a>\
             <a class=\"sources-listing--item\" href=\"https://example.com/sources/b\">B</a>\
             </body></html>",
            INDEX,
        );
        assert_eq!(
            urls,
            vec![
                "https://example.com/sources/a".to_string(),
                "https://example.com/sources/b".to_string(),
            ]
        );
    }

    #[test]
    fn probe_base_prefers_page_title() {
        let probed = probe_base(
            "<html><body><h1 class=\"page-title\"> Lost Mine </h1>\
             <div class=\"compendium-toc-full-text\"><a href=\"/sources/lmop/ch1\">One</a></div>\
             </body></html>",
            "https://example.com/sources/lmop",
        );
        assert_eq!(probed.title, "Lost Mine");
        assert!(!probed.single_page);
        assert_eq!(
            probed.first_subpage.as_deref(),
            Some("https://example.com/sources/lmop/ch1")
        );
    }

    #[test]
    fn probe_base_falls_back_to_url_segment() {
        let probed = probe_base(
            "<html><body><p>teaser</p></body></html>",
            "https://example.com/sources/lmop",
        );
        assert_eq!(probed.title, "lmop");
        assert!(probed.single_page);
        assert!(probed.first_subpage.is_none());
    }
}
