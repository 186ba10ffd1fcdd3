//! Table-of-contents crawling
//!
//! Walks every TOC block of a book's index page in DOM order and produces
//! the traversal list plus the anchor registry used to keep cross-references
//! resolvable inside the merged document. A book without any TOC block is
//! single-page; its crawl set is just itself.
//!
//! All functions here are synchronous and operate on one owned parse tree.

use kuchiki::NodeRef;
use std::collections::{HashMap, HashSet};

use crate::utils::constants::{
    INTRODUCTION_LINK_SELECTOR, TOC_ANCHOR_ID, TOC_SELECTOR,
};
use crate::utils::dom;
use crate::utils::url_utils::{resolve_url, split_fragment};

/// Mapping from sub-page reference to its link handles
///
/// Built once per assembly by the crawl, then filled with namespaced heading
/// ids by the page transformer and finally consumed when the TOC copy's
/// links are rewritten.
#[derive(Debug, Default, Clone)]
pub struct AnchorRegistry {
    /// Ordered traversal list; first-occurrence DOM order, no duplicates
    pub subpages: Vec<String>,
    /// Fragment handles recorded per reference across repeated TOC mentions
    pub fragments: HashMap<String, Vec<String>>,
    /// Text of the primary link per reference (image captions)
    pub primary_text: HashMap<String, String>,
    /// Namespaced heading id per reference, filled during transformation
    pub ids: HashMap<String, String>,
}

impl AnchorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one TOC link occurrence.
    ///
    /// The first occurrence of a path becomes its primary handle and joins
    /// the traversal list; later occurrences only contribute fragment
    /// handles. Bare repeats without a fragment are dropped.
    pub fn register(&mut self, path: String, link_text: &str, fragment: Option<String>) {
        if !self.fragments.contains_key(&path) {
            self.subpages.push(path.clone());
            self.fragments.insert(path.clone(), Vec::new());
            self.primary_text
                .insert(path.clone(), link_text.trim().to_string());
        }
        if let Some(fragment) = fragment
            && let Some(handles) = self.fragments.get_mut(&path)
        {
            handles.push(fragment);
        }
    }

    /// Record the namespaced heading id assigned to a visited page
    pub fn record_id(&mut self, path: &str, namespaced_id: String) {
        self.ids.insert(path.to_string(), namespaced_id);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subpages.is_empty()
    }
}

/// A book without any TOC block is single-page
#[must_use]
pub fn is_single_page(doc: &NodeRef) -> bool {
    dom::select_first(doc, TOC_SELECTOR).is_none()
}

/// Give the first TOC block its stable anchor id, the jump target for
/// "back to contents" links.
pub fn mark_toc_anchor(doc: &NodeRef) {
    if let Some(first_toc) = dom::select_first(doc, TOC_SELECTOR) {
        dom::set_attr(&first_toc, "id", TOC_ANCHOR_ID);
    }
}

/// Synthesize an Introduction entry at the top of the first TOC block when
/// the book links an introduction page. The entry is picked up by the
/// regular link walk afterwards, so it needs no special sequencing.
///
/// Returns whether an entry was injected.
pub fn inject_introduction(doc: &NodeRef, base_url: &str) -> bool {
    let Some(link) = dom::select_first(doc, INTRODUCTION_LINK_SELECTOR) else {
        return false;
    };
    let Some(href) = dom::attr(&link, "href") else {
        return false;
    };
    let href = match resolve_url(base_url, &href) {
        Ok(href) => href,
        Err(e) => {
            log::warn!("Skipping introduction link: {e}");
            return false;
        }
    };
    let Some(toc) = dom::select_first(doc, TOC_SELECTOR) else {
        return false;
    };
    log::debug!("Injecting introduction entry for {href}");
    dom::prepend_snippet(
        toc.as_node(),
        &format!("<h3><a href=\"{href}\" title=\"Introduction\">Introduction</a></h3>"),
    );
    true
}

/// Walk every link of every TOC block in DOM order and build the registry.
///
/// Hrefs are resolved absolute against the index page before the
/// `(path, fragment)` split, so relative and absolute mentions of the same
/// page dedup to one traversal entry.
#[must_use]
pub fn extract_site_links(doc: &NodeRef, base_url: &str) -> AnchorRegistry {
    let mut registry = AnchorRegistry::new();
    for toc in dom::select_all(doc, TOC_SELECTOR) {
        for anchor in dom::select_all(toc.as_node(), "a") {
            let Some(href) = dom::attr(&anchor, "href") else {
                continue;
            };
            let absolute = match resolve_url(base_url, &href) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("Skipping TOC link: {e}");
                    continue;
                }
            };
            let (path, fragment) = split_fragment(&absolute);
            registry.register(path, &anchor.as_node().text_contents(), fragment);
        }
    }
    log::debug!("TOC crawl found {} sub-pages", registry.subpages.len());
    registry
}

/// Rewrite TOC links to their in-document anchors.
///
/// Runs after all pages have been visited, on an owned re-parse of the base
/// document: an id must be assigned before any link targeting it can be
/// rewritten. For each reference with a known namespaced id, the primary
/// occurrence points at `#{id}` and every fragment-bearing occurrence at
/// `#{id}-{fragment}`. Links to pages without an id keep their href.
pub fn rewrite_toc_links(doc: &NodeRef, base_url: &str, ids: &HashMap<String, String>) {
    let mut seen: HashSet<String> = HashSet::new();
    for toc in dom::select_all(doc, TOC_SELECTOR) {
        for anchor in dom::select_all(toc.as_node(), "a") {
            let Some(href) = dom::attr(&anchor, "href") else {
                continue;
            };
            let Ok(absolute) = resolve_url(base_url, &href) else {
                continue;
            };
            let (path, fragment) = split_fragment(&absolute);
            let primary = seen.insert(path.clone());
            if let Some(id) = ids.get(&path) {
                if let Some(fragment) = fragment {
                    dom::set_attr(&anchor, "href", &format!("#{id}-{fragment}"));
                } else if primary {
                    dom::set_attr(&anchor, "href", &format!("#{id}"));
                }
            }
        }
    }
}

/// Serialize every TOC block for the rendered contents copy
#[must_use]
pub fn toc_blocks_html(doc: &NodeRef) -> Vec<String> {
    dom::select_all(doc, TOC_SELECTOR)
        .iter()
        .map(|toc| dom::outer_html(toc.as_node()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/book";

    fn index_doc(toc_body: &str) -> NodeRef {
        dom::parse_document(&format!(
            "<html><body><div class=\"compendium-toc-full-text\">{toc_body}</div></body></html>"
        ))
    }

    #[test]
    fn traversal_list_dedups_in_dom_order() {
        let doc = index_doc(
            "<a href=\"/book/ch1\">One</a>\
             <a href=\"/book/ch2\">Two</a>\
             <a href=\"/book/ch1#traps\">Traps</a>\
             <a href=\"/book/ch1\">One again</a>",
        );
        let registry = extract_site_links(&doc, BASE);

        assert_eq!(
            registry.subpages,
            vec![
                "https://example.com/book/ch1".to_string(),
                "https://example.com/book/ch2".to_string(),
            ]
        );
        assert_eq!(
            registry.fragments["https://example.com/book/ch1"],
            vec!["traps".to_string()]
        );
        assert_eq!(
            registry.primary_text["https://example.com/book/ch1"],
            "One"
        );
    }

    #[test]
    fn fragment_on_first_occurrence_is_recorded() {
        let doc = index_doc("<a href=\"/book/ch1#start\">One</a>");
        let registry = extract_site_links(&doc, BASE);
        assert_eq!(registry.subpages.len(), 1);
        assert_eq!(
            registry.fragments["https://example.com/book/ch1"],
            vec!["start".to_string()]
        );
    }

    #[test]
    fn single_page_detection() {
        let doc = dom::parse_document("<html><body><h1>Lone page</h1></body></html>");
        assert!(is_single_page(&doc));
        assert!(!is_single_page(&index_doc("<a href=\"/book/ch1\">One</a>")));
    }

    #[test]
    fn first_toc_gets_stable_anchor() {
        let doc = index_doc("<a href=\"/book/ch1\">One</a>");
        mark_toc_anchor(&doc);
        let toc = dom::select_first(&doc, TOC_SELECTOR).unwrap();
        assert_eq!(dom::attr(&toc, "id").as_deref(), Some(TOC_ANCHOR_ID));
    }

    #[test]
    fn introduction_is_injected_before_existing_entries() {
        let doc = dom::parse_document(
            "<html><body>\
             <a href=\"/book/introduction\">Intro teaser</a>\
             <div class=\"compendium-toc-full-text\"><a href=\"/book/ch1\">One</a></div>\
             </body></html>",
        );
        assert!(inject_introduction(&doc, BASE));

        let registry = extract_site_links(&doc, BASE);
        assert_eq!(
            registry.subpages,
            vec![
                "https://example.com/book/introduction".to_string(),
                "https://example.com/book/ch1".to_string(),
            ]
        );
    }

    #[test]
    fn rewrite_targets_primary_and_fragment_links() {
        let doc = index_doc(
            "<a href=\"/book/ch1\">One</a>\
             <a href=\"/book/ch1#traps\">Traps</a>\
             <a href=\"/book/ch2\">Two</a>",
        );
        let mut ids = HashMap::new();
        ids.insert(
            "https://example.com/book/ch1".to_string(),
            "bookbinder-chapter-one".to_string(),
        );
        rewrite_toc_links(&doc, BASE, &ids);

        let anchors = dom::select_all(&doc, "a");
        assert_eq!(
            dom::attr(&anchors[0], "href").as_deref(),
            Some("#bookbinder-chapter-one")
        );
        assert_eq!(
            dom::attr(&anchors[1], "href").as_deref(),
            Some("#bookbinder-chapter-one-traps")
        );
        // No id recorded for ch2: href untouched
        assert_eq!(dom::attr(&anchors[2], "href").as_deref(), Some("/book/ch2"));
    }

    #[test]
    fn fragment_bearing_primary_link_gets_fragment_target() {
        let doc = index_doc("<a href=\"/book/ch1#start\">One</a>");
        let mut ids = HashMap::new();
        ids.insert(
            "https://example.com/book/ch1".to_string(),
            "bookbinder-one".to_string(),
        );
        rewrite_toc_links(&doc, BASE, &ids);
        let anchor = dom::select_first(&doc, "a").unwrap();
        assert_eq!(
            dom::attr(&anchor, "href").as_deref(),
            Some("#bookbinder-one-start")
        );
    }
}
