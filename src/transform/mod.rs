//! Per-page transformation
//!
//! Rewrites one fetched sub-page so it can live inside the merged document:
//! heading ids are namespaced with the brand token, "back to contents"
//! anchors are appended, dual game-master/player map embeds are normalized,
//! and the page's styles and primary content are emitted as one fragment.
//!
//! Everything here is synchronous; the async crawl loop in `compose` feeds
//! it serialized HTML and applies the error policy.

use kuchiki::NodeRef;

use crate::config::PrintConfig;
use crate::error::{PrintError, PrintResult};
use crate::utils::constants::{
    BRAND, CONTENT_MARKER_SELECTOR, DUAL_MAP_CAPTION, FIGURE_PLAYER_MAP_SELECTOR,
    PLAYER_MAP_CONTAINER_SELECTOR, PRIMARY_CONTENT_SELECTOR, SUBHEADING_SELECTOR, TOC_ANCHOR_ID,
};
use crate::utils::dom;
use crate::utils::url_utils::last_path_segment;

/// Read-only inputs for one page transformation
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub config: &'a PrintConfig,
    /// Backlinks are pointless in a single-page book; there is no contents
    /// block to jump back to.
    pub single_page: bool,
}

/// One transformed sub-page
#[derive(Debug, Clone)]
pub struct TransformedPage {
    /// Stylesheet links and style blocks found in the page's primary
    /// content region. Repeats across pages are tolerated; CSS is
    /// idempotent.
    pub header: String,
    /// The page's primary content wrapped in a page-section container
    pub body: String,
    /// Namespaced id of the page's top-level heading, when it had one.
    /// Consumed later to rewrite TOC links pointing at this page.
    pub namespaced_id: Option<String>,
}

/// Transform one fetched sub-page into a content fragment.
///
/// Fails with [`PrintError::AccessOrNotFound`] when the page is missing the
/// article content marker; the caller decides between aborting and skipping
/// based on `fail_on_error`.
pub fn transform_page(
    html: &str,
    page_url: &str,
    ctx: &TransformContext<'_>,
) -> PrintResult<TransformedPage> {
    let doc = dom::parse_document(html);

    let Some(content) = dom::select_first(&doc, CONTENT_MARKER_SELECTOR) else {
        return Err(PrintError::AccessOrNotFound {
            page: last_path_segment(page_url).unwrap_or_else(|| page_url.to_string()),
        });
    };

    let header = collect_header_fragment(&doc);
    let namespaced_id = namespace_heading_ids(&doc, ctx);
    normalize_map_images(&doc, ctx.config);

    let body = format!(
        "<div class=\"print-section\">{}</div>",
        dom::inner_html(content.as_node())
    );

    Ok(TransformedPage {
        header,
        body,
        namespaced_id,
    })
}

/// Minimal fragment for an image target listed directly in the TOC.
/// The caption is the target's primary-link text, when there was one.
#[must_use]
pub fn image_fragment(url: &str, caption: Option<&str>) -> String {
    let caption = caption.filter(|c| !c.is_empty());
    let heading = caption
        .map(|c| format!("<h1>{c}</h1>\n"))
        .unwrap_or_default();
    format!(
        "<div class=\"print-section\">\n{heading}<img src=\"{url}\" alt=\"{}\" class=\"ddb-lightbox-inner\" />\n</div>",
        caption.unwrap_or_default()
    )
}

/// Collect stylesheet links and style blocks from the primary content
/// region. No deduplication: repeated CSS is harmless and order is kept.
fn collect_header_fragment(doc: &NodeRef) -> String {
    let mut parts: Vec<String> = Vec::new();
    for link in dom::select_all(doc, &format!("{PRIMARY_CONTENT_SELECTOR} link")) {
        if dom::attr(&link, "rel").as_deref() == Some("stylesheet") {
            parts.push(dom::outer_html(link.as_node()));
        }
    }
    for style in dom::select_all(doc, &format!("{PRIMARY_CONTENT_SELECTOR} style")) {
        parts.push(dom::outer_html(style.as_node()));
    }
    parts.join("\n")
}

fn backlink_html() -> String {
    format!("<a class=\"backlink\" href=\"#{TOC_ANCHOR_ID}\">↑</a>")
}

/// Namespace the page's heading ids with the brand token and append
/// backlinks where configured.
///
/// The top-level heading id becomes `{brand}-{id}`; each sub-heading id
/// becomes `{brand}-{id}-{subid}`, so fragment links from the TOC resolve
/// to `#{namespaced}-{fragment}`.
fn namespace_heading_ids(doc: &NodeRef, ctx: &TransformContext<'_>) -> Option<String> {
    let heading = dom::select_first(doc, &format!("{CONTENT_MARKER_SELECTOR} h1"))?;
    let id = dom::attr(&heading, "id").filter(|id| !id.is_empty())?;

    let namespaced = format!("{BRAND}-{id}");
    dom::set_attr(&heading, "id", &namespaced);

    let backlinks = ctx.config.include_backlinks && !ctx.single_page;
    if backlinks {
        dom::append_snippet(heading.as_node(), &backlink_html());
    }

    for subheading in dom::select_all(doc, SUBHEADING_SELECTOR) {
        if let Some(sub_id) = dom::attr(&subheading, "id").filter(|id| !id.is_empty()) {
            dom::set_attr(&subheading, "id", &format!("{namespaced}-{sub_id}"));
            if backlinks {
                dom::append_snippet(subheading.as_node(), &backlink_html());
            }
        }
    }

    Some(namespaced)
}

/// Normalize the two known dual-map embed patterns.
///
/// Both patterns pair a game-master image with a link to a player-facing
/// version and are detected by structural position, not class names alone.
/// `use_big_map_images` upscales the GM image to the linked full-resolution
/// asset; `include_player_version_maps` synthesizes an inline player image
/// with an explanatory caption. The flags are independent and mutate
/// disjoint parts of the fragment.
fn normalize_map_images(doc: &NodeRef, config: &PrintConfig) {
    if !config.use_big_map_images && !config.include_player_version_maps {
        return;
    }

    // Pattern one: player-version link inside the figure's caption
    for link in dom::select_all(doc, FIGURE_PLAYER_MAP_SELECTOR) {
        let figcaption = link.as_node().parent();
        let figure = figcaption.as_ref().and_then(|n| n.parent());

        if config.use_big_map_images
            && let Some(figure) = &figure
        {
            upscale_gm_image(figure);
        }

        if config.include_player_version_maps {
            inline_player_image(&link);
            if let Some(text_node) = figcaption.as_ref().and_then(|n| n.first_child()) {
                dom::append_to_text_node(&text_node, DUAL_MAP_CAPTION);
            }
        }
    }

    // Pattern two: dedicated player-version container; the GM figure is the
    // container's preceding element sibling.
    for link in dom::select_all(doc, PLAYER_MAP_CONTAINER_SELECTOR) {
        let gm_figure = link
            .as_node()
            .parent()
            .as_ref()
            .and_then(dom::previous_element_sibling);

        if config.use_big_map_images
            && let Some(gm_figure) = &gm_figure
        {
            upscale_gm_image(gm_figure);
        }

        if config.include_player_version_maps {
            inline_player_image(&link);
            let caption_target = gm_figure
                .as_ref()
                .and_then(|figure| dom::select_first(figure, "h4"))
                .and_then(|h4| h4.as_node().last_child());
            if let Some(text_node) = caption_target {
                dom::append_to_text_node(&text_node, &format!(" {DUAL_MAP_CAPTION}"));
            }
        }
    }
}

/// Point the GM figure's image at its linked full-resolution asset
fn upscale_gm_image(figure: &NodeRef) {
    let Some(img) = dom::select_first(figure, "img") else {
        return;
    };
    let Some(href) = dom::select_first(figure, "a").and_then(|a| dom::attr(&a, "href")) else {
        return;
    };
    if href.is_empty() {
        return;
    }
    dom::set_attr(&img, "src", &href);
    let style = dom::attr(&img, "style").unwrap_or_default();
    let style = if style.is_empty() {
        "width: 100%".to_string()
    } else {
        format!("{style}; width: 100%")
    };
    dom::set_attr(&img, "style", &style);
}

/// Replace a player-version link's text with an inline image of its target
fn inline_player_image(link: &kuchiki::NodeDataRef<kuchiki::ElementData>) {
    let Some(href) = dom::attr(link, "href") else {
        return;
    };
    dom::swap_class(link, "ddb-lightbox-outer", "compendium-image-center");
    dom::clear_children(link.as_node());
    dom::append_snippet(link.as_node(), &format!("<img src=\"{href}\">"));
}
