//! Export inlining: stylesheets and images folded into one file
//!
//! The export path turns the composite markup into a self-contained HTML
//! file: the index page's head stylesheets are fetched into one `<style>`
//! block, then every `<img>` source is downloaded and replaced with a base64
//! data URI. Image failures are reported and skipped; they never abort the
//! export.
//!
//! Network fetches and pacing are async; every DOM pass is a synchronous
//! parse-mutate-serialize cycle over owned strings.

use base64::{Engine as _, engine::general_purpose};
use std::collections::HashMap;

use crate::compose::AssembledBook;
use crate::error::{PrintError, PrintResult};
use crate::fetcher::Fetcher;
use crate::pacing::PacingPolicy;
use crate::progress::{ProgressKind, ProgressReporter};
use crate::utils::constants::IMAGE_INLINE_TIMEOUT;
use crate::utils::dom;

/// A finished export: suggested filename plus the full document markup
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub html: String,
}

/// Build the self-contained export document for an assembled book.
pub async fn build_export(
    fetcher: &Fetcher,
    pacing: &PacingPolicy,
    progress: &dyn ProgressReporter,
    book: &AssembledBook,
) -> ExportFile {
    let css = inline_stylesheets(fetcher, pacing, &book.stylesheet_urls).await;
    let composite = format!("<span><style>{css}</style>{}</span>", book.html);
    let inlined = inline_images(fetcher, pacing, progress, &composite).await;

    progress.on_done("All images loaded! Starting download...");

    ExportFile {
        file_name: export_file_name(&book.file_title),
        html: full_document(&book.title, &inlined),
    }
}

/// Fetch every head stylesheet into one CSS blob, paced between fetches.
/// A stylesheet that fails to download is logged and skipped.
pub async fn inline_stylesheets(
    fetcher: &Fetcher,
    pacing: &PacingPolicy,
    urls: &[String],
) -> String {
    let mut parts = Vec::with_capacity(urls.len());
    for url in urls {
        match fetcher.fetch_text(url).await {
            Ok(css) => parts.push(css),
            Err(e) => log::warn!("Skipping stylesheet {url}: {e}"),
        }
        pacing.wait().await;
    }
    parts.join("")
}

/// Replace every `<img>` source in `html` with a base64 data URI.
///
/// One `Image` progress event is emitted per image element whether it
/// succeeds or not; failures (including the per-image timeout) become error
/// messages and the original source is kept. A repeated source is fetched
/// once when it succeeds; a failing source is retried per occurrence, so
/// every affected image reports its own error.
pub async fn inline_images(
    fetcher: &Fetcher,
    pacing: &PacingPolicy,
    progress: &dyn ProgressReporter,
    html: &str,
) -> String {
    let sources = collect_image_sources(html);
    let total = sources.len();
    if total == 0 {
        return html.to_string();
    }

    let mut replacements: HashMap<String, String> = HashMap::new();
    for (index, src) in sources.iter().enumerate() {
        progress.update_progress(ProgressKind::Image, index + 1, total);
        if !replacements.contains_key(src) {
            match fetch_data_uri(fetcher, src).await {
                Ok(data_uri) => {
                    replacements.insert(src.clone(), data_uri);
                }
                Err(e) => progress.add_error_message(&e.to_string()),
            }
        }
        pacing.wait().await;
    }

    replace_image_sources(html, &replacements)
}

async fn fetch_data_uri(fetcher: &Fetcher, url: &str) -> PrintResult<String> {
    let fetched = tokio::time::timeout(IMAGE_INLINE_TIMEOUT, fetcher.fetch_bytes(url))
        .await
        .map_err(|_| PrintError::Image {
            url: url.to_string(),
            reason: "timeout".to_string(),
        })?;
    let (content_type, bytes) = fetched.map_err(|e| PrintError::Image {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let encoded = general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{content_type};base64,{encoded}"))
}

/// Image sources in document order, duplicates kept for progress accounting
fn collect_image_sources(html: &str) -> Vec<String> {
    let doc = dom::parse_document(html);
    dom::select_all(&doc, "img")
        .iter()
        .filter_map(|img| dom::attr(img, "src"))
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .collect()
}

/// One parse/serialize cycle applying all collected replacements
fn replace_image_sources(html: &str, replacements: &HashMap<String, String>) -> String {
    if replacements.is_empty() {
        return html.to_string();
    }
    let doc = dom::parse_document(html);
    for img in dom::select_all(&doc, "img") {
        if let Some(src) = dom::attr(&img, "src")
            && let Some(data_uri) = replacements.get(&src)
        {
            dom::set_attr(&img, "src", data_uri);
        }
    }
    let Some(body) = dom::select_first(&doc, "body") else {
        return html.to_string();
    };
    dom::inner_html(body.as_node())
}

/// Sanitized export filename from the suffix-free title
#[must_use]
pub fn export_file_name(file_title: &str) -> String {
    let base = file_title.trim().replace(' ', "_");
    let base = sanitize_filename::sanitize(&base);
    if base.is_empty() {
        "book.html".to_string()
    } else {
        format!("{base}.html")
    }
}

fn full_document(title: &str, body: &str) -> String {
    format!(
        "<html lang=\"en\">\n<head>\n<title>{title}</title>\n<meta charset='UTF-8'/>\n</head>\n<body>{body}</body>\n</html>"
    )
}
