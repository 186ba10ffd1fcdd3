//! URL handling: resolution against a base page and target classification

use crate::error::{PrintError, PrintResult};
use url::Url;

/// Resolve a potentially relative href against the page it appeared on
pub fn resolve_url(base_url: &str, href: &str) -> PrintResult<String> {
    let base = Url::parse(base_url)
        .map_err(|e| PrintError::Invalid(format!("invalid base URL {base_url}: {e}")))?;
    let resolved = base
        .join(href)
        .map_err(|e| PrintError::Invalid(format!("cannot resolve {href} against {base_url}: {e}")))?;
    Ok(resolved.to_string())
}

/// Split a URL into its path part and optional fragment
pub fn split_fragment(url: &str) -> (String, Option<String>) {
    match url.split_once('#') {
        Some((path, fragment)) if !fragment.is_empty() => {
            (path.to_string(), Some(fragment.to_string()))
        }
        Some((path, _)) => (path.to_string(), None),
        None => (url.to_string(), None),
    }
}

/// Last segment of a URL's path, ignoring query and fragment.
/// A URL with an empty path (just scheme and host) has no segment; the host
/// never stands in for one.
pub fn last_path_segment(url: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let path = match without_query.find("://") {
        Some(at) => {
            let rest = &without_query[at + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "",
            }
        }
        None => without_query,
    };
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// A traversal target whose final path segment contains a `.` is treated as
/// an image rather than a sub-page.
pub fn is_image_target(url: &str) -> bool {
    last_path_segment(url).is_some_and(|segment| segment.contains('.'))
}
