//! Small shared helpers: constants, DOM utilities, URL handling

pub mod constants;
pub mod dom;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{is_image_target, last_path_segment, resolve_url, split_fragment};
