//! DOM helpers on top of kuchiki
//!
//! All DOM work in this crate happens in synchronous phases: parse a
//! `String`, select and mutate, serialize back to a `String`. Parse trees are
//! `Rc`-based and never cross an `.await` point.

use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};

/// Parse a full HTML document
pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

/// Select all matches for a constant selector.
///
/// Matches are collected before returning so callers can detach or move
/// nodes without invalidating iteration. Selectors in this crate are
/// compile-time constants, so a parse failure is a programmer error and
/// yields an empty result.
pub fn select_all(node: &NodeRef, selector: &str) -> Vec<NodeDataRef<ElementData>> {
    match node.select(selector) {
        Ok(matches) => matches.collect(),
        Err(()) => {
            log::error!("Invalid selector: {selector}");
            Vec::new()
        }
    }
}

/// Select the first match for a constant selector
pub fn select_first(node: &NodeRef, selector: &str) -> Option<NodeDataRef<ElementData>> {
    node.select_first(selector).ok()
}

/// Serialize a node including its own tag
pub fn outer_html(node: &NodeRef) -> String {
    let mut buf = Vec::new();
    if let Err(e) = node.serialize(&mut buf) {
        log::error!("Failed to serialize node: {e}");
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serialize only the children of a node
pub fn inner_html(node: &NodeRef) -> String {
    let mut buf = Vec::new();
    for child in node.children() {
        if let Err(e) = child.serialize(&mut buf) {
            log::error!("Failed to serialize child node: {e}");
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Parse an HTML snippet and return its top-level nodes.
///
/// The snippet is parsed as a full document; the parser places element
/// content under `<body>`, whose children are detached and returned.
pub fn parse_snippet(html: &str) -> Vec<NodeRef> {
    let doc = kuchiki::parse_html().one(html);
    let Some(body) = select_first(&doc, "body") else {
        return Vec::new();
    };
    let nodes: Vec<NodeRef> = body.as_node().children().collect();
    for node in &nodes {
        node.detach();
    }
    nodes
}

/// Append a parsed HTML snippet as the last children of `target`
pub fn append_snippet(target: &NodeRef, html: &str) {
    for node in parse_snippet(html) {
        target.append(node);
    }
}

/// Prepend a parsed HTML snippet as the first children of `target`
pub fn prepend_snippet(target: &NodeRef, html: &str) {
    for node in parse_snippet(html).into_iter().rev() {
        target.prepend(node);
    }
}

/// Get an attribute value as an owned string
pub fn attr(el: &NodeDataRef<ElementData>, name: &str) -> Option<String> {
    let attrs = el.attributes.borrow();
    attrs.get(name).map(ToOwned::to_owned)
}

/// Set an attribute value
pub fn set_attr(el: &NodeDataRef<ElementData>, name: &str, value: &str) {
    el.attributes.borrow_mut().insert(name, value.to_string());
}

/// Replace one class name with another, preserving the rest
pub fn swap_class(el: &NodeDataRef<ElementData>, remove: &str, add: &str) {
    let current = attr(el, "class").unwrap_or_default();
    let mut classes: Vec<&str> = current
        .split_whitespace()
        .filter(|c| *c != remove && *c != add)
        .collect();
    classes.push(add);
    set_attr(el, "class", &classes.join(" "));
}

/// Nearest preceding sibling that is an element
pub fn previous_element_sibling(node: &NodeRef) -> Option<NodeRef> {
    node.preceding_siblings().find(|n| n.as_element().is_some())
}

/// Append text to a text node, if the node is one
pub fn append_to_text_node(node: &NodeRef, suffix: &str) -> bool {
    match node.as_text() {
        Some(text) => {
            text.borrow_mut().push_str(suffix);
            true
        }
        None => false,
    }
}

/// Detach all children of a node
pub fn clear_children(node: &NodeRef) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
}
