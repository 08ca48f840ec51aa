//! Markup to document-element compiler.
//!
//! Parsing goes through html5ever into the parse tree, which is then frozen
//! into an owned [`RichTextNode`] tree. [`convert`] walks that tree and emits
//! [`DocumentElement`](crate::ir::DocumentElement)s.
//!
//! ```
//! use folio::compiler::{convert, parse_markup};
//! use folio::ir::DocumentElement;
//!
//! let tree = parse_markup("<h2>Scope</h2><p>In scope: <b>everything</b>.</p>");
//! let elements = convert(&tree, Some("1F3864"));
//! assert_eq!(elements.len(), 2);
//! assert!(matches!(elements[0], DocumentElement::Heading { level: 2, .. }));
//! ```

mod image;
mod node;
mod visitor;

pub use image::{CONTENT_WIDTH_PX, ImageSource, decode_data_uri, resolve_image};
pub use node::RichTextNode;
pub use visitor::{LINK_COLOR, convert};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use crate::dom::TreeCollector;
use crate::ir::DocumentElement;

/// Parse markup into an owned tree rooted at `<body>`.
///
/// Fragments are fine: html5ever supplies the implied `html`/`body`. Parse
/// errors are ignored the way a browser ignores them.
pub fn parse_markup(markup: &str) -> RichTextNode {
    let tree = parse_document(TreeCollector::new(), ParseOpts::default())
        .from_utf8()
        .one(markup.as_bytes())
        .into_tree();

    tree.find("body")
        .and_then(|body| RichTextNode::freeze(&tree, body))
        .unwrap_or_else(|| RichTextNode::element("body", Vec::new()))
}

/// Parse markup bytes, detecting the encoding first.
pub fn parse_markup_bytes(bytes: &[u8]) -> RichTextNode {
    let text = crate::util::decode_text(bytes, None);
    parse_markup(&text)
}

/// Parse and convert in one step.
pub fn convert_markup(markup: &str, default_color: Option<&str>) -> Vec<DocumentElement> {
    convert(&parse_markup(markup), default_color)
}
