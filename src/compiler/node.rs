//! Owned, immutable markup tree.

use crate::dom::{NodeId, NodeKind, ParseTree};

/// One node of parsed rich-text markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichTextNode {
    Text(String),
    Element {
        /// Lowercase local name.
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<RichTextNode>,
    },
}

/// Subtrees that never carry visible content.
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

impl RichTextNode {
    pub fn element(tag: &str, children: Vec<RichTextNode>) -> Self {
        RichTextNode::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children,
        }
    }

    pub fn text(text: &str) -> Self {
        RichTextNode::Text(text.to_string())
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            RichTextNode::Element { tag, .. } => Some(tag),
            RichTextNode::Text(_) => None,
        }
    }

    pub fn is_tag(&self, name: &str) -> bool {
        self.tag() == Some(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            RichTextNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            RichTextNode::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[RichTextNode] {
        match self {
            RichTextNode::Element { children, .. } => children,
            RichTextNode::Text(_) => &[],
        }
    }

    /// All descendant text, concatenated without separators.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RichTextNode::Text(t) => out.push_str(t),
            RichTextNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Freeze a parse subtree. Returns `None` for nodes that carry nothing.
    pub(crate) fn freeze(tree: &ParseTree, id: NodeId) -> Option<Self> {
        match &tree.node(id)?.kind {
            NodeKind::Text(text) => Some(RichTextNode::Text(text.clone())),
            NodeKind::Element { name, attrs } => {
                let tag = (*name.local).to_ascii_lowercase();
                if SKIPPED_TAGS.contains(&tag.as_str()) {
                    return None;
                }
                let attrs = attrs
                    .iter()
                    .map(|(n, v)| ((*n.local).to_ascii_lowercase(), v.clone()))
                    .collect();
                let children = tree
                    .children(id)
                    .iter()
                    .filter_map(|&child| RichTextNode::freeze(tree, child))
                    .collect();
                Some(RichTextNode::Element {
                    tag,
                    attrs,
                    children,
                })
            }
            NodeKind::Document | NodeKind::Ignored => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_concatenates() {
        let node = RichTextNode::element(
            "p",
            vec![
                RichTextNode::text("Hi "),
                RichTextNode::element("b", vec![RichTextNode::text("there")]),
            ],
        );
        assert_eq!(node.text_content(), "Hi there");
    }

    #[test]
    fn test_attr_lookup_is_case_insensitive() {
        let node = RichTextNode::Element {
            tag: "img".into(),
            attrs: vec![("src".into(), "a.png".into())],
            children: vec![],
        };
        assert_eq!(node.attr("SRC"), Some("a.png"));
        assert_eq!(node.attr("alt"), None);
        assert_eq!(RichTextNode::text("x").attr("src"), None);
    }
}
