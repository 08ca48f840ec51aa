//! html5ever tree-builder callbacks writing into a [`ParseTree`].

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, QualName};

use super::arena::{NodeId, NodeKind, ParseTree};

/// Collects the tree builder's output.
///
/// `TreeSink` hands out `&self` only, hence the `RefCell`.
#[derive(Default)]
pub struct TreeCollector {
    tree: RefCell<ParseTree>,
}

impl TreeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_tree(self) -> ParseTree {
        self.tree.into_inner()
    }

    fn add(&self, kind: NodeKind) -> NodeId {
        self.tree.borrow_mut().push(kind)
    }
}

fn owned_attrs(attrs: Vec<Attribute>) -> Vec<(QualName, String)> {
    attrs
        .into_iter()
        .map(|a| (a.name, a.value.to_string()))
        .collect()
}

impl TreeSink for TreeCollector {
    type Handle = NodeId;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    // Report bodies come from rich-text editors; lenient like a browser.
    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> NodeId {
        self.tree.borrow().root()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> Self::ElemName<'a> {
        static NO_NAME: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let tree = self.tree.borrow();
        match tree.node(*target).map(|n| &n.kind) {
            Some(NodeKind::Element { name, .. }) => {
                let name: &QualName = name;
                // SAFETY: element names are boxed, never replaced, and nodes
                // are never removed from the arena, so the pointee lives as
                // long as `self` even after this borrow ends.
                unsafe { &*(name as *const QualName) }
            }
            _ => &NO_NAME,
        }
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, _: ElementFlags) -> NodeId {
        self.add(NodeKind::Element {
            name: Box::new(name),
            attrs: owned_attrs(attrs),
        })
    }

    fn create_comment(&self, _text: StrTendril) -> NodeId {
        self.add(NodeKind::Ignored)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> NodeId {
        self.add(NodeKind::Ignored)
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        let mut tree = self.tree.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => tree.append(*parent, node),
            NodeOrText::AppendText(text) => tree.append_text(*parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        let parent = self.tree.borrow().parent(*element);
        match parent {
            Some(_) => self.append_before_sibling(element, child),
            None => self.append(prev_element, child),
        }
    }

    fn append_doctype_to_document(&self, _: StrTendril, _: StrTendril, _: StrTendril) {}

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        let mut tree = self.tree.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => tree.insert_before(*sibling, node),
            NodeOrText::AppendText(text) => tree.insert_text_before(*sibling, &text),
        }
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<Attribute>) {
        let mut tree = self.tree.borrow_mut();
        let Some(NodeKind::Element {
            attrs: existing, ..
        }) = tree.node_mut(*target).map(|n| &mut n.kind)
        else {
            return;
        };
        for (name, value) in owned_attrs(attrs) {
            if !existing.iter().any(|(n, _)| *n == name) {
                existing.push((name, value));
            }
        }
    }

    fn remove_from_parent(&self, target: &NodeId) {
        self.tree.borrow_mut().unlink(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        let mut tree = self.tree.borrow_mut();
        let moved = tree.children(*node).to_vec();
        for child in moved {
            tree.append(*new_parent, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use html5ever::driver::ParseOpts;
    use html5ever::parse_document;
    use html5ever::tendril::TendrilSink;

    use super::*;

    fn parse(html: &str) -> ParseTree {
        parse_document(TreeCollector::new(), ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
            .into_tree()
    }

    #[test]
    fn test_fragment_gets_body() {
        let tree = parse("<p>Scope</p>");
        let body = tree.find("body").expect("body is implied");
        let p = tree.children(body)[0];
        assert!(tree.tag(p).is_some_and(|t| t.as_ref() == "p"));
    }

    #[test]
    fn test_attributes_survive() {
        let tree = parse(r#"<p style="color:red" class="lead">x</p>"#);
        let p = tree.find("p").unwrap();
        assert_eq!(tree.attr(p, "style"), Some("color:red"));
        assert_eq!(tree.attr(p, "class"), Some("lead"));
    }

    #[test]
    fn test_stray_table_text_is_foster_parented() {
        let tree = parse("<table>stray<tr><td>cell</td></tr></table>");
        let body = tree.find("body").unwrap();
        let first = tree.children(body)[0];
        assert_eq!(tree.text(first), Some("stray"));
        assert!(tree.find("td").is_some());
    }

    #[test]
    fn test_comments_do_not_reach_the_body() {
        let tree = parse("<!DOCTYPE html><p>a<!-- note -->b</p>");
        let p = tree.find("p").unwrap();
        let texts: Vec<_> = tree
            .children(p)
            .iter()
            .filter_map(|&c| tree.text(c))
            .collect();
        assert_eq!(texts, ["a", "b"]);
    }
}
