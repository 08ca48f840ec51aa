//! Index-addressed parse tree that html5ever builds into.
//!
//! Every node lives in one vector and refers to its parent and children by
//! [`NodeId`]. The tree only exists for the duration of a parse:
//! [`crate::compiler::parse_markup`] freezes the `<body>` subtree into an
//! owned [`crate::compiler::RichTextNode`] and drops the rest.

use html5ever::{LocalName, QualName};

/// Position of a node in the [`ParseTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node holds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    /// The name is boxed so its address is stable while the tree grows.
    Element {
        name: Box<QualName>,
        attrs: Vec<(QualName, String)>,
    },
    Text(String),
    /// Comment, doctype or processing instruction: a placeholder the tree
    /// builder can point at, never frozen.
    Ignored,
}

#[derive(Debug)]
pub struct ParseNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// The parse tree, rooted at a document node.
#[derive(Debug)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
}

impl Default for ParseTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseTree {
    pub fn new() -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push(NodeKind::Document);
        tree
    }

    /// The document node is always the first one.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(ParseNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Option<&ParseNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ParseNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.unlink(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Move `child` into `sibling`'s parent, just before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        self.unlink(child);
        if let Some(node) = self.node_mut(parent) {
            let at = node
                .children
                .iter()
                .position(|&c| c == sibling)
                .unwrap_or(node.children.len());
            node.children.insert(at, child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Add text at the end of `parent`, extending a trailing text node
    /// rather than starting a new one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.children(parent).last()
            && let Some(ParseNode {
                kind: NodeKind::Text(existing),
                ..
            }) = self.node_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let node = self.push(NodeKind::Text(text.to_string()));
        self.append(parent, node);
    }

    /// Insert text before `sibling`, extending the text node just before it
    /// when there is one.
    pub fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        let siblings = self.children(parent);
        let previous = siblings
            .iter()
            .position(|&c| c == sibling)
            .and_then(|i| i.checked_sub(1))
            .map(|i| siblings[i]);
        if let Some(prev) = previous
            && let Some(ParseNode {
                kind: NodeKind::Text(existing),
                ..
            }) = self.node_mut(prev)
        {
            existing.push_str(text);
            return;
        }
        let node = self.push(NodeKind::Text(text.to_string()));
        self.insert_before(sibling, node);
    }

    /// Take a node out of its parent. The node itself stays in the arena.
    pub fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.node_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != id);
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&LocalName> {
        match &self.node(id)?.kind {
            NodeKind::Element { name, .. } => Some(&name.local),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n.local.as_ref() == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text(s) => Some(s),
            _ => None,
        }
    }

    /// First element named `tag`, in document order.
    pub fn find(&self, tag: &str) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if self.tag(id).is_some_and(|t| t.as_ref() == tag) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        None
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the document node exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use super::*;

    fn element(tree: &mut ParseTree, local: &str) -> NodeId {
        tree.push(NodeKind::Element {
            name: Box::new(QualName::new(None, ns!(html), LocalName::from(local))),
            attrs: Vec::new(),
        })
    }

    #[test]
    fn test_append_and_find() {
        let mut tree = ParseTree::new();
        let ul = element(&mut tree, "ul");
        let a = element(&mut tree, "li");
        let b = element(&mut tree, "li");
        let root = tree.root();
        tree.append(root, ul);
        tree.append(ul, a);
        tree.append(ul, b);

        assert_eq!(tree.children(ul), [a, b]);
        assert_eq!(tree.find("li"), Some(a));
        assert_eq!(tree.parent(b), Some(ul));
    }

    #[test]
    fn test_adjacent_text_merges() {
        let mut tree = ParseTree::new();
        let p = element(&mut tree, "p");
        let root = tree.root();
        tree.append(root, p);
        tree.append_text(p, "Risk ");
        tree.append_text(p, "register");

        assert_eq!(tree.children(p).len(), 1);
        assert_eq!(tree.text(tree.children(p)[0]), Some("Risk register"));
    }

    #[test]
    fn test_reattach_moves_node() {
        let mut tree = ParseTree::new();
        let table = element(&mut tree, "table");
        let row = element(&mut tree, "tr");
        let caption = element(&mut tree, "caption");
        let root = tree.root();
        tree.append(root, table);
        tree.append(table, row);
        tree.insert_before(row, caption);
        assert_eq!(tree.children(table), [caption, row]);

        tree.append(root, caption);
        assert_eq!(tree.children(table), [row]);
        assert_eq!(tree.parent(caption), Some(root));

        tree.unlink(caption);
        assert!(tree.parent(caption).is_none());
        assert_eq!(tree.children(root), [table]);
    }
}
