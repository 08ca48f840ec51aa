//! Parse-time DOM.
//!
//! html5ever builds into a [`ParseTree`] through [`TreeCollector`]; the
//! compiler then freezes it into [`crate::compiler::RichTextNode`]s.

mod arena;
mod tree_sink;

pub use arena::{NodeId, NodeKind, ParseNode, ParseTree};
pub use tree_sink::TreeCollector;
