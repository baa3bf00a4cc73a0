//! Parse MAME's XML output into an immutable document arena with typed,
//! read-only element views.
//!
//! The arena owns every node; [`Element`] views carry only an index into it,
//! so walking a listing never copies the tree. Two parser backends produce
//! structurally identical documents: the built-in event parser (quick-xml)
//! and an optional DOM fast path (roxmltree, behind the `roxmltree` feature).
//! [`FragmentReader`] streams record subtrees out of arbitrarily large input
//! without holding the whole document in memory.

mod arena;
mod backend;
mod stream;

pub use arena::{Children, ChildrenNamed, DescendantsNamed, Document, Element, NodeId};
pub use backend::{parse, parse_with, XmlBackend};
pub use stream::FragmentReader;

use thiserror::Error;

/// Error type produced by document parsing and attribute coercion.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The input is not structurally valid XML.
    #[error("xml: {0}")]
    Syntax(String),
    /// An attribute is present but its value has the wrong shape.
    #[error("attribute '{name}' has value '{value}', expected {expected}")]
    Coercion {
        name: String,
        value: String,
        expected: &'static str,
    },
    /// Reading the underlying input failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl XmlError {
    pub(crate) fn coercion(name: &str, value: &str, expected: &'static str) -> Self {
        XmlError::Coercion {
            name: name.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}
