//! XML-shaped value trees.
//!
//! Two representations are used:
//!
//! - [`Element`]: an owned, recursive tree. Consolidated output is built from
//!   these and serialized with [`writer::to_xml_string`].
//! - [`Document`]: an arena holding one tool's normalized fragment tree.
//!   Subtrees leave the arena through [`Document::detach`], which moves them
//!   out as an [`Element`] and invalidates every [`NodeId`] inside them.
//!
//! Element and attribute names are local names: namespace prefixes are
//! stripped on read and the shared schema namespace is declared once on the
//! consolidated root when writing.

pub mod document;
pub mod element;
pub mod writer;

pub use document::{Document, NodeId};
pub use element::{Attribute, Element};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("Unclosed element <{0}> at end of document")]
    Unclosed(String),

    #[error("Document has more than one root element")]
    MultipleRoots,

    #[error("Document has no root element")]
    Empty,

    #[error("Elements nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("Failed to write XML: {0}")]
    Write(String),
}
