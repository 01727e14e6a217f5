//! Readers for tool output.
//!
//! - [`xml`]: XML text into an owned [`Element`](crate::xml::Element) tree,
//!   used for fragments, raw tool output and the format hierarchy
//! - [`manifest`]: JSON manifest listing every tool result for one file

pub mod manifest;
pub mod xml;
