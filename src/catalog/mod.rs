//! Format specificity hierarchy.
//!
//! The hierarchy declares which format names are more specific forms of
//! others (e.g. `TIFF/EP` under `TIFF`). It is consulted when two tools
//! disagree on a file's identity, so the more precise identification wins.
//! A default hierarchy is compiled into the binary; custom ones can be loaded
//! from XML files of the same shape.
//!
//! ## Example
//!
//! ```rust
//! use fileid_reconcile::catalog::FormatTree;
//! use fileid_reconcile::core::types::Specificity;
//!
//! let tree = FormatTree::load_embedded().unwrap();
//! assert_eq!(tree.specificity("TIFF/EP", "TIFF"), Specificity::AMoreSpecific);
//! ```
//!
//! ## File format
//!
//! ```xml
//! <formatTree>
//!   <format format="TIFF">
//!     <format format="TIFF/EP"/>
//!   </format>
//! </formatTree>
//! ```

pub mod format_tree;

pub use format_tree::{FormatTree, FormatTreeError};
