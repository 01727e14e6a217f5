//! # fileid-reconcile
//!
//! A library for reconciling the output of several file identification and
//! metadata extraction tools run on the same file.
//!
//! Identification tools often disagree: one reports "TIFF", another
//! "TIFF/EP", a third gives up with "application/octet-stream". Metadata
//! extractors report the same property with different spellings or
//! precision. `fileid-reconcile` merges all of it into one document and marks
//! what the tools agreed on, what only one tool reported, and where they
//! conflict.
//!
//! ## Features
//!
//! - **Specificity resolution**: a format hierarchy lets "TIFF/EP" win over "TIFF"
//! - **Fallbacks**: partial or unknown identifications are surfaced with an
//!   explicit status when no tool is sure
//! - **Value merging**: case-insensitive and numeric-aware comparison of
//!   metadata values
//! - **Conflict reporting**: disagreements are either flagged or collapsed to
//!   the first value
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fileid_reconcile::{ConsolidationConfig, Consolidator, FormatTree, Status};
//! use fileid_reconcile::core::identity::ToolIdentity;
//! use fileid_reconcile::core::tool::{ToolInfo, ToolResult};
//!
//! let tree = FormatTree::load_embedded().unwrap();
//! let consolidator = Consolidator::new(Arc::new(tree), ConsolidationConfig::default());
//!
//! let jhove = ToolInfo::new("Jhove", "1.26");
//! let exif = ToolInfo::new("Exiftool", "12.40");
//! let results = vec![
//!     Some(ToolResult::new(jhove.clone())
//!         .with_identities(vec![ToolIdentity::new("TIFF", "image/tiff", jhove)])),
//!     Some(ToolResult::new(exif.clone())
//!         .with_identities(vec![ToolIdentity::new("TIFF/EP", "image/tiff", exif)])),
//!     None,
//! ];
//!
//! let output = consolidator.consolidate(results);
//! assert_eq!(output.identification.identities[0].format, "TIFF/EP");
//! assert_eq!(output.identification.status, Status::SingleResult);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Format specificity hierarchy
//! - [`config`]: TOML configuration
//! - [`consolidation`]: Filtering, identity merging, fragment merging, status
//! - [`core`]: Data model for tool results and consolidated output
//! - [`parsing`]: XML and manifest readers
//! - [`xml`]: Element trees, fragment arena and XML writer
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: HTTP consolidation service

pub mod catalog;
pub mod cli;
pub mod config;
pub mod consolidation;
pub mod core;
pub mod parsing;
pub mod utils;
pub mod web;
pub mod xml;

// Re-export commonly used types for convenience
pub use catalog::FormatTree;
pub use config::ConsolidatorConfig;
pub use consolidation::{ConsolidationConfig, Consolidator};
pub use crate::core::output::ConsolidatedOutput;
pub use crate::core::types::*;
