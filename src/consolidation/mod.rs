//! Reconciliation of several tools' results for one file.
//!
//! A pass runs in fixed steps:
//!
//! 1. [`filter`]: drop absent results and identifying tools with unusable
//!    identities.
//! 2. [`identity`]: merge format claims, consulting the format hierarchy so
//!    specific formats win over generic ones. Falls back to a partial or
//!    unknown identification when nothing is known.
//! 3. [`status`]: classify the identification section.
//! 4. [`fragment`]: merge fileinfo, filestatus and metadata elements,
//!    flagging single results and conflicts.
//! 5. [`engine`]: assemble the document, optionally appending raw tool output.

pub mod engine;
pub mod filter;
pub mod fragment;
pub mod identity;
pub mod status;

pub use engine::{ConsolidationConfig, Consolidator};
pub use fragment::{FragmentMerger, Section};
pub use identity::{IdentityConsolidator, IdentityOutcome};
