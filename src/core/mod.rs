//! Data model shared by every consolidation step.
//!
//! - [`ToolInfo`](tool::ToolInfo), [`ToolResult`](tool::ToolResult): what one
//!   tool produced for a file
//! - [`ToolIdentity`](identity::ToolIdentity): one format claim
//! - [`ConsolidatedIdentity`](identity::ConsolidatedIdentity): claims merged
//!   across tools
//! - [`Status`](types::Status), [`Agreement`](types::Agreement),
//!   [`Specificity`](types::Specificity): classification enums
//! - [`ConsolidatedOutput`](output::ConsolidatedOutput): the finished document
//!
//! Formats and MIME types are compared ignoring case everywhere.

pub mod identity;
pub mod output;
pub mod tool;
pub mod types;
