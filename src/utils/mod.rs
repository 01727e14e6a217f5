//! Centralized comparison and validation helpers.
//!
//! Every case-insensitive comparison of format names, MIME types and element
//! text goes through [`normalize::NormalizedKey`] so the merge logic never
//! hand-rolls its own lowercasing.

pub mod normalize;
pub mod validation;
