//! HTTP service exposing consolidation.
//!
//! One [`Consolidator`](crate::consolidation::Consolidator) is built at start
//! and shared by every request; its format tree is read-only, so requests run
//! concurrently without locking.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! fileid-reconcile serve
//!
//! # Custom port and configuration
//! fileid-reconcile serve --port 3000 --config fileid.toml
//!
//! # Bind to all interfaces
//! fileid-reconcile serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `POST /api/consolidate` - Consolidate a JSON manifest with inline
//!   documents; XML response, or JSON with `?format=json`
//! - `GET /api/format-tree` - The format specificity hierarchy
//! - `GET /api/health` - Liveness check

pub mod server;
