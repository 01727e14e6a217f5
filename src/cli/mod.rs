//! Command-line interface for fileid-reconcile.
//!
//! Available commands:
//!
//! - **consolidate**: Reconcile the tool results listed in a manifest
//! - **tree**: List, query, or export the format specificity hierarchy
//! - **serve**: Start the HTTP consolidation service
//!
//! ## Usage
//!
//! ```text
//! # Consolidated XML on stdout
//! fileid-reconcile consolidate results.json
//!
//! # Keep only the first value when tools disagree
//! fileid-reconcile consolidate results.json --no-report-conflicts
//!
//! # Summary for humans
//! fileid-reconcile consolidate results.json --format text
//!
//! # Which of two formats is more specific?
//! fileid-reconcile tree compare TIFF/EP TIFF
//!
//! # HTTP service
//! fileid-reconcile serve --port 8080
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::ConsolidatorConfig;

pub mod consolidate;
pub mod tree;

#[derive(Parser)]
#[command(name = "fileid-reconcile")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Reconcile file format identifications and metadata from several tools")]
#[command(
    long_about = "fileid-reconcile merges the output of several file identification and metadata extraction tools run on the same file.\n\nIt produces one document with:\n- The most specific format identification the tools support\n- Merged file information, status and metadata\n- Explicit CONFLICT / SINGLE_RESULT / PARTIAL / UNKNOWN markings where tools disagree or stand alone"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "xml")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Consolidate the tool results listed in a manifest
    Consolidate(consolidate::ConsolidateArgs),

    /// Inspect the format specificity hierarchy
    Tree(tree::TreeArgs),

    /// Start the web server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Xml,
    Json,
    Text,
}

/// Load the configuration file if given, else defaults
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ConsolidatorConfig> {
    match path {
        Some(path) => Ok(ConsolidatorConfig::load_from_file(path)?),
        None => Ok(ConsolidatorConfig::default()),
    }
}
