use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::FormatTree;
use crate::cli::OutputFormat;
use crate::core::types::Specificity;
use crate::xml::writer::to_xml_string;

#[derive(Args)]
pub struct TreeArgs {
    #[command(subcommand)]
    pub command: TreeCommands,
}

#[derive(Subcommand)]
pub enum TreeCommands {
    /// List every format in the hierarchy
    List {
        /// Path to custom format tree file
        #[arg(long)]
        format_tree: Option<PathBuf>,
    },

    /// Show how two formats relate
    Compare {
        /// First format name
        #[arg(required = true)]
        a: String,

        /// Second format name
        #[arg(required = true)]
        b: String,

        /// Path to custom format tree file
        #[arg(long)]
        format_tree: Option<PathBuf>,
    },

    /// Export the hierarchy to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        /// Path to custom format tree file to export (defaults to embedded)
        #[arg(long)]
        format_tree: Option<PathBuf>,
    },
}

pub fn run(args: TreeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        TreeCommands::List { format_tree } => run_list(format_tree, format, verbose),
        TreeCommands::Compare { a, b, format_tree } => run_compare(&a, &b, format_tree, format),
        TreeCommands::Export {
            output,
            format_tree,
        } => run_export(output, format_tree),
    }
}

fn load_tree(path: Option<PathBuf>) -> anyhow::Result<FormatTree> {
    let tree = if let Some(path) = path {
        FormatTree::load_from_file(&path)?
    } else {
        FormatTree::load_embedded()?
    };
    Ok(tree)
}

fn run_list(path: Option<PathBuf>, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let tree = load_tree(path)?;

    if verbose {
        eprintln!(
            "Loaded format tree with {} formats ({} nodes)",
            tree.format_count(),
            tree.len()
        );
    }

    match format {
        OutputFormat::Text => {
            for (depth, name) in tree.walk() {
                println!("{}{}", "  ".repeat(depth), name);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tree.to_nodes())?);
        }
        OutputFormat::Xml => {
            println!("{}", to_xml_string(&tree.to_element())?);
        }
    }

    Ok(())
}

fn run_compare(
    a: &str,
    b: &str,
    path: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let tree = load_tree(path)?;
    let relation = tree.specificity(a, b);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "a": a,
                "b": b,
                "relation": relation,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text | OutputFormat::Xml => {
            for name in [a, b] {
                if !tree.contains(name) {
                    eprintln!("Warning: '{name}' is not in the format tree");
                }
            }
            match relation {
                Specificity::AMoreSpecific => println!("'{a}' is more specific than '{b}'"),
                Specificity::BMoreSpecific => println!("'{b}' is more specific than '{a}'"),
                Specificity::Unrelated => println!("'{a}' and '{b}' are unrelated"),
            }
        }
    }

    Ok(())
}

fn run_export(output: PathBuf, path: Option<PathBuf>) -> anyhow::Result<()> {
    let tree = load_tree(path)?;

    let xml = to_xml_string(&tree.to_element())?;
    std::fs::write(&output, format!("{xml}\n"))?;

    println!(
        "Exported {} formats ({} nodes) to {}",
        tree.format_count(),
        tree.len(),
        output.display()
    );

    Ok(())
}
