use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_config, OutputFormat};
use crate::consolidation::Consolidator;
use crate::core::output::ConsolidatedOutput;
use crate::parsing::manifest::load_manifest;
use crate::xml::Element;

#[derive(Args)]
pub struct ConsolidateArgs {
    /// Manifest (JSON) listing every tool result for one file
    #[arg(required = true)]
    pub manifest: PathBuf,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Format specificity hierarchy to use instead of the built-in one
    #[arg(long)]
    pub format_tree: Option<PathBuf>,

    /// Keep the first value when tools disagree instead of reporting CONFLICT
    #[arg(long)]
    pub no_report_conflicts: bool,

    /// Append each tool's native output
    #[arg(long)]
    pub display_tool_output: bool,
}

pub fn run(args: ConsolidateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.no_report_conflicts {
        config.output.report_conflicts = false;
    }
    if args.display_tool_output {
        config.output.display_tool_output = true;
    }
    if let Some(path) = args.format_tree {
        config.format_tree.path = Some(path);
    }

    let consolidator = Consolidator::from_config(&config)?;
    if verbose {
        let tree = consolidator.tree();
        eprintln!(
            "Loaded format tree with {} formats ({} nodes)",
            tree.format_count(),
            tree.len()
        );
    }

    let results = load_manifest(&args.manifest)?;
    if verbose {
        let present = results.iter().flatten().count();
        eprintln!(
            "Read {} tool results ({} absent) from {}",
            results.len(),
            results.len() - present,
            args.manifest.display()
        );
    }

    let output = consolidator.consolidate(results);
    let rendered = match format {
        OutputFormat::Xml => output.to_xml()?,
        OutputFormat::Json => serde_json::to_string_pretty(&output)?,
        OutputFormat::Text => render_text(&output),
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{rendered}\n"))?;
            if verbose {
                eprintln!("Wrote {}", path.display());
            }
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn render_text(output: &ConsolidatedOutput) -> String {
    let mut lines = Vec::new();

    let status = output
        .identification
        .status
        .as_attr()
        .unwrap_or("AGREED");
    lines.push(format!("Identification ({status})"));
    if output.identification.identities.is_empty() {
        lines.push("   (none)".to_string());
    }
    for identity in &output.identification.identities {
        lines.push(format!("   {} [{}]", identity.format, identity.mimetype));
        let tools: Vec<String> = identity.reporting_tools.iter().map(ToString::to_string).collect();
        lines.push(format!("      reported by: {}", tools.join(", ")));
        for version in &identity.format_versions {
            lines.push(format!("      version: {} ({})", version.value, version.tool.name));
        }
        for xid in &identity.external_identifiers {
            lines.push(format!("      {}: {} ({})", xid.id_type, xid.value, xid.tool.name));
        }
    }

    for section in [&output.fileinfo, &output.filestatus] {
        push_section(&mut lines, section, 0);
    }
    lines.push(format!("\n{}", output.metadata.name));
    for group in &output.metadata.children {
        push_section(&mut lines, group, 1);
    }

    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, section: &Element, depth: usize) {
    let indent = "   ".repeat(depth);
    lines.push(format!("\n{indent}{}", section.name));
    for element in &section.children {
        let tool = element.attr("toolname").unwrap_or("-");
        let mut line = format!("{indent}   {}: {} ({tool})", element.name, element.text);
        if let Some(status) = element.attr("status") {
            line.push_str(&format!(" {status}"));
        }
        lines.push(line);
    }
}
