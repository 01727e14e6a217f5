use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{FormatTree, FormatTreeError};
use crate::config::ConsolidatorConfig;
use crate::consolidation::filter;
use crate::consolidation::fragment::{FragmentMerger, FragmentSource, Section};
use crate::consolidation::identity::{IdentityConsolidator, IdentityOutcome};
use crate::consolidation::status::{classify, StatusInputs};
use crate::core::output::{ConsolidatedOutput, IdentificationSection, SchemaInfo};
use crate::core::tool::ToolResult;
use crate::xml::Element;

/// Default namespace of consolidated documents
pub const DEFAULT_NAMESPACE: &str = "http://hul.harvard.edu/ois/xml/ns/fits/fits_output";
/// Default schema location of consolidated documents
pub const DEFAULT_SCHEMA_LOCATION: &str = "http://hul.harvard.edu/ois/xml/xsd/fits/fits_output.xsd";

/// Behavior switches for a consolidator
#[derive(Debug, Clone)]
pub struct ConsolidationConfig {
    /// Report disagreements as CONFLICT instead of keeping the first value
    pub report_conflicts: bool,
    /// Append each tool's native output to the result
    pub display_tool_output: bool,
    pub schema: SchemaInfo,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            report_conflicts: true,
            display_tool_output: false,
            schema: SchemaInfo {
                namespace: DEFAULT_NAMESPACE.to_string(),
                location: DEFAULT_SCHEMA_LOCATION.to_string(),
            },
        }
    }
}

/// Reconciles the results of several tools run on one file.
///
/// Holds no per-pass state, so one instance can serve concurrent passes.
#[derive(Debug, Clone)]
pub struct Consolidator {
    tree: Arc<FormatTree>,
    config: ConsolidationConfig,
}

impl Consolidator {
    #[must_use]
    pub fn new(tree: Arc<FormatTree>, config: ConsolidationConfig) -> Self {
        Self { tree, config }
    }

    /// Build from file configuration, loading the format tree it names or the
    /// embedded default.
    ///
    /// # Errors
    ///
    /// Returns an error if the format tree cannot be loaded.
    pub fn from_config(config: &ConsolidatorConfig) -> Result<Self, FormatTreeError> {
        let tree = match &config.format_tree.path {
            Some(path) => {
                info!("Loading format tree from {}", path.display());
                FormatTree::load_from_file(path)?
            }
            None => FormatTree::load_embedded()?,
        };
        debug!("Format tree has {} nodes", tree.len());
        Ok(Self::new(Arc::new(tree), config.to_consolidation_config()))
    }

    #[must_use]
    pub fn tree(&self) -> &FormatTree {
        &self.tree
    }

    #[must_use]
    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Consolidate one file's tool results, stamped with the current time.
    #[must_use]
    pub fn consolidate(&self, results: Vec<Option<ToolResult>>) -> ConsolidatedOutput {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.consolidate_at(results, timestamp)
    }

    /// Consolidate with an explicit timestamp.
    ///
    /// Results are consumed: fragment elements and raw outputs move into the
    /// returned document.
    #[must_use]
    pub fn consolidate_at(
        &self,
        results: Vec<Option<ToolResult>>,
        timestamp: String,
    ) -> ConsolidatedOutput {
        let mut present: Vec<ToolResult> = results.into_iter().flatten().collect();
        let kept: Vec<bool> = present.iter().map(filter::keep).collect();
        debug!(
            "{} of {} tool results kept",
            kept.iter().filter(|k| **k).count(),
            present.len()
        );

        let identification = self.identify(&present, &kept);

        let mut sources: Vec<FragmentSource> = present
            .iter_mut()
            .zip(&kept)
            .filter(|(_, keep)| **keep)
            .filter_map(|(r, _)| {
                let doc = r.fragment.take()?;
                Some(FragmentSource::new(r.tool.clone(), doc))
            })
            .collect();

        let merger = FragmentMerger::new(self.config.report_conflicts);
        let [fileinfo, filestatus, metadata] =
            Section::ALL.map(|section| merger.consolidate_section(&mut sources, section));

        let tool_output = self
            .config
            .display_tool_output
            .then(|| tool_output_element(&mut present));

        ConsolidatedOutput {
            schema: self.config.schema.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
            identification,
            fileinfo,
            filestatus,
            metadata,
            tool_output,
        }
    }

    fn identify(&self, present: &[ToolResult], kept: &[bool]) -> IdentificationSection {
        let all: Vec<&ToolResult> = present.iter().collect();
        let kept_results: Vec<&ToolResult> = present
            .iter()
            .zip(kept)
            .filter(|(_, keep)| **keep)
            .map(|(r, _)| r)
            .collect();

        let outcome = IdentityConsolidator::new(&self.tree).resolve(&all, &kept_results);
        let mut inputs = StatusInputs::new(outcome.identities(), self.config.report_conflicts);
        inputs.partial = outcome.is_partial();
        inputs.unknown = outcome.is_unknown();
        let status = classify(&inputs);

        if matches!(outcome, IdentityOutcome::Empty) {
            debug!("no tool produced an identification");
        }
        let mut identities = outcome.into_identities();
        if !self.config.report_conflicts {
            identities.truncate(1);
        }

        IdentificationSection { status, identities }
    }
}

/// Each present tool's raw output wrapped in a `tool` element naming the tool
fn tool_output_element(results: &mut [ToolResult]) -> Element {
    let mut out = Element::new("toolOutput");
    for result in results {
        if let Some(raw) = result.raw_output.take() {
            out.push(
                Element::new("tool")
                    .with_attr("name", &result.tool.name)
                    .with_attr("version", &result.tool.version)
                    .with_child(raw),
            );
        }
    }
    out
}
