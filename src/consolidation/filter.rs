//! Culling of absent and unusable tool results.

use tracing::debug;

use crate::core::tool::ToolResult;

/// Whether a result takes part in consolidation.
///
/// Tools that do not identify formats are always kept for their metadata.
/// Identifying tools are kept only when every identity they report is known
/// by their own rule.
#[must_use]
pub fn keep(result: &ToolResult) -> bool {
    if !result.identifies || result.all_identities_known() {
        return true;
    }
    debug!(
        "tossing {} identification because of invalid identification",
        result.tool.name
    );
    false
}

/// Drop absent results and those failing [`keep`], preserving order.
#[must_use]
pub fn cull(results: &[Option<ToolResult>]) -> Vec<&ToolResult> {
    results.iter().flatten().filter(|r| keep(r)).collect()
}
