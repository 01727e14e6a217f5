//! Merging of format claims across tools.

use tracing::debug;

use crate::catalog::FormatTree;
use crate::core::identity::{ConsolidatedIdentity, ToolIdentity};
use crate::core::tool::ToolResult;
use crate::core::types::Specificity;
use crate::utils::normalize::pair_eq_ignore_case;

/// MIME type tools fall back to when they cannot tell anything
pub const OCTET_STREAM: &str = "application/octet-stream";
/// Format name tools fall back to when they cannot tell anything
pub const UNKNOWN_BINARY: &str = "Unknown Binary";

/// Where the identities of a pass came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityOutcome {
    /// Merged from known claims of the kept identifying tools
    Known(Vec<ConsolidatedIdentity>),
    /// Taken from the first tool with a partial identification
    Partial(Vec<ConsolidatedIdentity>),
    /// Taken from the first identifying tool with any identification
    Unknown(Vec<ConsolidatedIdentity>),
    /// No tool offered anything
    Empty,
}

impl IdentityOutcome {
    #[must_use]
    pub fn identities(&self) -> &[ConsolidatedIdentity] {
        match self {
            Self::Known(ids) | Self::Partial(ids) | Self::Unknown(ids) => ids,
            Self::Empty => &[],
        }
    }

    #[must_use]
    pub fn into_identities(self) -> Vec<ConsolidatedIdentity> {
        match self {
            Self::Known(ids) | Self::Partial(ids) | Self::Unknown(ids) => ids,
            Self::Empty => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

/// Merges claims, letting more specific formats displace generic ones
pub struct IdentityConsolidator<'a> {
    tree: &'a FormatTree,
}

impl<'a> IdentityConsolidator<'a> {
    #[must_use]
    pub fn new(tree: &'a FormatTree) -> Self {
        Self { tree }
    }

    /// Merge claims in order into a list of distinct identities.
    ///
    /// Each claim is compared against the entries built so far, in order:
    /// - same (format, mimetype): the claim is folded into that entry
    /// - claim more specific: the entry is replaced by a fresh record of the
    ///   claim
    /// - entry more specific: the claim is marked absorbed and scanning goes on
    ///
    /// A claim that neither matched nor was absorbed becomes a new entry.
    pub fn consolidate<'c, I>(&self, claims: I) -> Vec<ConsolidatedIdentity>
    where
        I: IntoIterator<Item = &'c ToolIdentity>,
    {
        let mut entries: Vec<ConsolidatedIdentity> = Vec::new();

        for claim in claims {
            let mut placed = false;
            let mut absorbed = false;

            for i in 0..entries.len() {
                if entries[i].matches(claim) {
                    entries[i].absorb(claim);
                    placed = true;
                    break;
                }

                match self.tree.specificity(&claim.format, &entries[i].format) {
                    Specificity::AMoreSpecific => {
                        debug!(
                            "{} ({}) replaces less specific {}",
                            claim.format, claim.tool.name, entries[i].format
                        );
                        entries[i] = ConsolidatedIdentity::from_claim(claim);
                        fold_duplicates(&mut entries, i);
                        placed = true;
                        break;
                    }
                    Specificity::BMoreSpecific => {
                        debug!(
                            "{} ({}) absorbed by more specific {}",
                            claim.format, claim.tool.name, entries[i].format
                        );
                        absorbed = true;
                    }
                    Specificity::Unrelated => {}
                }
            }

            if !placed && !absorbed {
                entries.push(ConsolidatedIdentity::from_claim(claim));
            }
        }

        entries
    }

    /// Identities for a pass.
    ///
    /// Known claims of the `kept` identifying tools are merged first. When
    /// none exist, `all` present results are searched for a partial and then
    /// for any identification.
    #[must_use]
    pub fn resolve(&self, all: &[&ToolResult], kept: &[&ToolResult]) -> IdentityOutcome {
        let claims = known_claims(kept);
        if !claims.is_empty() {
            return IdentityOutcome::Known(self.consolidate(claims));
        }

        if let Some(identities) = first_partial_identity(all) {
            return IdentityOutcome::Partial(identities);
        }
        match first_unknown_identity(all) {
            Some(identities) => IdentityOutcome::Unknown(identities),
            None => IdentityOutcome::Empty,
        }
    }
}

/// After `entries[at]` was replaced, merge any later entry with the same key
/// into it so keys stay distinct.
fn fold_duplicates(entries: &mut Vec<ConsolidatedIdentity>, at: usize) {
    let mut j = at + 1;
    while j < entries.len() {
        let same = pair_eq_ignore_case(
            (&entries[at].format, &entries[at].mimetype),
            (&entries[j].format, &entries[j].mimetype),
        );
        if same {
            let dup = entries.remove(j);
            entries[at].merge_record(dup);
        } else {
            j += 1;
        }
    }
}

/// Known claims of identifying tools, in tool order then claim order
#[must_use]
pub fn known_claims<'r>(results: &[&'r ToolResult]) -> Vec<&'r ToolIdentity> {
    results
        .iter()
        .filter(|r| r.identifies)
        .flat_map(|r| r.identities.iter().filter(|i| r.rule.is_known(i)))
        .collect()
}

/// Whether a tool's first identity is a partial identification: one of
/// format and MIME type is the generic placeholder while the other is not.
///
/// Comparisons are exact and case-sensitive.
#[must_use]
#[allow(clippy::nonminimal_bool)]
pub fn is_partial_identity(identities: &[ToolIdentity]) -> bool {
    let Some(first) = identities.first() else {
        return false;
    };
    let mime = first.mimetype.as_str();
    let format = first.format.as_str();
    let valid_mime = !mime.is_empty();
    let valid_format = !format.is_empty();

    if (valid_mime && valid_format) || (valid_mime && !valid_format) || (valid_format && !valid_mime)
    {
        (mime == OCTET_STREAM && format != UNKNOWN_BINARY)
            || (format == UNKNOWN_BINARY && mime != OCTET_STREAM)
    } else {
        false
    }
}

/// All identities of the first identifying tool whose first identity is partial
#[must_use]
pub fn first_partial_identity(results: &[&ToolResult]) -> Option<Vec<ConsolidatedIdentity>> {
    results
        .iter()
        .find(|r| r.identifies && !r.identities.is_empty() && is_partial_identity(&r.identities))
        .map(|r| {
            debug!("using partial identification from {}", r.tool.name);
            fresh_records(&r.identities)
        })
}

/// All identities of the first identifying tool that reported any
#[must_use]
pub fn first_unknown_identity(results: &[&ToolResult]) -> Option<Vec<ConsolidatedIdentity>> {
    results
        .iter()
        .find(|r| r.identifies && !r.identities.is_empty())
        .map(|r| {
            debug!("using unknown identification from {}", r.tool.name);
            fresh_records(&r.identities)
        })
}

fn fresh_records(identities: &[ToolIdentity]) -> Vec<ConsolidatedIdentity> {
    identities.iter().map(ConsolidatedIdentity::from_claim).collect()
}
