//! Overall status of the identification section.

use crate::core::identity::ConsolidatedIdentity;
use crate::core::types::Status;

/// Facts about the identity outcome that decide the section status
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusInputs {
    /// Number of consolidated identities
    pub count: usize,
    pub report_conflicts: bool,
    /// Exactly one identity, reported by more than one tool
    pub tools_agree: bool,
    /// The partial-identity fallback supplied the identities
    pub partial: bool,
    /// The unknown-identity fallback supplied the identities
    pub unknown: bool,
}

impl StatusInputs {
    #[must_use]
    pub fn new(identities: &[ConsolidatedIdentity], report_conflicts: bool) -> Self {
        Self {
            count: identities.len(),
            report_conflicts,
            tools_agree: tools_agree(identities),
            partial: false,
            unknown: false,
        }
    }
}

#[must_use]
pub fn tools_agree(identities: &[ConsolidatedIdentity]) -> bool {
    identities.len() == 1 && identities[0].reporting_tools.len() > 1
}

/// Classify the identification section.
///
/// Agreement of several tools on one identity is not itself reported, so
/// that case yields [`Status::None`]. No identities also yields `None`.
#[must_use]
pub fn classify(inputs: &StatusInputs) -> Status {
    let StatusInputs {
        count,
        report_conflicts,
        tools_agree,
        partial,
        unknown,
    } = *inputs;

    if count == 0 {
        Status::None
    } else if count > 1 && report_conflicts {
        Status::Conflict
    } else if (count == 1 && !unknown && !partial && !tools_agree) || !report_conflicts {
        Status::SingleResult
    } else if count == 1 && partial {
        Status::Partial
    } else if !tools_agree {
        Status::Unknown
    } else {
        Status::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(count: usize) -> StatusInputs {
        StatusInputs {
            count,
            report_conflicts: true,
            ..StatusInputs::default()
        }
    }

    #[test]
    fn test_multiple_identities_conflict() {
        assert_eq!(classify(&inputs(2)), Status::Conflict);
    }

    #[test]
    fn test_reporting_disabled_is_single_result() {
        let mut i = inputs(3);
        i.report_conflicts = false;
        assert_eq!(classify(&i), Status::SingleResult);

        let mut partial = inputs(1);
        partial.report_conflicts = false;
        partial.partial = true;
        assert_eq!(classify(&partial), Status::SingleResult);
    }

    #[test]
    fn test_single_tool_single_identity() {
        assert_eq!(classify(&inputs(1)), Status::SingleResult);
    }

    #[test]
    fn test_agreeing_tools_report_nothing() {
        let mut i = inputs(1);
        i.tools_agree = true;
        assert_eq!(classify(&i), Status::None);
    }

    #[test]
    fn test_partial_fallback() {
        let mut i = inputs(1);
        i.partial = true;
        assert_eq!(classify(&i), Status::Partial);
    }

    #[test]
    fn test_unknown_fallback() {
        let mut i = inputs(1);
        i.unknown = true;
        assert_eq!(classify(&i), Status::Unknown);
    }

    #[test]
    fn test_no_identities() {
        assert_eq!(classify(&inputs(0)), Status::None);
    }
}
