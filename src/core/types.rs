use serde::{Deserialize, Serialize};

/// Classification attached to the identification section and to individual
/// merged elements.
///
/// `None` means no status is reported; it is never written as an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    None,
    SingleResult,
    Partial,
    Conflict,
    Unknown,
}

impl Status {
    /// Attribute value for this status, or `None` when nothing is reported
    #[must_use]
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::SingleResult => Some("SINGLE_RESULT"),
            Self::Partial => Some("PARTIAL"),
            Self::Conflict => Some("CONFLICT"),
            Self::Unknown => Some("UNKNOWN"),
        }
    }

    #[must_use]
    pub fn is_reported(self) -> bool {
        self != Self::None
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_attr().unwrap_or("NONE"))
    }
}

/// Outcome of comparing the values several tools reported for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    /// Only one tool reported a value
    SingleResult,
    /// Every value agrees with the first
    AllAgree,
    /// At least one value disagrees with the first
    Conflict,
}

/// Relation between two format names in the specificity hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    /// The first format is a descendant of the second
    AMoreSpecific,
    /// The second format is a descendant of the first
    BMoreSpecific,
    /// Neither contains the other, or either is absent from the hierarchy
    Unrelated,
}

impl std::fmt::Display for Specificity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AMoreSpecific => write!(f, "more specific"),
            Self::BMoreSpecific => write!(f, "more generic"),
            Self::Unrelated => write!(f, "unrelated"),
        }
    }
}
