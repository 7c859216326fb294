//! Failure suppression policy

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How list and compare treat partial failures.
///
/// - `BestEffort`: a row that fails to decode is skipped; a handle whose
///   count query fails contributes 0 to the comparison.
/// - `Strict`: either case fails the whole operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    #[default]
    BestEffort,
    Strict,
}

impl FailurePolicy {
    pub fn is_best_effort(self) -> bool {
        matches!(self, Self::BestEffort)
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best-effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => f.write_str("best-effort"),
            Self::Strict => f.write_str("strict"),
        }
    }
}
