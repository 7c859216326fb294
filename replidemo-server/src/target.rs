//! Target selection
//!
//! Maps the token a caller sends (`?db=replica`, `{"target": "pgcat"}`) to one
//! of the three fixed database targets. Matching is exact and case-sensitive.
//! Unknown or missing tokens resolve to [`Target::Primary`]; the fallback is
//! reported in [`Resolved::fallback`] rather than hidden.

use std::fmt;

use serde::Serialize;

/// One of the fixed database targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The writable instance
    Primary,
    /// Streaming replica, expected to reject writes
    Replica,
    /// Pooling/load-balancing proxy (PgCat)
    Proxy,
}

/// Result of resolving a caller-supplied token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub target: Target,
    /// True when the token was missing or unrecognised and the default was used
    pub fallback: bool,
}

impl Target {
    /// Every target, in the order comparisons report them.
    pub const ALL: [Target; 3] = [Target::Primary, Target::Replica, Target::Proxy];

    /// Target used when a token is missing or unrecognised.
    pub const DEFAULT: Target = Target::Primary;

    /// Parse a token. Returns `None` for anything not in the known set.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "master" | "primary" => Some(Self::Primary),
            "replica" => Some(Self::Replica),
            "pgcat" | "proxy" => Some(Self::Proxy),
            _ => None,
        }
    }

    /// Resolve an optional token, falling back to [`Target::DEFAULT`].
    ///
    /// Never fails.
    ///
    /// # Example
    /// ```
    /// use replidemo_server::target::Target;
    ///
    /// assert_eq!(Target::resolve(Some("replica")).target, Target::Replica);
    /// assert!(Target::resolve(Some("Replica")).fallback);
    /// assert_eq!(Target::resolve(None).target, Target::Primary);
    /// ```
    pub fn resolve(token: Option<&str>) -> Resolved {
        match token.and_then(Self::parse) {
            Some(target) => Resolved {
                target,
                fallback: false,
            },
            None => Resolved {
                target: Self::DEFAULT,
                fallback: true,
            },
        }
    }

    /// Canonical token used by the web page and in logs.
    pub fn token(self) -> &'static str {
        match self {
            Self::Primary => "master",
            Self::Replica => "replica",
            Self::Proxy => "pgcat",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens() {
        assert_eq!(Target::parse("master"), Some(Target::Primary));
        assert_eq!(Target::parse("primary"), Some(Target::Primary));
        assert_eq!(Target::parse("replica"), Some(Target::Replica));
        assert_eq!(Target::parse("pgcat"), Some(Target::Proxy));
        assert_eq!(Target::parse("proxy"), Some(Target::Proxy));
    }

    #[test]
    fn recognised_tokens_do_not_fall_back() {
        for token in ["master", "primary", "replica", "pgcat", "proxy"] {
            assert!(!Target::resolve(Some(token)).fallback, "{token}");
        }
    }

    #[test]
    fn unknown_tokens_resolve_to_primary() {
        for token in ["", "REPLICA", "Replica", " replica", "replica2", "slave", "pg-cat"] {
            let resolved = Target::resolve(Some(token));
            assert_eq!(resolved.target, Target::Primary, "{token:?}");
            assert!(resolved.fallback, "{token:?}");
        }
    }

    #[test]
    fn missing_token_resolves_to_primary() {
        let resolved = Target::resolve(None);
        assert_eq!(resolved.target, Target::Primary);
        assert!(resolved.fallback);
    }

    #[test]
    fn tokens_round_trip_through_display() {
        for target in Target::ALL {
            assert_eq!(Target::parse(&target.to_string()), Some(target));
        }
    }
}
