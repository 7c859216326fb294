//! Route handlers organized by resource

pub mod chats;
pub mod compare;
pub mod health;
pub mod index;

use crate::target::Target;

/// Resolve a request token, logging when an unknown one falls back.
pub(crate) fn resolve_target(token: Option<&str>) -> Target {
    let resolved = Target::resolve(token);
    match token {
        Some(token) if resolved.fallback && !token.is_empty() => {
            tracing::warn!(token, fallback = %resolved.target, "unknown target token");
        }
        _ => {}
    }
    resolved.target
}
