//! Row-count comparison across every handle
//!
//! Counts are taken concurrently and compared for strict equality. There is
//! no tolerance window; a replica that is one row behind does not match.

use futures::future::join_all;
use serde::Serialize;

use crate::db::{DbHandles, StoreError};
use crate::policy::FailurePolicy;
use crate::target::Target;

/// Row count observed on one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetCount {
    pub target: Target,
    pub count: i64,
    /// Set when the count query failed and `count` was zero-filled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of counts in [`Target::ALL`] order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    counts: Vec<TargetCount>,
    all_equal: bool,
}

impl Comparison {
    /// A handle whose count failed never matches, even when every other
    /// handle also reports zero.
    pub fn new(counts: Vec<TargetCount>) -> Self {
        let all_equal = counts.iter().all(|c| c.error.is_none())
            && counts.windows(2).all(|pair| pair[0].count == pair[1].count);
        Self { counts, all_equal }
    }

    pub fn counts(&self) -> &[TargetCount] {
        &self.counts
    }

    /// Count for `target`, zero if it was not measured.
    pub fn count(&self, target: Target) -> i64 {
        self.counts
            .iter()
            .find(|c| c.target == target)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn is_match(&self) -> bool {
        self.all_equal
    }
}

/// Comparison failure (strict policy only)
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("count on {target} failed: {source}")]
    Count {
        target: Target,
        #[source]
        source: StoreError,
    },
}

/// Count rows on every handle and compare.
///
/// Under [`FailurePolicy::BestEffort`] this never fails: a handle that
/// cannot be counted is reported as 0. Under `Strict` the first failure in
/// target order is returned.
pub async fn compare(
    handles: &DbHandles,
    policy: FailurePolicy,
) -> Result<Comparison, CompareError> {
    let results = join_all(
        handles
            .iter()
            .map(|handle| async move { (handle.target(), handle.store().count().await) }),
    )
    .await;

    let mut counts = Vec::with_capacity(results.len());
    for (target, result) in results {
        match result {
            Ok(count) => counts.push(TargetCount {
                target,
                count,
                error: None,
            }),
            Err(source) if policy.is_best_effort() => {
                tracing::warn!(db = %target, error = %source, "count failed, reporting 0");
                counts.push(TargetCount {
                    target,
                    count: 0,
                    error: Some(source.to_string()),
                });
            }
            Err(source) => return Err(CompareError::Count { target, source }),
        }
    }

    let comparison = Comparison::new(counts);
    tracing::debug!(
        primary = comparison.count(Target::Primary),
        replica = comparison.count(Target::Replica),
        proxy = comparison.count(Target::Proxy),
        matched = comparison.is_match(),
        "compared row counts"
    );
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{Handle, MemoryStore};

    fn handles_with(rows: [usize; 3]) -> (DbHandles, [Arc<MemoryStore>; 3]) {
        let stores = rows.map(|n| {
            let store = MemoryStore::new();
            store.seed(n);
            Arc::new(store)
        });
        let handles = DbHandles::new(
            Handle::new(Target::Primary, "primary", stores[0].clone()),
            Handle::new(Target::Replica, "replica", stores[1].clone()),
            Handle::new(Target::Proxy, "pgcat", stores[2].clone()),
        );
        (handles, stores)
    }

    #[tokio::test]
    async fn equal_counts_match() {
        let (handles, _) = handles_with([3, 3, 3]);
        let result = compare(&handles, FailurePolicy::BestEffort).await.unwrap();

        assert!(result.is_match());
        assert_eq!(result.count(Target::Primary), 3);
        assert_eq!(result.count(Target::Replica), 3);
        assert_eq!(result.count(Target::Proxy), 3);
    }

    #[tokio::test]
    async fn lagging_replica_does_not_match() {
        let (handles, _) = handles_with([5, 3, 5]);
        let result = compare(&handles, FailurePolicy::BestEffort).await.unwrap();

        assert!(!result.is_match());
        assert_eq!(result.count(Target::Primary), 5);
        assert_eq!(result.count(Target::Replica), 3);
    }

    #[tokio::test]
    async fn empty_databases_match() {
        let (handles, _) = handles_with([0, 0, 0]);
        let result = compare(&handles, FailurePolicy::BestEffort).await.unwrap();
        assert!(result.is_match());
    }

    #[tokio::test]
    async fn unreachable_replica_counts_as_zero() {
        let (handles, [_, replica, _]) = handles_with([3, 3, 3]);
        replica.set_unreachable(true);

        let result = compare(&handles, FailurePolicy::BestEffort).await.unwrap();
        assert_eq!(result.count(Target::Primary), 3);
        assert_eq!(result.count(Target::Replica), 0);
        assert!(!result.is_match());
        assert!(result.counts()[1].error.is_some());
        assert!(result.counts()[0].error.is_none());
    }

    #[tokio::test]
    async fn failed_handle_never_matches_even_at_zero() {
        let (handles, [_, _, proxy]) = handles_with([0, 0, 0]);
        proxy.set_unreachable(true);

        let result = compare(&handles, FailurePolicy::BestEffort).await.unwrap();
        assert!(!result.is_match());
    }

    #[tokio::test]
    async fn strict_policy_fails_on_unreachable_handle() {
        let (handles, [_, replica, _]) = handles_with([1, 1, 1]);
        replica.set_unreachable(true);

        let err = compare(&handles, FailurePolicy::Strict).await.unwrap_err();
        let CompareError::Count { target, .. } = err;
        assert_eq!(target, Target::Replica);
    }
}
