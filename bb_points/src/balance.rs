use bb_database::shared::MemberId;
use bb_database::{Store, StoreError};

/// Result of a best-effort update over several members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub success: usize,
    pub failed: usize,
}

impl ApplyReport {
    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Applied { balance: i64 },
    /// The balance moved since it was read, nothing was written
    Stale,
}

/// Adds `delta` to every member, one read-then-write each.
///
/// A member that fails is counted and skipped, the others still get their points.
/// Two writers on the same member can lose an update here, which is accepted for
/// group awards.
pub async fn apply(store: &dyn Store, members: &[MemberId], delta: i64) -> ApplyReport {
    let mut report = ApplyReport::default();
    for &id in members {
        match apply_one(store, id, delta).await {
            Ok(()) => report.success += 1,
            Err(e) => {
                error!("Error updating points for member {}: {}", id, e);
                report.failed += 1;
            }
        }
    }
    report
}

async fn apply_one(store: &dyn Store, id: MemberId, delta: i64) -> Result<(), StoreError> {
    let current = store
        .member_balance(id)
        .await?
        .ok_or_else(|| StoreError::Missing(format!("member {}", id)))?;
    match store.set_balance(id, current.saturating_add(delta)).await? {
        0 => Err(StoreError::Missing(format!("member {}", id))),
        _ => Ok(()),
    }
}

/// Adds `delta` to a single member, only if its balance is still `expected`.
/// A lost race is reported as [`CasOutcome::Stale`] and not retried.
pub async fn apply_optimistic(
    store: &dyn Store,
    id: MemberId,
    expected: i64,
    delta: i64,
) -> Result<CasOutcome, StoreError> {
    let balance = expected.saturating_add(delta);
    match store.compare_and_set_balance(id, expected, balance).await? {
        0 => Ok(CasOutcome::Stale),
        _ => Ok(CasOutcome::Applied { balance }),
    }
}
