//! Writes awards to the `points` ledger.
//!
//! The ledger row is always inserted before any balance is touched. Its reward key is
//! unique in the table, so that insert is the one place where two concurrent awards
//! for the same event get ordered: whoever loses it stops there.

use std::sync::Arc;

use bb_database::shared::{GroupId, Member, MemberId, NewLedgerEntry};
use bb_database::{Store, StoreError};
use chrono::{DateTime, Datelike, Utc};

use crate::balance::{self, ApplyReport, CasOutcome};
use crate::classifier::{daily_reward_key, group_reward_key, AwardDate};
use crate::guard::InFlightGuard;
use crate::shared::PointsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Forbidden {
    #[error("issuer does not hold the captain title")]
    NotCaptain,
    #[error("issuer is not in any clan")]
    NoClan,
}

#[derive(Debug, thiserror::Error)]
pub enum AwardError {
    #[error("`{0}` is not registered")]
    NotRegistered(String),
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
    #[error("clan {0} has no members")]
    NoRecipients(GroupId),
    #[error("{context}: {source}")]
    Persistence {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

fn persistence(context: &'static str) -> impl FnOnce(StoreError) -> AwardError {
    move |source| AwardError::Persistence { context, source }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    Awarded {
        key: String,
        group_name: String,
        points: i64,
        report: ApplyReport,
    },
    AlreadyAwarded {
        key: String,
        group_name: String,
        /// When the first award was made, unknown if we lost the insert race
        prior: Option<DateTime<Utc>>,
    },
    /// Another handler is working on this key, nothing was done
    InFlight { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyOutcome {
    Awarded { key: String, balance: i64 },
    AlreadyAwarded { key: String },
    /// The ledger row was written but the balance moved under us, no points given
    Stale { key: String },
    InFlight { key: String },
}

pub struct AwardLedger {
    store: Arc<dyn Store>,
    guard: Arc<InFlightGuard>,
    config: Arc<PointsConfig>,
}

impl AwardLedger {
    pub fn new(
        store: Arc<dyn Store>,
        guard: Arc<InFlightGuard>,
        config: Arc<PointsConfig>,
    ) -> Self {
        Self {
            store,
            guard,
            config,
        }
    }

    pub async fn award_group(
        &self,
        issuer_handle: &str,
        date: &AwardDate,
        now: DateTime<Utc>,
    ) -> Result<GroupOutcome, AwardError> {
        let issuer = self
            .store
            .member_by_handle(issuer_handle)
            .await
            .map_err(persistence("looking up the captain"))?
            .ok_or_else(|| AwardError::NotRegistered(issuer_handle.to_string()))?;
        self.award_group_as(&issuer, date, now).await
    }

    /// Clan gathering for an issuer that was already looked up
    pub async fn award_group_as(
        &self,
        issuer: &Member,
        date: &AwardDate,
        now: DateTime<Utc>,
    ) -> Result<GroupOutcome, AwardError> {
        let group = self.authorize(issuer)?;
        let key = group_reward_key(group, date, now.year());

        let _ticket = match self.guard.try_enter(&key) {
            Some(ticket) => ticket,
            None => {
                info!("Already processing `{}`, skipping duplicate request", key);
                return Ok(GroupOutcome::InFlight { key });
            }
        };

        let existing = self
            .store
            .find_ledger_entry(&key)
            .await
            .map_err(persistence("checking existing points"))?;
        if let Some(prior) = existing {
            let group_name = self.group_name(group).await;
            return Ok(GroupOutcome::AlreadyAwarded {
                key,
                group_name,
                prior: Some(prior.updated_at),
            });
        }

        let members = self
            .store
            .group_members(group)
            .await
            .map_err(persistence("fetching clan members"))?;
        if members.is_empty() {
            return Err(AwardError::NoRecipients(group));
        }
        let group_name = self.group_name(group).await;

        let points = self.config.clan_gathering_points;
        let entry = NewLedgerEntry {
            member_id: issuer.id,
            organiser_id: issuer.id,
            points,
            updated_at: now,
            description: key.clone(),
        };
        match self.store.insert_ledger_entry(&entry).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => {
                info!("`{}` was written by someone else first", key);
                return Ok(GroupOutcome::AlreadyAwarded {
                    key,
                    group_name,
                    prior: None,
                });
            }
            Err(e) => return Err(persistence("creating points record")(e)),
        }

        let ids: Vec<MemberId> = members.iter().map(|m| m.id).collect();
        let report = balance::apply(self.store.as_ref(), &ids, points).await;
        info!(
            "`{}`: {} points to {} members of {} ({} failed)",
            key, points, report.success, group_name, report.failed
        );
        Ok(GroupOutcome::Awarded {
            key,
            group_name,
            points,
            report,
        })
    }

    /// Points for the first message of the day.
    /// `subject.bash_points` is the balance the caller saw, the update only goes
    /// through if it is still the stored one.
    pub async fn award_daily(
        &self,
        subject: &Member,
        now: DateTime<Utc>,
    ) -> Result<DailyOutcome, AwardError> {
        let key = daily_reward_key(subject.id, now.date_naive());

        let _ticket = match self.guard.try_enter(&key) {
            Some(ticket) => ticket,
            None => return Ok(DailyOutcome::InFlight { key }),
        };

        let existing = self
            .store
            .find_ledger_entry(&key)
            .await
            .map_err(persistence("checking existing points"))?;
        if existing.is_some() {
            return Ok(DailyOutcome::AlreadyAwarded { key });
        }

        let points = self.config.daily_points;
        let entry = NewLedgerEntry {
            member_id: subject.id,
            organiser_id: subject.id,
            points,
            updated_at: now,
            description: key.clone(),
        };
        match self.store.insert_ledger_entry(&entry).await {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => return Ok(DailyOutcome::AlreadyAwarded { key }),
            Err(e) => return Err(persistence("creating points record")(e)),
        }

        let outcome =
            balance::apply_optimistic(self.store.as_ref(), subject.id, subject.bash_points, points)
                .await
                .map_err(persistence("updating balance"))?;
        Ok(match outcome {
            CasOutcome::Applied { balance } => {
                debug!("`{}`: {} now has {} points", key, subject.display_name(), balance);
                DailyOutcome::Awarded { key, balance }
            }
            CasOutcome::Stale => {
                warn!(
                    "`{}`: balance of {} changed since it was read, no points given",
                    key,
                    subject.display_name()
                );
                DailyOutcome::Stale { key }
            }
        })
    }

    fn authorize(&self, issuer: &Member) -> Result<GroupId, Forbidden> {
        if !issuer.has_title(&self.config.captain_title) {
            return Err(Forbidden::NotCaptain);
        }
        issuer.clan_id.ok_or(Forbidden::NoClan)
    }

    /// Falls back to `Clan <id>` when the name can't be read
    async fn group_name(&self, group: GroupId) -> String {
        match self.store.group_name(group).await {
            Ok(Some(name)) => name,
            Ok(None) => format!("Clan {}", group),
            Err(e) => {
                warn!("Error fetching name of clan {}: {}", group, e);
                format!("Clan {}", group)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_database::memory::MemoryStore;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-11-13T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn setup() -> (Arc<MemoryStore>, AwardLedger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = AwardLedger::new(
            store.clone(),
            InFlightGuard::new(Duration::from_secs(2)),
            Arc::new(PointsConfig::default()),
        );
        (store, ledger)
    }

    fn date(s: &str) -> AwardDate {
        AwardDate::find(s).unwrap()
    }

    #[tokio::test]
    async fn member_title_is_forbidden_and_writes_nothing() {
        let (store, ledger) = setup();
        let clan = store.add_group(1, "Bashers");
        store.add_member("bob", Some("Member"), Some(clan), 0);

        let err = ledger
            .award_group("bob", &date("13 Nov"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AwardError::Forbidden(Forbidden::NotCaptain)));
        assert!(store.ledger().is_empty());
    }

    #[tokio::test]
    async fn captain_without_clan_is_forbidden() {
        let (store, ledger) = setup();
        store.add_member("cap", Some("Captain Bash"), None, 0);

        let err = ledger
            .award_group("cap", &date("13 Nov"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AwardError::Forbidden(Forbidden::NoClan)));
    }

    #[tokio::test]
    async fn unknown_issuer_is_not_registered() {
        let (_, ledger) = setup();
        let err = ledger
            .award_group("ghost", &date("13 Nov"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AwardError::NotRegistered(h) if h == "ghost"));
    }

    #[tokio::test]
    async fn second_award_for_the_same_date_is_refused() {
        let (store, ledger) = setup();
        let clan = store.add_group(1, "Bashers");
        let cap = store.add_member("cap", Some("captain bash"), Some(clan), 0);
        let mate = store.add_member("mate", None, Some(clan), 5);

        let first = ledger
            .award_group("cap", &date("13 Nov"), now())
            .await
            .unwrap();
        assert_eq!(
            first,
            GroupOutcome::Awarded {
                key: "CG-BC1-13Nov25".into(),
                group_name: "Bashers".into(),
                points: 3,
                report: ApplyReport { success: 2, failed: 0 },
            }
        );

        // the guard window is still open, so go around it with a fresh ledger
        let ledger = AwardLedger::new(
            store.clone(),
            InFlightGuard::new(Duration::from_secs(2)),
            Arc::new(PointsConfig::default()),
        );
        let second = ledger
            .award_group("cap", &date("13 nov 2025"), now())
            .await
            .unwrap();
        match second {
            GroupOutcome::AlreadyAwarded {
                group_name, prior, ..
            } => {
                assert_eq!(group_name, "Bashers");
                assert_eq!(prior, Some(now()));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.ledger_entries_for("CG-BC1-13Nov25"), 1);
        assert_eq!(store.balance(cap), Some(3));
        assert_eq!(store.balance(mate), Some(8));
    }

    #[tokio::test]
    async fn empty_population_is_no_recipients() {
        let (store, ledger) = setup();
        let issuer = Member {
            id: MemberId(99),
            name: None,
            discord_username: "cap".into(),
            title: Some("Captain Bash".into()),
            clan_id: Some(GroupId(7)),
            bash_points: 0,
        };
        let err = ledger
            .award_group_as(&issuer, &date("13 Nov"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AwardError::NoRecipients(GroupId(7))));
        assert!(store.ledger().is_empty());
    }

    #[tokio::test]
    async fn missing_clan_name_falls_back_to_id() {
        let (store, ledger) = setup();
        store.add_member("cap", Some("Captain Bash"), Some(GroupId(3)), 0);
        match ledger.award_group("cap", &date("1 jan"), now()).await.unwrap() {
            GroupOutcome::Awarded { group_name, .. } => assert_eq!(group_name, "Clan 3"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn store_failure_is_a_persistence_error() {
        let (store, ledger) = setup();
        let clan = store.add_group(1, "Bashers");
        let cap = store.add_member("cap", Some("Captain Bash"), Some(clan), 0);
        let issuer = store.member_by_handle("cap").await.unwrap().unwrap();
        store.set_unavailable(true);

        let err = ledger
            .award_group_as(&issuer, &date("13 Nov"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AwardError::Persistence { .. }));
        store.set_unavailable(false);
        assert!(store.ledger().is_empty());
        assert_eq!(store.balance(cap), Some(0));
    }

    #[tokio::test]
    async fn partial_failures_are_reported_not_fatal() {
        let (store, ledger) = setup();
        let clan = store.add_group(1, "Bashers");
        store.add_member("cap", Some("Captain Bash"), Some(clan), 0);
        let broken = store.add_member("broken", None, Some(clan), 0);
        store.fail_balance_of(broken);

        match ledger.award_group("cap", &date("13 Nov"), now()).await.unwrap() {
            GroupOutcome::Awarded { report, .. } => {
                assert_eq!(report, ApplyReport { success: 1, failed: 1 })
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.ledger_entries_for("CG-BC1-13Nov25"), 1);
    }

    #[tokio::test]
    async fn daily_award_is_refused_when_balance_moved() {
        let (store, ledger) = setup();
        let id = store.add_member("ann", None, None, 10);
        let seen = store.member_by_handle("ann").await.unwrap().unwrap();
        store.force_balance(id, 15);

        let outcome = ledger.award_daily(&seen, now()).await.unwrap();
        assert_eq!(
            outcome,
            DailyOutcome::Stale {
                key: format!("DP'2025-11-13'{}", id)
            }
        );
        assert_eq!(store.balance(id), Some(15));
        assert_eq!(store.ledger().len(), 1);
    }
}
