use std::sync::Arc;

use bb_database::shared::Member;
use bb_database::Store;
use chrono::{DateTime, Utc};

use crate::classifier::{classify, AwardDate, Classification, Command};
use crate::commands;
use crate::guard::InFlightGuard;
use crate::ledger::{AwardLedger, DailyOutcome};
use crate::shared::PointsConfig;

/// What a handler wants done: `Ok(Some(text))` replies, `Ok(None)` stays quiet and
/// `Err` is reported through [`bb_core::Error`]
pub type Reply = Result<Option<String>, bb_core::Error>;

/// A chat message, stripped of everything the points logic doesn't need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub author: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

pub struct MessageProcessor {
    store: Arc<dyn Store>,
    config: Arc<PointsConfig>,
    ledger: AwardLedger,
}

impl MessageProcessor {
    pub fn new(store: Arc<dyn Store>, config: PointsConfig) -> Self {
        let guard = InFlightGuard::new(config.guard_release());
        Self::with_guard(store, config, guard)
    }

    pub fn with_guard(
        store: Arc<dyn Store>,
        config: PointsConfig,
        guard: Arc<InFlightGuard>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            ledger: AwardLedger::new(store.clone(), guard, config.clone()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &PointsConfig {
        &self.config
    }

    /// Every reply this message calls for, in order
    pub async fn process(&self, msg: &InboundMessage) -> Vec<Reply> {
        match classify(&msg.content, &self.config.command_prefix) {
            Classification::Command(cmd) => vec![self.run_command(cmd, msg).await],
            Classification::GroupAwardCandidate(date) => self.implicit(msg, Some(date)).await,
            Classification::NoEvent => self.implicit(msg, None).await,
        }
    }

    async fn run_command(&self, cmd: Command, msg: &InboundMessage) -> Reply {
        let store = self.store.as_ref();
        match cmd {
            Command::CheckDb => commands::checkdb::run(store).await,
            Command::MyPoints => commands::mypoints::run(store, &msg.author).await,
            Command::ListUsers => {
                commands::listusers::run(store, self.config.leaderboard_size).await
            }
            Command::ClanGathering(date) => {
                commands::clan_gathering::run(
                    &self.ledger,
                    &self.config,
                    &msg.author,
                    date.as_ref(),
                    msg.received_at,
                )
                .await
            }
            Command::DebugSchema => commands::debugschema::run(store).await,
            Command::Help => {
                commands::help::run(&self.config.command_prefix, &self.config.captain_title)
            }
            Command::Unknown(name) => {
                debug!("Unknown command `{}` from {}", name, msg.author);
                Ok(None)
            }
        }
    }

    /// Messages that are not commands: the daily award, then the clan gathering if a
    /// date was typed. The daily award goes first because it only writes if the
    /// balance is still the one read here, and a clan gathering would change it.
    async fn implicit(&self, msg: &InboundMessage, date: Option<AwardDate>) -> Vec<Reply> {
        let author = match self.store.member_by_handle(&msg.author).await {
            Ok(Some(member)) => member,
            Ok(None) => return vec![],
            Err(e) => {
                return vec![Err(bb_core::Error::Error(format!(
                    "Error looking up `{}`: {}",
                    msg.author, e
                )))]
            }
        };

        let mut replies = Vec::with_capacity(2);
        if self.config.daily_enabled {
            replies.push(self.daily(&author, msg.received_at).await);
        }
        if let Some(date) = date {
            replies.push(
                commands::clan_gathering::implicit(
                    &self.ledger,
                    &self.config,
                    &author,
                    &date,
                    msg.received_at,
                )
                .await,
            );
        }
        replies
    }

    async fn daily(&self, author: &Member, now: DateTime<Utc>) -> Reply {
        match self.ledger.award_daily(author, now).await {
            Ok(DailyOutcome::Awarded { balance, .. }) => Ok(Some(format!(
                "🌞 Thanks for showing up today **{}**! +{} bash points, you now have **{}**.",
                author.display_name(),
                self.config.daily_points,
                balance
            ))),
            Ok(DailyOutcome::AlreadyAwarded { .. }) | Ok(DailyOutcome::InFlight { .. }) => Ok(None),
            Ok(DailyOutcome::Stale { key }) => error_err!(format!(
                "`{}`: balance moved during the daily award, nothing given",
                key
            )),
            Err(e) => error_err!(format!(
                "Daily award for {} failed: {:?}",
                author.discord_username, e
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bb_database::memory::MemoryStore;

    fn at(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    fn msg(author: &str, content: &str, ts: &str) -> InboundMessage {
        InboundMessage {
            author: author.into(),
            content: content.into(),
            received_at: at(ts),
        }
    }

    fn setup() -> (Arc<MemoryStore>, MessageProcessor) {
        let store = Arc::new(MemoryStore::new());
        let processor = MessageProcessor::new(store.clone(), PointsConfig::default());
        (store, processor)
    }

    #[tokio::test]
    async fn command_from_non_captain_is_only_a_command() {
        let (store, processor) = setup();
        let clan = store.add_group(1, "Bashers");
        let bob = store.add_member("bob", Some("Member"), Some(clan), 0);

        let replies = processor
            .process(&msg("bob", "!cg 13 Nov", "2025-11-13T10:00:00Z"))
            .await;
        assert_eq!(
            replies,
            vec![Err(bb_core::Error::Message(
                "❌ Only members with \"Captain Bash\" title can award clan gathering points."
                    .into()
            ))]
        );
        // no daily award either: commands are consumed whole
        assert!(store.ledger().is_empty());
        assert_eq!(store.balance(bob), Some(0));
    }

    #[tokio::test]
    async fn daily_award_once_per_day() {
        let (store, processor) = setup();
        let ann = store.add_member("ann", None, None, 5);

        let first = processor
            .process(&msg("ann", "good morning", "2025-11-13T08:00:00Z"))
            .await;
        assert_eq!(first.len(), 1);
        assert!(matches!(&first[0], Ok(Some(text)) if text.contains("you now have **6**")));

        let second = processor
            .process(&msg("Ann", "still here", "2025-11-13T23:59:00Z"))
            .await;
        assert_eq!(second, vec![Ok(None)]);
        assert_eq!(store.balance(ann), Some(6));
        assert_eq!(store.ledger().len(), 1);
    }

    #[tokio::test]
    async fn strangers_are_ignored() {
        let (store, processor) = setup();
        let replies = processor
            .process(&msg("ghost", "13 Nov", "2025-11-13T08:00:00Z"))
            .await;
        assert!(replies.is_empty());
        assert!(store.ledger().is_empty());
    }

    #[tokio::test]
    async fn captain_typing_a_date_gets_both_awards() {
        let (store, processor) = setup();
        let clan = store.add_group(2, "Smashers");
        let cap = store.add_member("cap", Some("Captain Bash"), Some(clan), 0);
        let mate = store.add_member("mate", None, Some(clan), 0);

        let replies = processor
            .process(&msg("cap", "gathering :date: 13 Nov 2025", "2025-11-13T21:00:00Z"))
            .await;
        assert_eq!(replies.len(), 2);
        assert!(replies.iter().all(|r| matches!(r, Ok(Some(_)))));
        assert_eq!(store.ledger_entries_for("CG-BC2-13Nov25"), 1);
        assert_eq!(store.balance(cap), Some(4));
        assert_eq!(store.balance(mate), Some(3));
    }

    #[tokio::test]
    async fn unknown_commands_are_swallowed() {
        let (store, processor) = setup();
        store.add_member("ann", None, None, 0);
        let replies = processor
            .process(&msg("ann", "!dance 13 Nov", "2025-11-13T08:00:00Z"))
            .await;
        assert_eq!(replies, vec![Ok(None)]);
        assert!(store.ledger().is_empty());
    }

    #[tokio::test]
    async fn store_errors_outside_commands_are_only_logged() {
        let (store, processor) = setup();
        store.add_member("ann", None, None, 0);
        store.set_unavailable(true);
        let replies = processor
            .process(&msg("ann", "hello", "2025-11-13T08:00:00Z"))
            .await;
        assert_eq!(replies.len(), 1);
        let err = replies[0].clone().unwrap_err();
        assert_eq!(err.user_message(), None);
        assert!(err.log_message().is_some());
    }

    #[tokio::test]
    async fn non_ascii_digits_are_not_a_date() {
        let (store, processor) = setup();
        let clan = store.add_group(1, "Bashers");
        store.add_member("cap", Some("Captain Bash"), Some(clan), 0);

        let replies = processor
            .process(&msg("cap", "!cg ١٣ nov", "2025-11-13T10:00:00Z"))
            .await;
        assert_eq!(
            replies,
            vec![Err(bb_core::Error::Message(
                commands::clan_gathering::FORMAT_HELP.into()
            ))]
        );

        let replies = processor
            .process(&msg("cap", "!cg 13 nov २०२५", "2025-11-13T10:00:00Z"))
            .await;
        assert!(matches!(&replies[0], Ok(Some(text)) if text.contains("**13 Nov 2025**")));
        assert_eq!(store.ledger_entries_for("CG-BC1-13Nov25"), 1);
    }

    #[tokio::test]
    async fn daily_can_be_disabled() {
        let store = Arc::new(MemoryStore::new());
        let config = PointsConfig {
            daily_enabled: false,
            ..PointsConfig::default()
        };
        let processor = MessageProcessor::new(store.clone(), config);
        store.add_member("ann", None, None, 0);
        let replies = processor
            .process(&msg("ann", "hello", "2025-11-13T08:00:00Z"))
            .await;
        assert!(replies.is_empty());
        assert_eq!(processor.config().daily_points, 1);
    }
}
