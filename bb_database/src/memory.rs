//! In-memory [`Store`] for tests.
//!
//! Every operation yields to the runtime before touching the data, so concurrent
//! handlers interleave at the same points they would against the real database.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::shared::{GroupId, LedgerEntry, Member, MemberId, NewLedgerEntry, TableSample};
use crate::store::{Store, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    members: Vec<Member>,
    groups: HashMap<GroupId, String>,
    ledger: Vec<LedgerEntry>,
    failing_balances: HashSet<MemberId>,
    unavailable: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&self, id: i64, name: &str) -> GroupId {
        let id = GroupId(id);
        self.state.lock().groups.insert(id, name.to_string());
        id
    }

    pub fn add_member(
        &self,
        handle: &str,
        title: Option<&str>,
        clan: Option<GroupId>,
        bash_points: i64,
    ) -> MemberId {
        let mut state = self.state.lock();
        let id = MemberId(state.members.len() as i64 + 1);
        state.members.push(Member {
            id,
            name: None,
            discord_username: handle.to_string(),
            title: title.map(String::from),
            clan_id: clan,
            bash_points,
        });
        id
    }

    pub fn member(&self, id: MemberId) -> Option<Member> {
        self.state.lock().members.iter().find(|m| m.id == id).cloned()
    }

    pub fn balance(&self, id: MemberId) -> Option<i64> {
        self.state
            .lock()
            .members
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.bash_points)
    }

    /// Writes a balance behind the bot's back, like another writer would
    pub fn force_balance(&self, id: MemberId, balance: i64) {
        if let Some(m) = self.state.lock().members.iter_mut().find(|m| m.id == id) {
            m.bash_points = balance;
        }
    }

    /// Balance reads and writes for this member will fail from now on
    pub fn fail_balance_of(&self, id: MemberId) {
        self.state.lock().failing_balances.insert(id);
    }

    /// Every operation fails with [`StoreError::Unavailable`] while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    pub fn ledger(&self) -> Vec<LedgerEntry> {
        self.state.lock().ledger.clone()
    }

    pub fn ledger_entries_for(&self, reward_key: &str) -> usize {
        self.state
            .lock()
            .ledger
            .iter()
            .filter(|e| e.description == reward_key)
            .count()
    }

    async fn enter(&self) -> StoreResult<()> {
        tokio::task::yield_now().await;
        if self.state.lock().unavailable {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }

    fn check_balance_access(state: &State, id: MemberId) -> StoreResult<()> {
        if state.failing_balances.contains(&id) {
            return Err(StoreError::Unavailable(format!(
                "balance of member {} is locked",
                id
            )));
        }
        Ok(())
    }
}

#[serenity::async_trait]
impl Store for MemoryStore {
    async fn count_members(&self) -> StoreResult<i64> {
        self.enter().await?;
        Ok(self.state.lock().members.len() as i64)
    }

    async fn member_by_handle(&self, handle: &str) -> StoreResult<Option<Member>> {
        self.enter().await?;
        let handle = handle.to_lowercase();
        Ok(self
            .state
            .lock()
            .members
            .iter()
            .find(|m| m.discord_username.to_lowercase() == handle)
            .cloned())
    }

    async fn member_balance(&self, id: MemberId) -> StoreResult<Option<i64>> {
        self.enter().await?;
        let state = self.state.lock();
        Self::check_balance_access(&state, id)?;
        Ok(state
            .members
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.bash_points))
    }

    async fn set_balance(&self, id: MemberId, balance: i64) -> StoreResult<u64> {
        self.enter().await?;
        let mut state = self.state.lock();
        Self::check_balance_access(&state, id)?;
        Ok(match state.members.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.bash_points = balance;
                1
            }
            None => 0,
        })
    }

    async fn compare_and_set_balance(
        &self,
        id: MemberId,
        expected: i64,
        balance: i64,
    ) -> StoreResult<u64> {
        self.enter().await?;
        let mut state = self.state.lock();
        Self::check_balance_access(&state, id)?;
        Ok(
            match state
                .members
                .iter_mut()
                .find(|m| m.id == id && m.bash_points == expected)
            {
                Some(m) => {
                    m.bash_points = balance;
                    1
                }
                None => 0,
            },
        )
    }

    async fn group_name(&self, group: GroupId) -> StoreResult<Option<String>> {
        self.enter().await?;
        Ok(self.state.lock().groups.get(&group).cloned())
    }

    async fn group_members(&self, group: GroupId) -> StoreResult<Vec<Member>> {
        self.enter().await?;
        Ok(self
            .state
            .lock()
            .members
            .iter()
            .filter(|m| m.clan_id == Some(group))
            .cloned()
            .collect())
    }

    async fn top_members(&self, limit: i64) -> StoreResult<Vec<Member>> {
        self.enter().await?;
        let mut members = self.state.lock().members.clone();
        members.sort_by(|a, b| b.bash_points.cmp(&a.bash_points).then(a.id.cmp(&b.id)));
        members.truncate(limit.max(0) as usize);
        Ok(members)
    }

    async fn find_ledger_entry(&self, reward_key: &str) -> StoreResult<Option<LedgerEntry>> {
        self.enter().await?;
        Ok(self
            .state
            .lock()
            .ledger
            .iter()
            .find(|e| e.description == reward_key)
            .cloned())
    }

    async fn insert_ledger_entry(&self, entry: &NewLedgerEntry) -> StoreResult<()> {
        self.enter().await?;
        let mut state = self.state.lock();
        if state.ledger.iter().any(|e| e.description == entry.description) {
            return Err(StoreError::UniqueViolation("points_description_key".into()));
        }
        let id = state.ledger.len() as i64 + 1;
        state.ledger.push(LedgerEntry {
            id,
            member_id: entry.member_id,
            organiser_id: entry.organiser_id,
            points: entry.points,
            updated_at: entry.updated_at,
            description: entry.description.clone(),
        });
        Ok(())
    }

    async fn describe_members(&self) -> StoreResult<TableSample> {
        self.enter().await?;
        let sample = self.state.lock().members.first().map(|m| {
            serde_json::json!({
                "id": m.id.0,
                "name": m.name,
                "discord_username": m.discord_username,
                "title": m.title,
                "clan_id": m.clan_id.map(|c| c.0),
                "bash_points": m.bash_points,
            })
        });
        Ok(TableSample {
            columns: [
                "id",
                "name",
                "discord_username",
                "title",
                "clan_id",
                "bash_points",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            sample,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> NewLedgerEntry {
        NewLedgerEntry {
            member_id: MemberId(1),
            organiser_id: MemberId(1),
            points: 3,
            updated_at: chrono::Utc::now(),
            description: key.into(),
        }
    }

    #[tokio::test]
    async fn second_insert_of_a_key_is_a_unique_violation() {
        let store = MemoryStore::new();
        store.add_member("maix", None, None, 0);
        store.insert_ledger_entry(&entry("CG-BC1-13Nov25")).await.unwrap();
        let err = store
            .insert_ledger_entry(&entry("CG-BC1-13Nov25"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(store.ledger_entries_for("CG-BC1-13Nov25"), 1);
    }

    #[tokio::test]
    async fn compare_and_set_only_writes_the_expected_balance() {
        let store = MemoryStore::new();
        let id = store.add_member("maix", None, None, 10);
        assert_eq!(store.compare_and_set_balance(id, 9, 11).await.unwrap(), 0);
        assert_eq!(store.compare_and_set_balance(id, 10, 11).await.unwrap(), 1);
        assert_eq!(store.balance(id), Some(11));
    }

    #[tokio::test]
    async fn handle_lookup_ignores_case() {
        let store = MemoryStore::new();
        store.add_member("Maix", None, None, 0);
        assert!(store.member_by_handle("mAIX").await.unwrap().is_some());
        assert!(store.member_by_handle("other").await.unwrap().is_none());
    }
}
