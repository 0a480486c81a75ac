use crate::shared::{GroupId, LedgerEntry, Member, MemberId, NewLedgerEntry, TableSample};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A row with the same unique key is already there
    #[error("duplicate key value violates unique constraint \"{0}\"")]
    UniqueViolation(String),
    #[error("{0}")]
    Database(#[source] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A row the operation relies on is not there (anymore)
    #[error("{0} not found")]
    Missing(String),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation(db.constraint().unwrap_or("unknown").to_string());
            }
        }
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every operation the bot needs from the database.
///
/// Each call is a suspension point: other message handlers may run in between two
/// calls, so nothing read here can be assumed unchanged by the time of the next call.
#[serenity::async_trait]
pub trait Store: Send + Sync {
    async fn count_members(&self) -> StoreResult<i64>;

    /// Case-insensitive exact match on `discord_username`
    async fn member_by_handle(&self, handle: &str) -> StoreResult<Option<Member>>;

    async fn member_balance(&self, id: MemberId) -> StoreResult<Option<i64>>;

    /// Unconditional write, returns the number of rows touched
    async fn set_balance(&self, id: MemberId, balance: i64) -> StoreResult<u64>;

    /// Writes `balance` only if the stored balance is still `expected`.
    /// Returns the number of rows touched, 0 meaning someone else wrote first.
    async fn compare_and_set_balance(
        &self,
        id: MemberId,
        expected: i64,
        balance: i64,
    ) -> StoreResult<u64>;

    async fn group_name(&self, group: GroupId) -> StoreResult<Option<String>>;

    async fn group_members(&self, group: GroupId) -> StoreResult<Vec<Member>>;

    /// Members ordered by balance, highest first
    async fn top_members(&self, limit: i64) -> StoreResult<Vec<Member>>;

    async fn find_ledger_entry(&self, reward_key: &str) -> StoreResult<Option<LedgerEntry>>;

    /// Fails with [`StoreError::UniqueViolation`] when the reward key is already used
    async fn insert_ledger_entry(&self, entry: &NewLedgerEntry) -> StoreResult<()>;

    async fn describe_members(&self) -> StoreResult<TableSample>;
}
