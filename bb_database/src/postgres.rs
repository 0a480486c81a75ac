use crate::shared::{GroupId, LedgerEntry, Member, MemberId, NewLedgerEntry, TableSample};
use crate::store::{Store, StoreResult};

const MEMBER_COLUMNS: &str =
    "id, name, discord_username, title, clan_id, COALESCE(bash_points, 0) AS bash_points";

/// [`Store`] backed by the PostgreSQL pool stored under [`crate::shared::DatabaseKey`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: sqlx::PgPool,
}

impl PgStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[serenity::async_trait]
impl Store for PgStore {
    async fn count_members(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn member_by_handle(&self, handle: &str) -> StoreResult<Option<Member>> {
        let query = format!(
            "SELECT {} FROM members WHERE lower(discord_username) = lower($1::text) ORDER BY id LIMIT 1",
            MEMBER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Member>(&query)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn member_balance(&self, id: MemberId) -> StoreResult<Option<i64>> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(bash_points, 0) FROM members WHERE id = $1::int8",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_balance(&self, id: MemberId, balance: i64) -> StoreResult<u64> {
        let res = sqlx::query("UPDATE members SET bash_points = $1::int8 WHERE id = $2::int8")
            .bind(balance)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn compare_and_set_balance(
        &self,
        id: MemberId,
        expected: i64,
        balance: i64,
    ) -> StoreResult<u64> {
        let res = sqlx::query(
            "UPDATE members SET bash_points = $1::int8 WHERE id = $2::int8 AND COALESCE(bash_points, 0) = $3::int8",
        )
        .bind(balance)
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn group_name(&self, group: GroupId) -> StoreResult<Option<String>> {
        Ok(
            sqlx::query_scalar::<_, String>("SELECT clan_name FROM clans WHERE id = $1::int8")
                .bind(group)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn group_members(&self, group: GroupId) -> StoreResult<Vec<Member>> {
        let query = format!(
            "SELECT {} FROM members WHERE clan_id = $1::int8 ORDER BY id",
            MEMBER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Member>(&query)
            .bind(group)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn top_members(&self, limit: i64) -> StoreResult<Vec<Member>> {
        let query = format!(
            "SELECT {} FROM members ORDER BY COALESCE(bash_points, 0) DESC, id LIMIT $1::int8",
            MEMBER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Member>(&query)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_ledger_entry(&self, reward_key: &str) -> StoreResult<Option<LedgerEntry>> {
        Ok(sqlx::query_as::<_, LedgerEntry>(
            "SELECT id, member_id, organiser_id, points, updated_at, description FROM points WHERE description = $1::text LIMIT 1",
        )
        .bind(reward_key)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_ledger_entry(&self, entry: &NewLedgerEntry) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO points (member_id, organiser_id, points, updated_at, description) VALUES ($1::int8, $2::int8, $3::int8, $4, $5::text)",
        )
        .bind(entry.member_id)
        .bind(entry.organiser_id)
        .bind(entry.points)
        .bind(entry.updated_at)
        .bind(&entry.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn describe_members(&self) -> StoreResult<TableSample> {
        let columns = sqlx::query_scalar::<_, String>(
            "SELECT column_name::text FROM information_schema.columns WHERE table_name = 'members' ORDER BY ordinal_position",
        )
        .fetch_all(&self.pool)
        .await?;
        let sample = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT to_jsonb(m) FROM members m ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(TableSample {
            columns,
            sample,
        })
    }
}
