use serenity::prelude::TypeMapKey;

pub struct DatabaseKey;

impl TypeMapKey for DatabaseKey {
    type Value = sqlx::PgPool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
#[sqlx(transparent)]
pub struct MemberId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
#[sqlx(transparent)]
pub struct GroupId(pub i64);

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of the `members` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub name: Option<String>,
    pub discord_username: String,
    pub title: Option<String>,
    pub clan_id: Option<GroupId>,
    /// `NULL` in the table is read as 0
    pub bash_points: i64,
}

impl Member {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.discord_username,
        }
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.title
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(title))
            .unwrap_or(false)
    }
}

/// A row of the `points` table, the award ledger
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub member_id: MemberId,
    pub organiser_id: MemberId,
    pub points: i64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub member_id: MemberId,
    pub organiser_id: MemberId,
    pub points: i64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// The reward key, unique over the whole table
    pub description: String,
}

/// Column names and one sample row of a table, used by `!debugschema`
#[derive(Debug, Clone, PartialEq)]
pub struct TableSample {
    pub columns: Vec<String>,
    pub sample: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: Option<&str>, title: Option<&str>) -> Member {
        Member {
            id: MemberId(1),
            name: name.map(String::from),
            discord_username: "maix".into(),
            title: title.map(String::from),
            clan_id: None,
            bash_points: 0,
        }
    }

    #[test]
    fn display_name_falls_back_to_handle() {
        assert_eq!(member(Some("Maix"), None).display_name(), "Maix");
        assert_eq!(member(Some(""), None).display_name(), "maix");
        assert_eq!(member(None, None).display_name(), "maix");
    }

    #[test]
    fn title_check_ignores_case() {
        assert!(member(None, Some("captain BASH")).has_title("Captain Bash"));
        assert!(!member(None, Some("Member")).has_title("Captain Bash"));
        assert!(!member(None, None).has_title("Captain Bash"));
    }
}
