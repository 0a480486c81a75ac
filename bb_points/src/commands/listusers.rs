use bb_database::Store;

use crate::processor::Reply;

/// The `limit` members with the most points
pub async fn run(store: &dyn Store, limit: i64) -> Reply {
    let members = match store.top_members(limit).await {
        Ok(members) => members,
        Err(e) => both_err!(
            format!("❌ Error: {}", e),
            format!("listusers failed: {:?}", e)
        ),
    };
    if members.is_empty() {
        return Ok(Some("📋 No members found in database.".into()));
    }
    let list = members
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{}. **{}**: {} points", i + 1, m.display_name(), m.bash_points))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Some(format!("📋 **Top Members:**\n{}", list)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::text;
    use bb_database::memory::MemoryStore;

    #[tokio::test]
    async fn lists_by_balance() {
        let store = MemoryStore::new();
        store.add_member("low", None, None, 1);
        store.add_member("high", None, None, 30);
        store.add_member("mid", None, None, 7);
        assert_eq!(
            text(run(&store, 2).await),
            "📋 **Top Members:**\n1. **high**: 30 points\n2. **mid**: 7 points"
        );
    }

    #[tokio::test]
    async fn negative_limit_lists_nobody() {
        let store = MemoryStore::new();
        store.add_member("high", None, None, 30);
        assert_eq!(
            text(run(&store, -5).await),
            "📋 No members found in database."
        );
    }

    #[tokio::test]
    async fn empty_table() {
        let store = MemoryStore::new();
        assert_eq!(
            text(run(&store, 10).await),
            "📋 No members found in database."
        );
    }
}
