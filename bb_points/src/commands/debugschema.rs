use bb_database::Store;

use crate::processor::Reply;

const SAMPLE_LEN: usize = 200;

/// Columns and first row of the members table
pub async fn run(store: &dyn Store) -> Reply {
    let mut results = String::from("**Schema Debug Results:**\n\n**Members table:**");
    match store.describe_members().await {
        Ok(desc) => {
            let rows = usize::from(desc.sample.is_some());
            results.push_str(&format!("\n✅ Found {} rows", rows));
            if let Some(sample) = desc.sample {
                results.push_str(&format!("\n   **Columns:** {}", desc.columns.join(", ")));
                let sample: String = sample.to_string().chars().take(SAMPLE_LEN).collect();
                results.push_str(&format!("\n   **Sample data:** {}", sample));
            }
        }
        Err(e) => {
            warn!("debugschema failed: {:?}", e);
            results.push_str(&format!("\n❌ Error: {}", e));
        }
    }
    Ok(Some(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::text;
    use bb_database::memory::MemoryStore;

    #[tokio::test]
    async fn shows_columns_and_a_truncated_sample() {
        let store = MemoryStore::new();
        store.add_member(&"x".repeat(500), Some("Captain Bash"), None, 3);
        let out = text(run(&store).await);
        assert!(out.contains("✅ Found 1 rows"));
        assert!(out.contains("**Columns:** id, name, discord_username, title, clan_id, bash_points"));
        let sample = out.split("**Sample data:** ").nth(1).unwrap();
        assert_eq!(sample.chars().count(), SAMPLE_LEN);
    }

    #[tokio::test]
    async fn errors_are_part_of_the_report() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let out = text(run(&store).await);
        assert!(out.ends_with("❌ Error: store unavailable: connection refused"));
    }
}
