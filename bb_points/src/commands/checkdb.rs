use bb_database::Store;

use crate::processor::Reply;

/// Store connectivity and member count
pub async fn run(store: &dyn Store) -> Reply {
    match store.count_members().await {
        Ok(count) => Ok(Some(format!(
            "✅ Database connected! Total members: {}",
            count
        ))),
        Err(e) => both_err!(
            format!("❌ Database error: {}", e),
            format!("checkdb failed: {:?}", e)
        ),
    }
}
