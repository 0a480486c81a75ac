use bb_database::Store;

use crate::processor::Reply;

pub async fn run(store: &dyn Store, handle: &str) -> Reply {
    match store.member_by_handle(handle).await {
        Ok(Some(member)) => Ok(Some(format!(
            "📊 **{}** has **{}** bash points!",
            member.display_name(),
            member.bash_points
        ))),
        Ok(None) => message_err!(format!(
            "❌ Your Discord username ({}) is not registered in the database.",
            handle
        )),
        Err(e) => both_err!(
            format!("❌ Error: {}", e),
            format!("mypoints for `{}` failed: {:?}", handle, e)
        ),
    }
}
