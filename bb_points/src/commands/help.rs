use crate::processor::Reply;

pub fn run(prefix: &str, captain_title: &str) -> Reply {
    Ok(Some(format!(
        "**Available Commands:**
• `{p}checkdb` - Check database connection
• `{p}mypoints` - Check your bash points
• `{p}listusers` - Show top members
• `{p}cg` or `{p}clangathering` - Award clan gathering points ({t} only)
• `{p}debugschema` - Debug schema and table info
• `{p}help` - Show this message

**Clan Gathering:**
Captains can award points by using `{p}cg` followed by a date, or just typing the date.
Example: `{p}cg 13 Nov` or just `13 Nov 2025`",
        p = prefix,
        t = captain_title
    )))
}
