use bb_database::shared::Member;
use chrono::{DateTime, Datelike, Utc};

use crate::classifier::AwardDate;
use crate::ledger::{AwardError, AwardLedger, Forbidden, GroupOutcome};
use crate::processor::Reply;
use crate::shared::PointsConfig;

pub const FORMAT_HELP: &str = "❌ **Requested Date Format:**
Please include a date in your message in one of these formats:
• `13 Nov`
• `13 Nov 2025`
• `:date: 13 Nov 2025`
• `date: 13 Nov`";

/// `!cg <date>`: the author awards the clan gathering points to their whole clan
pub async fn run(
    ledger: &AwardLedger,
    config: &PointsConfig,
    handle: &str,
    date: Option<&AwardDate>,
    now: DateTime<Utc>,
) -> Reply {
    let date = match date {
        Some(date) => date,
        None => message_err!(FORMAT_HELP),
    };
    reply(ledger.award_group(handle, date, now).await, config, date, now)
}

/// A date typed without a command. Only captains trigger anything here, everyone
/// else is ignored without a word.
pub async fn implicit(
    ledger: &AwardLedger,
    config: &PointsConfig,
    author: &Member,
    date: &AwardDate,
    now: DateTime<Utc>,
) -> Reply {
    debug!(
        "Date detected: {} from user: {}",
        date.raw, author.discord_username
    );
    match ledger.award_group_as(author, date, now).await {
        Err(AwardError::Forbidden(reason)) => {
            debug!("Ignoring date from {}: {}", author.discord_username, reason);
            Ok(None)
        }
        outcome => reply(outcome, config, date, now),
    }
}

fn reply(
    outcome: Result<GroupOutcome, AwardError>,
    config: &PointsConfig,
    date: &AwardDate,
    now: DateTime<Utc>,
) -> Reply {
    let label = date.label(now.year());
    match outcome {
        Ok(GroupOutcome::Awarded {
            group_name,
            points,
            report,
            ..
        }) => {
            let mut text = format!(
                "🎉 Your clan members awarded **{} points** for **{}**'s clan gathering. Keep rocking **{}**! 🚀\n\n✅ Awarded: {} members",
                points, label, group_name, report.success
            );
            if report.is_partial() {
                text.push_str(&format!("\n❌ Failed: {} members", report.failed));
            }
            Ok(Some(text))
        }
        Ok(GroupOutcome::AlreadyAwarded {
            group_name, prior, ..
        }) => {
            let mut text = format!(
                "❌ Points for **{}** have already been awarded to **{}**.",
                label, group_name
            );
            if let Some(prior) = prior {
                text.push_str(&format!(
                    " (on {})",
                    prior.format("%d %b %Y at %H:%M UTC")
                ));
            }
            Ok(Some(text))
        }
        Ok(GroupOutcome::InFlight { .. }) => Ok(None),
        Err(AwardError::NotRegistered(_)) => {
            message_err!("❌ You are not registered in the database.")
        }
        Err(AwardError::Forbidden(Forbidden::NotCaptain)) => message_err!(format!(
            "❌ Only members with \"{}\" title can award clan gathering points.",
            config.captain_title
        )),
        Err(AwardError::Forbidden(Forbidden::NoClan)) => {
            message_err!("❌ You are not assigned to any clan.")
        }
        Err(AwardError::NoRecipients(_)) => message_err!("❌ No clan members found."),
        Err(e @ AwardError::Persistence { .. }) => both_err!(
            format!("❌ Error {}", e),
            format!("Clan gathering for {} failed: {:?}", label, e)
        ),
    }
}
