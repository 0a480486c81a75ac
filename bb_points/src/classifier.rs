use bb_database::shared::{GroupId, MemberId};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// `13 Nov`, `13nov 2025`, `date: 5 DEC`, `:date: 5 Dec 2030`...
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?::?date:?\s*)?([0-9]{1,2})\s*(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)(?:\s*([0-9]{4}))?",
    )
    .expect("date pattern is valid")
});

/// A date found in a message, kept as the user typed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardDate {
    pub raw: String,
    /// `5` and `05` are kept apart, the day goes into the reward key as typed
    pub day: String,
    pub month: chrono::Month,
    pub year: Option<String>,
}

impl AwardDate {
    pub fn find(content: &str) -> Option<Self> {
        let caps = DATE_PATTERN.captures(content)?;
        let month = caps.get(2)?.as_str().parse::<chrono::Month>().ok()?;
        Some(Self {
            raw: caps.get(0)?.as_str().to_string(),
            day: caps.get(1)?.as_str().to_string(),
            month,
            year: caps.get(3).map(|y| y.as_str().to_string()),
        })
    }

    /// `Nov`, `Dec`...
    pub fn month_abbrev(&self) -> &'static str {
        &self.month.name()[..3]
    }

    /// Last two digits of the typed year, or of `current_year` when none was typed
    pub fn short_year(&self, current_year: i32) -> String {
        let year = self
            .year
            .as_deref()
            .and_then(|y| y.parse::<i32>().ok())
            .unwrap_or(current_year);
        format!("{:02}", year.rem_euclid(100))
    }

    /// `13 Nov 2025`, used in replies
    pub fn label(&self, current_year: i32) -> String {
        format!(
            "{} {} {}",
            self.day,
            self.month_abbrev(),
            self.year
                .clone()
                .unwrap_or_else(|| current_year.to_string())
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CheckDb,
    MyPoints,
    ListUsers,
    /// `None` when the message holds no date we can read
    ClanGathering(Option<AwardDate>),
    DebugSchema,
    Help,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The message starts with the prefix, nothing else looks at it
    Command(Command),
    /// A date typed without a command, a clan gathering if the author is a captain
    GroupAwardCandidate(AwardDate),
    NoEvent,
}

pub fn classify(content: &str, prefix: &str) -> Classification {
    if !prefix.is_empty() && content.starts_with(prefix) {
        let token = content
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let name = token.strip_prefix(prefix).unwrap_or(&token);
        let command = match name {
            "checkdb" => Command::CheckDb,
            "mypoints" => Command::MyPoints,
            "listusers" => Command::ListUsers,
            "cg" | "clangathering" => Command::ClanGathering(AwardDate::find(content)),
            "debugschema" => Command::DebugSchema,
            "help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        };
        return Classification::Command(command);
    }
    match AwardDate::find(content) {
        Some(date) => Classification::GroupAwardCandidate(date),
        None => Classification::NoEvent,
    }
}

/// `CG-BC<group>-<day><Mon><yy>`, one clan gathering per group and date
pub fn group_reward_key(group: GroupId, date: &AwardDate, current_year: i32) -> String {
    format!(
        "CG-BC{}-{}{}{}",
        group,
        date.day,
        date.month_abbrev(),
        date.short_year(current_year)
    )
}

/// `DP'<yyyy-mm-dd>'<member>`, one daily award per member and date
pub fn daily_reward_key(subject: MemberId, day: NaiveDate) -> String {
    format!(
        "DP'{:04}-{:02}-{:02}'{}",
        day.year(),
        day.month(),
        day.day(),
        subject
    )
}
