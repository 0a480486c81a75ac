use serde::{Deserialize, Serialize};

/// Runtime settings of the points module, stored in `bot_options` as `points.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    pub command_prefix: String,
    pub captain_title: String,
    pub clan_gathering_points: i64,
    pub daily_enabled: bool,
    pub daily_points: i64,
    /// How long a reward key stays blocked in the guard once its award is done
    pub guard_release_ms: u64,
    pub leaderboard_size: i64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            command_prefix: "!".into(),
            captain_title: "Captain Bash".into(),
            clan_gathering_points: 3,
            daily_enabled: true,
            daily_points: 1,
            guard_release_ms: 2000,
            leaderboard_size: 10,
        }
    }
}

impl bb_config::Config for PointsConfig {
    const KEY: &'static str = "points.json";
}

impl PointsConfig {
    pub fn guard_release(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.guard_release_ms)
    }
}
