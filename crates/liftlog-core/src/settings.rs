use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::duration::{DurationPolicy, DEFAULT_MAX_SESSION_MINUTES};
use crate::error::{LiftlogError, Result};

/// Default number of workout days per week.
pub const DEFAULT_WEEKLY_GOAL: u32 = 3;
/// Default per-session volume increase goal, in percent.
pub const DEFAULT_VOLUME_INCREASE_GOAL: f64 = 5.0;
/// Default target session length, in minutes.
pub const DEFAULT_SESSION_LENGTH_GOAL: u32 = 60;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Workout log dashboard: per-day and per-month training statistics
#[derive(Parser, Debug, Clone)]
#[command(
    name = "liftlog",
    about = "Workout log dashboard: per-day and per-month training statistics",
    version
)]
pub struct Settings {
    /// View mode
    #[arg(long, default_value = "summary", value_parser = ["summary", "json", "watch", "serve"])]
    pub view: String,

    /// Workout CSV file, or a directory holding exported CSVs
    #[arg(long, env = "CSV_FILE_PATH")]
    pub csv_file_path: Option<PathBuf>,

    /// Longest plausible session in hours; longer durations are ignored
    #[arg(long, env = "MAX_SESSION_DURATION_HOURS")]
    pub max_session_duration_hours: Option<f64>,

    /// Workout days per week goal
    #[arg(long, env = "WEEKLY_WORKOUT_GOAL")]
    pub weekly_goal: Option<u32>,

    /// Per-session volume increase goal (percent)
    #[arg(long, env = "VOLUME_INCREASE_GOAL")]
    pub volume_increase_goal: Option<f64>,

    /// Which duration to keep when a day logs several
    #[arg(long, default_value = "longest", value_parser = ["longest", "shortest", "mean"])]
    pub duration_policy: String,

    /// Year of the reported month (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Reported month, 1-12 (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Timezone used to decide "today" (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Refresh rate in seconds for the watch view (1-3600)
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=3600))]
    pub refresh_rate: u32,

    /// Listen address for the serve view
    #[arg(long, default_value = "127.0.0.1:3000", env = "LIFTLOG_BIND")]
    pub bind: String,

    /// User settings file (goals and filtering)
    #[arg(long)]
    pub settings_file: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── UserSettings ───────────────────────────────────────────────────────────────

/// Training goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Goals {
    pub weekly_workout_goal: u32,
    pub volume_increase_percentage_goal: f64,
    pub session_length_goal_in_minutes: u32,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            weekly_workout_goal: DEFAULT_WEEKLY_GOAL,
            volume_increase_percentage_goal: DEFAULT_VOLUME_INCREASE_GOAL,
            session_length_goal_in_minutes: DEFAULT_SESSION_LENGTH_GOAL,
        }
    }
}

/// Input filtering rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Filtering {
    pub max_session_length_in_minutes: u32,
}

impl Default for Filtering {
    fn default() -> Self {
        Self {
            max_session_length_in_minutes: DEFAULT_MAX_SESSION_MINUTES,
        }
    }
}

/// Persisted user preferences, saved to `~/.liftlog/user_settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub goals: Goals,
    pub filtering: Filtering,
}

impl UserSettings {
    /// Return the default path to the persisted settings file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the settings path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".liftlog").join("user_settings.json")
    }

    /// Load settings from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable user settings");
            Self::default()
        })
    }

    /// Reject values the dashboard cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.filtering.max_session_length_in_minutes == 0 {
            return Err(LiftlogError::Config(
                "MaxSessionLengthInMinutes must be greater than zero".to_string(),
            ));
        }
        let pct = self.goals.volume_increase_percentage_goal;
        if !pct.is_finite() || pct < 0.0 {
            return Err(LiftlogError::Config(
                "VolumeIncreasePercentageGoal must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate, then atomically write settings to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }
}

// ── DashboardConfig ────────────────────────────────────────────────────────────

/// Effective configuration for one dashboard computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub max_session_minutes: u32,
    pub duration_policy: DurationPolicy,
    pub weekly_goal: u32,
    pub volume_increase_goal: f64,
    pub session_length_goal: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_user_settings(&UserSettings::default())
    }
}

impl DashboardConfig {
    /// Configuration taken entirely from persisted user settings.
    pub fn from_user_settings(user: &UserSettings) -> Self {
        Self {
            max_session_minutes: user.filtering.max_session_length_in_minutes,
            duration_policy: DurationPolicy::default(),
            weekly_goal: user.goals.weekly_workout_goal,
            volume_increase_goal: user.goals.volume_increase_percentage_goal,
            session_length_goal: user.goals.session_length_goal_in_minutes,
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments (and their environment fallbacks).
    pub fn load() -> Self {
        let mut settings = Settings::parse();
        settings.apply_debug();
        settings
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        settings.apply_debug();
        settings
    }

    /// Path of the user settings file in effect.
    pub fn user_settings_path(&self) -> PathBuf {
        self.settings_file
            .clone()
            .unwrap_or_else(UserSettings::config_path)
    }

    /// Merge explicit CLI / environment values over persisted user settings.
    ///
    /// Values given on the command line or through the environment win;
    /// anything left unset comes from `user`.
    pub fn dashboard_config(&self, user: &UserSettings) -> Result<DashboardConfig> {
        let mut config = DashboardConfig::from_user_settings(user);

        if let Some(hours) = self.max_session_duration_hours {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(LiftlogError::Config(format!(
                    "max session duration must be a positive number of hours, got {hours}"
                )));
            }
            config.max_session_minutes = (hours * 60.0).round() as u32;
        }
        if let Some(goal) = self.weekly_goal {
            config.weekly_goal = goal;
        }
        if let Some(goal) = self.volume_increase_goal {
            config.volume_increase_goal = goal;
        }
        config.duration_policy = self
            .duration_policy
            .parse()
            .map_err(LiftlogError::Config)?;

        Ok(config)
    }

    /// `--debug` overrides the log level.
    fn apply_debug(&mut self) {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        UserSettings::config_path_in(tmp.path())
    }

    // ── UserSettings persistence ─────────────────────────────────────────────

    #[test]
    fn test_user_settings_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let settings = UserSettings {
            goals: Goals {
                weekly_workout_goal: 4,
                volume_increase_percentage_goal: 2.5,
                session_length_goal_in_minutes: 75,
            },
            filtering: Filtering {
                max_session_length_in_minutes: 240,
            },
        };

        settings.save_to(&path).expect("save");
        let loaded = UserSettings::load_from(&path);

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_user_settings_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = UserSettings::load_from(&tmp_config_path(&tmp));
        assert_eq!(loaded, UserSettings::default());
        assert_eq!(loaded.goals.weekly_workout_goal, 3);
        assert_eq!(loaded.filtering.max_session_length_in_minutes, 360);
    }

    #[test]
    fn test_user_settings_default_when_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("user_settings.json");
        std::fs::write(&path, "{not json").expect("write");
        assert_eq!(UserSettings::load_from(&path), UserSettings::default());
    }

    #[test]
    fn test_user_settings_partial_file_fills_defaults() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("user_settings.json");
        std::fs::write(&path, r#"{"goals":{"WeeklyWorkoutGoal":5}}"#).expect("write");

        let loaded = UserSettings::load_from(&path);
        assert_eq!(loaded.goals.weekly_workout_goal, 5);
        assert_eq!(loaded.goals.volume_increase_percentage_goal, 5.0);
        assert_eq!(loaded.filtering.max_session_length_in_minutes, 360);
    }

    #[test]
    fn test_user_settings_json_shape() {
        let v = serde_json::to_value(UserSettings::default()).unwrap();
        assert_eq!(v["goals"]["WeeklyWorkoutGoal"], 3);
        assert_eq!(v["goals"]["SessionLengthGoalInMinutes"], 60);
        assert_eq!(v["filtering"]["MaxSessionLengthInMinutes"], 360);
    }

    #[test]
    fn test_user_settings_rejects_zero_ceiling() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let mut settings = UserSettings::default();
        settings.filtering.max_session_length_in_minutes = 0;

        let err = settings.save_to(&path).unwrap_err();
        assert!(matches!(err, LiftlogError::Config(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_user_settings_rejects_negative_goal() {
        let mut settings = UserSettings::default();
        settings.goals.volume_increase_percentage_goal = -1.0;
        assert!(settings.validate().is_err());
    }

    // ── Settings CLI ─────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["liftlog"]);

        assert_eq!(settings.view, "summary");
        assert_eq!(settings.duration_policy, "longest");
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.refresh_rate, 60);
        assert!(settings.year.is_none());
        assert!(settings.month.is_none());
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings = Settings::load_from_args(["liftlog", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_settings_month_range_checked() {
        assert!(Settings::try_parse_from(["liftlog", "--month", "13"]).is_err());
        assert!(Settings::try_parse_from(["liftlog", "--month", "0"]).is_err());
        let settings = Settings::parse_from(["liftlog", "--year", "2024", "--month", "2"]);
        assert_eq!(settings.year, Some(2024));
        assert_eq!(settings.month, Some(2));
    }

    #[test]
    fn test_settings_user_settings_path_override() {
        let settings =
            Settings::parse_from(["liftlog", "--settings-file", "/tmp/liftlog/settings.json"]);
        assert_eq!(
            settings.user_settings_path(),
            PathBuf::from("/tmp/liftlog/settings.json")
        );
    }

    // ── dashboard_config precedence ──────────────────────────────────────────

    #[test]
    fn test_dashboard_config_uses_user_settings_when_unset() {
        let settings = Settings::parse_from(["liftlog"]);
        let mut user = UserSettings::default();
        user.goals.weekly_workout_goal = 5;
        user.filtering.max_session_length_in_minutes = 180;

        // Guard against the test environment exporting the variables.
        if settings.weekly_goal.is_some() || settings.max_session_duration_hours.is_some() {
            return;
        }

        let config = settings.dashboard_config(&user).expect("config");
        assert_eq!(config.weekly_goal, 5);
        assert_eq!(config.max_session_minutes, 180);
        assert_eq!(config.duration_policy, DurationPolicy::Longest);
    }

    #[test]
    fn test_dashboard_config_cli_wins() {
        let settings = Settings::parse_from([
            "liftlog",
            "--weekly-goal",
            "4",
            "--max-session-duration-hours",
            "1.5",
            "--volume-increase-goal",
            "10",
            "--duration-policy",
            "mean",
        ]);
        let config = settings
            .dashboard_config(&UserSettings::default())
            .expect("config");

        assert_eq!(config.weekly_goal, 4);
        assert_eq!(config.max_session_minutes, 90);
        assert_eq!(config.volume_increase_goal, 10.0);
        assert_eq!(config.duration_policy, DurationPolicy::Mean);
    }

    #[test]
    fn test_dashboard_config_rejects_non_positive_ceiling() {
        let settings = Settings::parse_from(["liftlog", "--max-session-duration-hours", "0"]);
        let err = settings
            .dashboard_config(&UserSettings::default())
            .unwrap_err();
        assert!(matches!(err, LiftlogError::Config(_)));
    }

    #[test]
    fn test_dashboard_config_default() {
        let config = DashboardConfig::default();
        assert_eq!(config.max_session_minutes, 360);
        assert_eq!(config.weekly_goal, 3);
        assert_eq!(config.volume_increase_goal, 5.0);
        assert_eq!(config.session_length_goal, 60);
    }
}
