use std::fmt;

use chrono::{DateTime, Datelike, Local, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Application category assigned from the executable name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppCategory {
    Development,
    Browser,
    Communication,
    Media,
    Office,
    Gaming,
    System,
    Utilities,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Known executables per category, matched case-insensitively
const CATEGORY_TABLE: &[(AppCategory, &[&str])] = &[
    (
        AppCategory::Development,
        &[
            "code.exe",
            "devenv.exe",
            "sublime_text.exe",
            "atom.exe",
            "notepad++.exe",
            "pycharm64.exe",
            "intellij.exe",
        ],
    ),
    (
        AppCategory::Browser,
        &[
            "chrome.exe",
            "firefox.exe",
            "msedge.exe",
            "opera.exe",
            "safari.exe",
            "brave.exe",
        ],
    ),
    (
        AppCategory::Communication,
        &[
            "teams.exe",
            "slack.exe",
            "discord.exe",
            "zoom.exe",
            "skype.exe",
            "whatsapp.exe",
        ],
    ),
    (
        AppCategory::Media,
        &[
            "vlc.exe",
            "spotify.exe",
            "itunes.exe",
            "photoshop.exe",
            "premiere.exe",
            "gimp.exe",
        ],
    ),
    (
        AppCategory::Office,
        &[
            "winword.exe",
            "excel.exe",
            "powerpoint.exe",
            "outlook.exe",
            "onenote.exe",
        ],
    ),
    (
        AppCategory::Gaming,
        &[
            "steam.exe",
            "epicgameslauncher.exe",
            "origin.exe",
            "battle.net.exe",
            "roblox.exe",
        ],
    ),
    (
        AppCategory::System,
        &[
            "explorer.exe",
            "taskmgr.exe",
            "cmd.exe",
            "powershell.exe",
            "services.exe",
        ],
    ),
    (
        AppCategory::Utilities,
        &[
            "calculator.exe",
            "notepad.exe",
            "mspaint.exe",
            "snipping.exe",
            "winrar.exe",
        ],
    ),
];

impl AppCategory {
    /// Categorize an application by its executable name
    pub fn from_app_name(app_name: &str) -> Self {
        let lower = app_name.to_lowercase();
        CATEGORY_TABLE
            .iter()
            .find(|(_, apps)| apps.contains(&lower.as_str()))
            .map(|(category, _)| *category)
            .unwrap_or(AppCategory::Unknown)
    }

    /// Productivity score (1-10) attributed to time spent in this category
    pub fn productivity_score(&self) -> u8 {
        match self {
            AppCategory::Development => 9,
            AppCategory::Office => 8,
            AppCategory::Utilities => 7,
            AppCategory::Communication | AppCategory::System => 6,
            AppCategory::Browser | AppCategory::Unknown => 5,
            AppCategory::Media => 4,
            AppCategory::Gaming => 2,
        }
    }

    /// Lowercase name as written in usage logs
    pub fn as_str(&self) -> &'static str {
        match self {
            AppCategory::Development => "development",
            AppCategory::Browser => "browser",
            AppCategory::Communication => "communication",
            AppCategory::Media => "media",
            AppCategory::Office => "office",
            AppCategory::Gaming => "gaming",
            AppCategory::System => "system",
            AppCategory::Utilities => "utilities",
            AppCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AppCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse time-of-day bucket for a session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket an hour of day (0-23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// Calendar context attached to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub day_of_week: String,
    pub hour: u32,
    pub is_weekend: bool,
    pub time_of_day: TimeOfDay,
}

impl SessionMetadata {
    /// Derive metadata from a session start in local time
    pub fn from_start(start: &DateTime<Local>) -> Self {
        let weekday = start.weekday();
        Self {
            day_of_week: weekday_name(weekday).to_string(),
            hour: start.hour(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            time_of_day: TimeOfDay::from_hour(start.hour()),
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Foreground application session as last reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub app_name: String,
    /// Session start (RFC 3339)
    pub start: DateTime<Utc>,
    pub window_title: String,
    pub pid: u32,
    pub category: AppCategory,
    pub productivity_score: Option<u8>,
    /// Idle seconds within the session
    pub idle_time: u64,
    pub switch_count: u32,
    pub metadata: SessionMetadata,
}

/// Host metrics sampled alongside the current session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub active_app: String,
    pub window_title: String,
    pub switch_count: u32,
    pub uptime_seconds: u64,
    /// Rolling productivity percentage (0-100)
    pub productivity_score: u8,
}

/// Last-known tracker status, streamed to dashboard clients as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStatus {
    pub is_running: bool,
    pub current_session: Option<Session>,
    pub system_metrics: Option<SystemMetrics>,
    pub last_update: DateTime<Utc>,
}

impl TrackerStatus {
    /// Stopped status with no session data
    pub fn new() -> Self {
        Self {
            is_running: false,
            current_session: None,
            system_metrics: None,
            last_update: Utc::now(),
        }
    }
}

impl Default for TrackerStatus {
    fn default() -> Self {
        Self::new()
    }
}
