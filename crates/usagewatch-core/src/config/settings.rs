use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Usage tracker control server")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Web server port
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Usage log written by the tracker
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve simulated tracker samples instead of supervising a real tracker
    Demo,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if running in demo mode
    pub fn is_demo_mode(&self) -> bool {
        matches!(self.command, Some(Command::Demo))
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Live usage log written by the tracker
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Aggregated stats file; derived from `data_file` when unset
    #[serde(default)]
    pub stats_file: Option<PathBuf>,

    /// Directory receiving backups; the usage log's directory when unset
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,

    /// External tracker process settings
    #[serde(default)]
    pub tracker: TrackerSettings,

    /// Web server settings
    #[serde(default)]
    pub web: WebSettings,

    /// Demo mode settings
    #[serde(default)]
    pub demo: DemoSettings,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("app_usage_log.json")
}

/// External tracker process settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Program to launch (e.g. "python")
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,

    /// How often to check whether the tracker exited on its own (milliseconds)
    #[serde(default = "default_liveness_interval")]
    pub liveness_interval_ms: u64,
}

fn default_liveness_interval() -> u64 {
    1000
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            liveness_interval_ms: default_liveness_interval(),
        }
    }
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSettings {
    /// Web server port
    #[serde(default = "default_web_port")]
    pub port: u16,

    /// Interval for SSE keep-alive comments; none are sent when unset
    #[serde(default)]
    pub sse_keep_alive_secs: Option<u64>,
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            sse_keep_alive_secs: None,
        }
    }
}

/// Demo mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSettings {
    /// Run with simulated samples instead of a real tracker
    #[serde(default)]
    pub enabled: bool,

    /// Interval between simulated samples (milliseconds)
    #[serde(default = "default_demo_interval")]
    pub interval_ms: u64,
}

fn default_demo_interval() -> u64 {
    5000
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_demo_interval(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            stats_file: None,
            backup_dir: None,
            tracker: TrackerSettings::default(),
            web: WebSettings::default(),
            demo: DemoSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::from_file(p);
            }
        }

        let default_paths = [
            dirs::config_dir().map(|p| p.join("usagewatch/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/usagewatch/config.toml")),
            dirs::home_dir().map(|p| p.join(".usagewatch.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(port) = cli.port {
            self.web.port = port;
        }
        if let Some(data_file) = &cli.data_file {
            self.data_file = data_file.clone();
        }
        if cli.is_demo_mode() {
            self.demo.enabled = true;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Clamps timer intervals so a zero in the config file cannot spin a task.
    pub fn validate(&mut self) {
        const MIN_INTERVAL_MS: u64 = 10;

        if self.tracker.liveness_interval_ms < MIN_INTERVAL_MS {
            self.tracker.liveness_interval_ms = MIN_INTERVAL_MS;
        }
        if self.demo.interval_ms < MIN_INTERVAL_MS {
            self.demo.interval_ms = MIN_INTERVAL_MS;
        }
        if self.tracker.command.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.tracker.command = None;
        }
    }

    /// Path of the aggregated stats file
    ///
    /// `app_usage_log.json` pairs with `app_usage_log.stats.json`.
    pub fn stats_file(&self) -> PathBuf {
        if let Some(p) = &self.stats_file {
            return p.clone();
        }
        let stem = self
            .data_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app_usage_log".to_string());
        self.data_file.with_file_name(format!("{}.stats.json", stem))
    }

    /// Directory that receives backup copies of the usage log
    pub fn backup_dir(&self) -> PathBuf {
        if let Some(dir) = &self.backup_dir {
            return dir.clone();
        }
        match self.data_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
