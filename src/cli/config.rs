use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::backend::backend_model::SessionInfo;
use crate::gesture::gesture_model::GestureThresholds;
use crate::overlay::highlight::HighlightStyle;
use crate::refresh::scheduler::RefreshTiming;

pub const DEFAULT_CONFIG_PATH: &str = "collect-console.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "collect-console",
    version,
    about = "Operator console for collecting labelled mobile UI actions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Collection server URL
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Path to config file (default: collect-console.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append dispatched actions to this JSONL trace file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one snapshot and list its elements
    Snapshot {
        /// Only list clickable elements
        #[arg(long, default_value_t = false)]
        clickable: bool,
    },

    /// Report the clickable element under a source-pixel position
    HitTest {
        #[arg(long)]
        x: f64,

        #[arg(long)]
        y: f64,
    },

    /// Tap at a source-pixel position
    Tap {
        #[arg(long)]
        x: i32,

        #[arg(long)]
        y: i32,
    },

    /// Swipe between two source-pixel positions
    Swipe {
        #[arg(long)]
        start_x: i32,

        #[arg(long)]
        start_y: i32,

        #[arg(long)]
        end_x: i32,

        #[arg(long)]
        end_y: i32,
    },

    /// Replay a display-space press/release through mapping and classification
    Gesture {
        /// Press position as "x,y" in display pixels
        #[arg(long)]
        from: String,

        /// Release position as "x,y" in display pixels
        #[arg(long)]
        to: String,

        /// Time between press and release
        #[arg(long, default_value_t = 300)]
        duration_ms: u64,

        /// Displayed image size as "WIDTHxHEIGHT"
        #[arg(long)]
        display: String,
    },

    /// Type text on the device
    Input {
        #[arg(long)]
        text: String,
    },

    /// Show the actions recorded for the current task
    History,

    /// Start a collection session
    Begin {
        #[command(flatten)]
        task: TaskArgs,
    },

    /// Save the current task and end the session
    End,

    /// Save the current task and start another for the same app
    Next {
        #[command(flatten)]
        task: TaskArgs,
    },

    /// Delete the current task's data and start over
    Discard {
        #[command(flatten)]
        task: TaskArgs,
    },

    /// Begin a session and run continuous refresh for a while, logging
    /// every installed snapshot
    Watch {
        #[command(flatten)]
        task: TaskArgs,

        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
}

/// Task announced to the collection server.
#[derive(Args, Debug, Clone)]
pub struct TaskArgs {
    #[arg(long)]
    pub app: String,

    #[arg(long)]
    pub task_type: String,

    #[arg(long)]
    pub description: String,
}

impl From<TaskArgs> for SessionInfo {
    fn from(args: TaskArgs) -> Self {
        SessionInfo {
            app_name: args.app,
            task_type: args.task_type,
            description: args.description,
        }
    }
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `collect-console.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub gesture: GestureThresholds,
    #[serde(default)]
    pub refresh: RefreshTiming,
    #[serde(default)]
    pub highlight: HighlightStyle,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_backend_url() -> String { "http://localhost:9000".to_string() }
fn default_timeout_secs() -> u64 { 30 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> ConsoleConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => ConsoleConfig::default(),
    }
}

/// Apply CLI overrides on top of the file config (CLI > config > defaults).
pub fn resolve_config(cli: &Cli, mut config: ConsoleConfig) -> ConsoleConfig {
    if let Some(url) = &cli.backend {
        config.backend.url = url.clone();
    }
    if let Some(path) = &cli.trace {
        config.trace.path = Some(path.clone());
    }
    config
}

/// `tracing` filter directive for a `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

/// Parse "x,y" into a pair of display coordinates.
pub fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got '{}'", raw))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x in '{}': {}", raw, e))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y in '{}': {}", raw, e))?;
    Ok((x, y))
}

/// Parse "WIDTHxHEIGHT".
pub fn parse_size(raw: &str) -> Result<(f64, f64), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected \"WIDTHxHEIGHT\", got '{}'", raw))?;
    let w = w.trim().parse::<f64>().map_err(|e| format!("bad width in '{}': {}", raw, e))?;
    let h = h.trim().parse::<f64>().map_err(|e| format!("bad height in '{}': {}", raw, e))?;
    Ok((w, h))
}
