use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEED: u64 = 2025;
const DEFAULT_AUTOPLAY_MS: u64 = 600;
const MIN_AUTOPLAY_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Log records are also appended here when set.
    pub log_file: Option<PathBuf>,
    /// Standings file; the bundled 2025 standings when unset.
    pub standings_path: Option<PathBuf>,
    pub seed: u64,
    /// Snapshot path override. See `App::snapshot_path` for the default.
    pub save_path: Option<PathBuf>,
    pub play_in_enabled: bool,
    pub autoplay_interval: Duration,
    /// Problems found while reading the environment. Logged once the
    /// logger is up.
    pub warnings: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            log_file: None,
            standings_path: None,
            seed: DEFAULT_SEED,
            save_path: None,
            play_in_enabled: true,
            autoplay_interval: Duration::from_millis(DEFAULT_AUTOPLAY_MS),
            warnings: Vec::new(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from a variable lookup. Blank values count as unset
    /// and unparsable ones fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        settings.standings_path = var("PLAYOFF_STANDINGS_JSON").map(PathBuf::from);
        settings.save_path = var("PLAYOFF_SAVE_PATH").map(PathBuf::from);
        settings.log_file = var("PLAYOFF_LOG_FILE").map(PathBuf::from);
        let mut warnings = Vec::new();

        if let Some(raw) = var("PLAYOFF_SEED") {
            match raw.parse() {
                Ok(seed) => settings.seed = seed,
                Err(_) => warnings.push(format!("PLAYOFF_SEED={raw} is not a number, using {DEFAULT_SEED}")),
            }
        }

        if let Some(raw) = var("PLAYOFF_SKIP_PLAY_IN") {
            match parse_flag(&raw) {
                Some(skip) => settings.play_in_enabled = !skip,
                None => warnings.push(format!("PLAYOFF_SKIP_PLAY_IN={raw} is not a boolean, keeping the play-in")),
            }
        }

        if let Some(raw) = var("PLAYOFF_AUTOPLAY_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => settings.autoplay_interval = Duration::from_millis(ms.max(MIN_AUTOPLAY_MS)),
                Err(_) => warnings.push(format!(
                    "PLAYOFF_AUTOPLAY_MS={raw} is not a number, using {DEFAULT_AUTOPLAY_MS}"
                )),
            }
        }

        if let Some(raw) = var("RUST_LOG") {
            match LevelFilter::from_str(&raw) {
                Ok(level) => settings.log_level = Some(level),
                Err(_) => warnings.push(format!("RUST_LOG={raw} is not a log level")),
            }
        }

        settings.warnings = warnings;
        settings
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
