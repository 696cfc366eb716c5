use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::http_client::DEFAULT_TIMEOUT_SECS;
use crate::names::normalize_player_name;
use crate::statsbomb::{DataSource, OPEN_DATA_BASE_URL};

pub const DEFAULT_COMPETITION_ID: u32 = 53;
pub const DEFAULT_SEASON_ID: u32 = 315;
pub const DEFAULT_MATCH_ID: u64 = 4020846;
pub const DEFAULT_PLAYER: &str = "Alex Greenwood";
pub const DEFAULT_COMPARE_PLAYERS: &[&str] = &[
    "Alex Greenwood",
    "Irene Paredes Hernandez",
    "Olga  Carmona García",
];
pub const DEFAULT_PASS_ROWS: usize = 20;

const APP_DIR: &str = "player_report";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub competition_id: u32,
    pub season_id: u32,
    pub match_id: u64,
    pub player: String,
    /// Always contains `player`.
    pub compare_players: Vec<String>,
    pub pass_rows: usize,
    pub exclude_throw_ins: bool,
    pub source: DataSource,
    pub log_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ReportConfig {
    /// Reads `.env.local` and `.env` (if present) and then the process
    /// environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let competition_id = parse_or(var("REPORT_COMPETITION_ID"), DEFAULT_COMPETITION_ID);
        let season_id = parse_or(var("REPORT_SEASON_ID"), DEFAULT_SEASON_ID);
        let match_id = parse_or(var("REPORT_MATCH_ID"), DEFAULT_MATCH_ID);
        let player = var("REPORT_PLAYER")
            .map(|v| normalize_player_name(&v))
            .unwrap_or_else(|| DEFAULT_PLAYER.to_string());
        let compare = var("REPORT_COMPARE_PLAYERS")
            .map(|v| split_names(&v))
            .unwrap_or_else(|| {
                DEFAULT_COMPARE_PLAYERS
                    .iter()
                    .map(|name| normalize_player_name(name))
                    .collect()
            });
        let pass_rows = parse_or(var("REPORT_PASS_ROWS"), DEFAULT_PASS_ROWS).clamp(1, 200);
        let exclude_throw_ins = var("REPORT_EXCLUDE_THROW_INS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let timeout_secs = parse_or(var("HTTP_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS).clamp(2, 120);

        let source = match var("STATSBOMB_DATA_DIR") {
            Some(dir) => DataSource::Local {
                root: PathBuf::from(dir.trim()),
            },
            None => DataSource::Remote {
                base_url: var("STATSBOMB_BASE_URL")
                    .map(|v| v.trim().trim_end_matches('/').to_string())
                    .unwrap_or_else(|| OPEN_DATA_BASE_URL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
        };

        let log_dir = var("REPORT_LOG_DIR")
            .map(|dir| PathBuf::from(dir.trim()))
            .or_else(|| default_log_dir(&lookup));

        let mut config = Self {
            competition_id,
            season_id,
            match_id,
            player: String::new(),
            compare_players: compare,
            pass_rows,
            exclude_throw_ins,
            source,
            log_dir,
        };
        config.set_player(&player);
        config
    }

    /// Switches the focused player, keeping it in the comparison list.
    pub fn set_player(&mut self, name: &str) {
        let name = normalize_player_name(name);
        if !self.compare_players.iter().any(|p| *p == name) {
            self.compare_players.insert(0, name.clone());
        }
        self.player = name;
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn split_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(';').map(normalize_player_name) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn default_log_dir(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(base) = lookup("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = lookup("HOME")?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> ReportConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReportConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_target_the_euro_final() {
        let config = config_with(&[]);
        assert_eq!(config.competition_id, 53);
        assert_eq!(config.season_id, 315);
        assert_eq!(config.match_id, 4020846);
        assert_eq!(config.player, "Alex Greenwood");
        assert_eq!(
            config.compare_players,
            vec![
                "Alex Greenwood".to_string(),
                "Irene Paredes Hernandez".to_string(),
                "Olga Carmona García".to_string(),
            ]
        );
        assert_eq!(config.pass_rows, 20);
        assert!(!config.exclude_throw_ins);
        assert_eq!(config.log_dir, None);
        assert!(matches!(config.source, DataSource::Remote { .. }));
    }

    #[test]
    fn focused_player_is_prepended_to_comparison() {
        let config = config_with(&[
            ("REPORT_PLAYER", " Lucy   Bronze "),
            ("REPORT_COMPARE_PLAYERS", "Aitana Bonmatí;Aitana Bonmatí; ;Keira Walsh"),
        ]);
        assert_eq!(config.player, "Lucy Bronze");
        assert_eq!(
            config.compare_players,
            vec![
                "Lucy Bronze".to_string(),
                "Aitana Bonmatí".to_string(),
                "Keira Walsh".to_string(),
            ]
        );
    }

    #[test]
    fn bad_numbers_fall_back_and_limits_clamp() {
        let config = config_with(&[
            ("REPORT_MATCH_ID", "not-a-number"),
            ("REPORT_PASS_ROWS", "5000"),
            ("HTTP_TIMEOUT_SECS", "0"),
            ("REPORT_EXCLUDE_THROW_INS", "Yes"),
        ]);
        assert_eq!(config.match_id, DEFAULT_MATCH_ID);
        assert_eq!(config.pass_rows, 200);
        assert!(config.exclude_throw_ins);
        let DataSource::Remote { timeout, .. } = config.source else {
            panic!("expected remote source");
        };
        assert_eq!(timeout, Duration::from_secs(2));
    }

    #[test]
    fn data_dir_selects_local_source_and_logs_follow_xdg() {
        let config = config_with(&[
            ("STATSBOMB_DATA_DIR", "/data/open-data/data"),
            ("XDG_CACHE_HOME", "/tmp/cache"),
        ]);
        assert_eq!(
            config.source,
            DataSource::Local {
                root: PathBuf::from("/data/open-data/data")
            }
        );
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/cache/player_report")));
    }

    #[test]
    fn set_player_keeps_existing_order() {
        let mut config = config_with(&[]);
        config.set_player("Irene  Paredes Hernandez");
        assert_eq!(config.player, "Irene Paredes Hernandez");
        assert_eq!(config.compare_players.len(), 3);
        assert_eq!(config.compare_players[1], "Irene Paredes Hernandez");
    }
}
