use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::ReportConfig;
use crate::match_cache::MatchCache;
use crate::model::MatchData;
use crate::report::{build_player_report, PlayerReport, ReportOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Overview,
    PassMap,
    ShotMap,
    Compare,
    Lineups,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Overview,
        Screen::PassMap,
        Screen::ShotMap,
        Screen::Compare,
        Screen::Lineups,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Screen::Overview => "Overview",
            Screen::PassMap => "Pass Map",
            Screen::ShotMap => "Shot Map",
            Screen::Compare => "Compare",
            Screen::Lineups => "Lineups",
        }
    }

    pub fn next(self) -> Screen {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Screen {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// `1`-based shortcut number.
    pub fn from_digit(digit: char) -> Option<Screen> {
        let idx = digit.to_digit(10)? as usize;
        idx.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading { match_id: u64 },
    Ready,
    Failed { match_id: u64, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    LoadMatch {
        competition_id: u32,
        season_id: u32,
        match_id: u64,
    },
}

#[derive(Debug, Clone)]
pub enum Delta {
    MatchLoaded(Arc<MatchData>),
    LoadFailed { match_id: u64, error: String },
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub config: ReportConfig,
    pub cache: MatchCache,
    pub status: LoadStatus,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub pass_table_scroll: usize,
}

impl AppState {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            screen: Screen::Overview,
            config,
            cache: MatchCache::new(),
            status: LoadStatus::Idle,
            logs: VecDeque::new(),
            help_overlay: false,
            pass_table_scroll: 0,
        }
    }

    pub fn current_match(&self) -> Option<Arc<MatchData>> {
        self.cache.get(self.config.match_id)
    }

    /// Recomputed on every call from the cached events.
    pub fn report(&self) -> Option<PlayerReport> {
        let data = self.current_match()?;
        Some(build_player_report(&data, &ReportOptions::from(&self.config)))
    }

    pub fn load_command(&self) -> ProviderCommand {
        ProviderCommand::LoadMatch {
            competition_id: self.config.competition_id,
            season_id: self.config.season_id,
            match_id: self.config.match_id,
        }
    }

    /// Command to send for the configured match, or `None` when it is
    /// already cached or in flight.
    pub fn request_load(&mut self) -> Option<ProviderCommand> {
        let match_id = self.config.match_id;
        if self.cache.contains(match_id) {
            self.status = LoadStatus::Ready;
            return None;
        }
        if self.status == (LoadStatus::Loading { match_id }) {
            return None;
        }
        self.status = LoadStatus::Loading { match_id };
        Some(self.load_command())
    }

    /// Drops the cached match and asks for it again.
    pub fn request_reload(&mut self) -> Option<ProviderCommand> {
        let match_id = self.config.match_id;
        if self.cache.invalidate(match_id) {
            self.push_log(format!("[INFO] Cache cleared for match {match_id}"));
        }
        if matches!(self.status, LoadStatus::Loading { .. }) {
            self.status = LoadStatus::Idle;
        }
        self.request_load()
    }

    pub fn cycle_screen(&mut self) {
        self.screen = self.screen.next();
    }

    pub fn cycle_screen_back(&mut self) {
        self.screen = self.screen.prev();
    }

    /// Moves focus to the next player in the comparison list.
    pub fn cycle_player_next(&mut self) {
        self.step_player(1);
    }

    pub fn cycle_player_prev(&mut self) {
        let len = self.config.compare_players.len();
        self.step_player(len.saturating_sub(1));
    }

    fn step_player(&mut self, step: usize) {
        let players = &self.config.compare_players;
        if players.is_empty() {
            return;
        }
        let idx = players
            .iter()
            .position(|p| *p == self.config.player)
            .unwrap_or(0);
        let next = players[(idx + step) % players.len()].clone();
        self.config.set_player(&next);
        self.pass_table_scroll = 0;
    }

    pub fn scroll_pass_table_down(&mut self, total_rows: usize) {
        if self.pass_table_scroll + 1 < total_rows {
            self.pass_table_scroll += 1;
        }
    }

    pub fn scroll_pass_table_up(&mut self) {
        self.pass_table_scroll = self.pass_table_scroll.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::MatchLoaded(data) => {
            let match_id = data.match_id;
            let events = data.events.len();
            state.cache.insert(data);
            if match_id == state.config.match_id {
                state.status = LoadStatus::Ready;
            }
            state.push_log(format!(
                "[INFO] Match {match_id} loaded ({events} events)"
            ));
        }
        Delta::LoadFailed { match_id, error } => {
            state.push_log(format!("[WARN] Match {match_id} load failed: {error}"));
            if match_id == state.config.match_id {
                state.status = LoadStatus::Failed { match_id, error };
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
