use std::sync::Arc;

use player_report::config::ReportConfig;
use player_report::model::{EventCollection, MatchData, MatchEvent, PassDetail};
use player_report::state::{AppState, Delta, LoadStatus, ProviderCommand, Screen, apply_delta};

fn config() -> ReportConfig {
    ReportConfig::from_lookup(|_| None)
}

fn match_data(match_id: u64) -> Arc<MatchData> {
    let mut event = MatchEvent::new("p1", "Pass");
    event.player = Some("Alex Greenwood".to_string());
    event.pass = Some(PassDetail {
        length: Some(12.5),
        height: Some("Ground Pass".to_string()),
        ..PassDetail::default()
    });
    Arc::new(MatchData {
        match_id,
        info: None,
        lineups: Vec::new(),
        events: EventCollection::from_events(vec![event]),
    })
}

#[test]
fn first_load_request_sends_command_once() {
    let mut state = AppState::new(config());
    let cmd = state.request_load().expect("first request should produce a command");
    assert_eq!(
        cmd,
        ProviderCommand::LoadMatch {
            competition_id: 53,
            season_id: 315,
            match_id: 4020846,
        }
    );
    assert_eq!(state.status, LoadStatus::Loading { match_id: 4020846 });
    assert!(state.request_load().is_none());
}

#[test]
fn loaded_match_is_cached_and_reported() {
    let mut state = AppState::new(config());
    state.request_load();
    apply_delta(&mut state, Delta::MatchLoaded(match_data(4020846)));

    assert_eq!(state.status, LoadStatus::Ready);
    assert!(state.cache.contains(4020846));
    assert!(state.logs.back().is_some_and(|l| l.contains("4020846 loaded")));
    assert!(state.request_load().is_none());

    let report = state.report().expect("report for cached match");
    assert_eq!(report.player, "Alex Greenwood");
    assert_eq!(report.summary.passes, 1);
    assert_eq!(report.summary.average_pass_length, Some(12.5));
    assert_eq!(report.comparison.len(), 3);
}

#[test]
fn other_match_does_not_change_status() {
    let mut state = AppState::new(config());
    state.request_load();
    apply_delta(&mut state, Delta::MatchLoaded(match_data(1)));
    assert_eq!(state.status, LoadStatus::Loading { match_id: 4020846 });
    assert!(state.cache.contains(1));
    assert!(state.report().is_none());
}

#[test]
fn load_failure_is_recorded() {
    let mut state = AppState::new(config());
    state.request_load();
    apply_delta(
        &mut state,
        Delta::LoadFailed {
            match_id: 4020846,
            error: "http 500".to_string(),
        },
    );
    assert_eq!(
        state.status,
        LoadStatus::Failed {
            match_id: 4020846,
            error: "http 500".to_string(),
        }
    );
    assert!(state.logs.back().is_some_and(|l| l.starts_with("[WARN]")));
    // a failed load can be retried
    assert!(state.request_load().is_some());
}

#[test]
fn reload_invalidates_cache() {
    let mut state = AppState::new(config());
    apply_delta(&mut state, Delta::MatchLoaded(match_data(4020846)));
    assert!(state.current_match().is_some());

    let cmd = state.request_reload();
    assert!(cmd.is_some());
    assert!(state.current_match().is_none());
    assert_eq!(state.status, LoadStatus::Loading { match_id: 4020846 });
    assert!(state.logs.iter().any(|l| l.contains("Cache cleared")));
}

#[test]
fn player_cycling_wraps_and_resets_scroll() {
    let mut state = AppState::new(config());
    state.pass_table_scroll = 4;

    state.cycle_player_next();
    assert_eq!(state.config.player, "Irene Paredes Hernandez");
    assert_eq!(state.pass_table_scroll, 0);

    state.cycle_player_next();
    assert_eq!(state.config.player, "Olga Carmona García");
    state.cycle_player_next();
    assert_eq!(state.config.player, "Alex Greenwood");

    state.cycle_player_prev();
    assert_eq!(state.config.player, "Olga Carmona García");
}

#[test]
fn screens_cycle_and_map_to_digits() {
    let mut state = AppState::new(config());
    assert_eq!(state.screen, Screen::Overview);
    state.cycle_screen();
    assert_eq!(state.screen, Screen::PassMap);
    state.cycle_screen_back();
    state.cycle_screen_back();
    assert_eq!(state.screen, Screen::Lineups);

    assert_eq!(Screen::from_digit('3'), Some(Screen::ShotMap));
    assert_eq!(Screen::from_digit('0'), None);
    assert_eq!(Screen::from_digit('9'), None);
}

#[test]
fn pass_table_scroll_stays_in_range() {
    let mut state = AppState::new(config());
    state.scroll_pass_table_up();
    assert_eq!(state.pass_table_scroll, 0);
    state.scroll_pass_table_down(2);
    state.scroll_pass_table_down(2);
    assert_eq!(state.pass_table_scroll, 1);
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = AppState::new(config());
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
}
