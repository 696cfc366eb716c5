use std::fs;
use std::path::{Path, PathBuf};

use player_report::error::ReportError;
use player_report::match_cache::MatchCache;
use player_report::provider::handle_command;
use player_report::report::{ReportOptions, build_player_report};
use player_report::state::{Delta, ProviderCommand};
use player_report::statsbomb::{DataSource, fetch_competitions, fetch_matches, load_match_data};
use tempfile::TempDir;

const MATCH_ID: u64 = 4020846;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn copy_fixture(name: &str, root: &Path, relative: &str) {
    let target = root.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).expect("create data dir");
    }
    fs::copy(fixture_path(name), target).expect("copy fixture");
}

/// Lays the fixtures out like an open-data checkout's `data/` directory.
fn open_data_dir(with_lineups: bool, with_matches: bool) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    copy_fixture("events.json", dir.path(), &format!("events/{MATCH_ID}.json"));
    copy_fixture("competitions.json", dir.path(), "competitions.json");
    if with_lineups {
        copy_fixture("lineups.json", dir.path(), &format!("lineups/{MATCH_ID}.json"));
    }
    if with_matches {
        copy_fixture("matches.json", dir.path(), "matches/53/315.json");
    }
    dir
}

fn local(dir: &TempDir) -> DataSource {
    DataSource::Local {
        root: dir.path().to_path_buf(),
    }
}

fn options(player: &str) -> ReportOptions {
    ReportOptions {
        player: player.to_string(),
        compare_players: vec![
            "Alex Greenwood".to_string(),
            "Irene Paredes Hernandez".to_string(),
            "Olga Carmona García".to_string(),
        ],
        pass_rows: 3,
        exclude_throw_ins: false,
    }
}

#[test]
fn loads_full_match_from_local_checkout() {
    let dir = open_data_dir(true, true);
    let data = load_match_data(&local(&dir), 53, 315, MATCH_ID).expect("match should load");

    assert_eq!(data.match_id, MATCH_ID);
    assert_eq!(data.events.len(), 9);
    assert_eq!(data.lineups.len(), 2);
    let info = data.info.as_ref().expect("match info");
    assert_eq!(info.home_team, "England Women's");
    assert_eq!(data.team_of("Olga Carmona García"), Some("Spain Women's"));
}

#[test]
fn missing_lineups_and_match_list_degrade() {
    let dir = open_data_dir(false, false);
    let data = load_match_data(&local(&dir), 53, 315, MATCH_ID).expect("events alone suffice");
    assert!(data.lineups.is_empty());
    assert!(data.info.is_none());
    assert_eq!(data.events.len(), 9);
}

#[test]
fn missing_events_is_not_found() {
    let dir = open_data_dir(true, true);
    let err = load_match_data(&local(&dir), 53, 315, 1).unwrap_err();
    let not_found = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ReportError>(),
            Some(ReportError::NotFound { .. })
        )
    });
    assert!(not_found, "unexpected error: {err:#}");
}

#[test]
fn lists_competitions_and_matches() {
    let dir = open_data_dir(true, true);
    let source = local(&dir);
    assert_eq!(fetch_competitions(&source).expect("competitions").len(), 2);
    let matches = fetch_matches(&source, 53, 315).expect("matches");
    assert!(matches.iter().any(|m| m.match_id == MATCH_ID));
}

#[test]
fn report_for_loaded_match() {
    let dir = open_data_dir(true, true);
    let data = load_match_data(&local(&dir), 53, 315, MATCH_ID).expect("match should load");

    let report = build_player_report(&data, &options("Alex Greenwood"));
    assert_eq!(report.team.as_deref(), Some("England Women's"));
    assert_eq!(report.summary.passes, 5);
    assert_eq!(report.summary.average_pass_length, Some(20.0));
    assert_eq!(report.total_pass_rows, 5);
    assert_eq!(report.pass_rows.len(), 3);
    assert_eq!(report.pass_rows[0].recipient.as_deref(), Some("Lucy Bronze"));
    assert_eq!(report.pass_rows[1].outcome.as_deref(), Some("Incomplete"));
    assert_eq!(report.height_distribution[0].category, "Ground Pass");
    assert_eq!(report.height_distribution[0].count, 2);
    assert!(report.has_passes());
    assert!(!report.has_shots());
    assert_eq!(report.comparison[2].goals, 1);

    let mut no_throw_ins = options("Alex Greenwood");
    no_throw_ins.exclude_throw_ins = true;
    let report = build_player_report(&data, &no_throw_ins);
    assert_eq!(report.summary.passes, 4);
    assert_eq!(report.height_distribution.len(), 3);
    assert!(report.height_distribution.iter().all(|c| c.count == 1));
    // comparison is computed over every event
    assert_eq!(report.comparison[0].passes, 5);
}

#[test]
fn shooter_report_has_markers() {
    let dir = open_data_dir(true, true);
    let data = load_match_data(&local(&dir), 53, 315, MATCH_ID).expect("match should load");
    let report = build_player_report(&data, &options(" Olga  Carmona García"));
    assert_eq!(report.player, "Olga Carmona García");
    assert_eq!(report.summary.shots, 2);
    assert_eq!(report.summary.goals, 1);
    assert_eq!(report.shot_markers.len(), 2);
    assert!(report.pass_rows.is_empty());
    assert_eq!(report.summary.average_pass_length, None);
}

#[test]
fn cache_serves_second_lookup_without_loading() {
    let dir = open_data_dir(true, true);
    let source = local(&dir);
    let mut cache = MatchCache::new();

    let first = cache
        .get_or_load(MATCH_ID, || load_match_data(&source, 53, 315, MATCH_ID))
        .expect("first load");
    let second = cache
        .get_or_load(MATCH_ID, || -> anyhow::Result<_> {
            panic!("cached match must not be reloaded")
        })
        .expect("cached");
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    assert!(cache.invalidate(MATCH_ID));
    assert!(!cache.contains(MATCH_ID));
}

#[test]
fn provider_turns_commands_into_deltas() {
    let dir = open_data_dir(true, true);
    let source = local(&dir);

    let loaded = handle_command(
        &source,
        ProviderCommand::LoadMatch {
            competition_id: 53,
            season_id: 315,
            match_id: MATCH_ID,
        },
    );
    match loaded {
        Delta::MatchLoaded(data) => assert_eq!(data.events.len(), 9),
        other => panic!("expected loaded delta, got {other:?}"),
    }

    let failed = handle_command(
        &source,
        ProviderCommand::LoadMatch {
            competition_id: 53,
            season_id: 315,
            match_id: 99,
        },
    );
    match failed {
        Delta::LoadFailed { match_id, error } => {
            assert_eq!(match_id, 99);
            assert!(error.contains("not found"));
        }
        other => panic!("expected failure delta, got {other:?}"),
    }
}
