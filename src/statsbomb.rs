use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ReportError, ReportResult};
use crate::http_client::http_client;
use crate::model::{
    Competition, EventCollection, LineupPlayer, LineupTeam, Location, MatchData, MatchEvent,
    MatchInfo, PassDetail, ShotDetail,
};
use crate::names::{normalize_optional_name, normalize_player_name};

pub const OPEN_DATA_BASE_URL: &str =
    "https://raw.githubusercontent.com/statsbomb/open-data/master/data";

const REQUIRED_EVENT_FIELDS: [&str; 2] = ["id", "type"];
const STARTING_XI: &str = "Starting XI";

/// Where StatsBomb open-data documents are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Remote { base_url: String, timeout: Duration },
    /// A checkout's `data/` directory.
    Local { root: PathBuf },
}

impl DataSource {
    pub fn remote_default() -> Self {
        DataSource::Remote {
            base_url: OPEN_DATA_BASE_URL.to_string(),
            timeout: Duration::from_secs(crate::http_client::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Remote { base_url, .. } => base_url.clone(),
            DataSource::Local { root } => root.display().to_string(),
        }
    }

    fn read_document(&self, relative: &str) -> Result<String> {
        match self {
            DataSource::Remote { base_url, timeout } => {
                let url = format!("{}/{relative}", base_url.trim_end_matches('/'));
                debug!(%url, "fetching open-data document");
                let client = http_client(*timeout)?;
                let resp = client.get(&url).send().context("request failed")?;
                let status = resp.status();
                if status == StatusCode::NOT_FOUND {
                    return Err(ReportError::not_found(url).into());
                }
                if !status.is_success() {
                    return Err(ReportError::HttpStatus {
                        status: status.as_u16(),
                        url,
                    }
                    .into());
                }
                resp.text().context("failed reading body")
            }
            DataSource::Local { root } => {
                let path = root.join(relative);
                debug!(path = %path.display(), "reading open-data document");
                if !path.exists() {
                    return Err(ReportError::not_found(path.display().to_string()).into());
                }
                fs::read_to_string(&path)
                    .map_err(ReportError::from)
                    .with_context(|| format!("read {}", path.display()))
            }
        }
    }
}

pub fn fetch_competitions(source: &DataSource) -> Result<Vec<Competition>> {
    let body = source.read_document("competitions.json")?;
    Ok(parse_competitions_json(&body)?)
}

pub fn fetch_matches(
    source: &DataSource,
    competition_id: u32,
    season_id: u32,
) -> Result<Vec<MatchInfo>> {
    let body = source.read_document(&format!("matches/{competition_id}/{season_id}.json"))?;
    Ok(parse_matches_json(&body)?)
}

pub fn fetch_lineups(source: &DataSource, match_id: u64) -> Result<Vec<LineupTeam>> {
    let body = source.read_document(&format!("lineups/{match_id}.json"))?;
    Ok(parse_lineups_json(&body)?)
}

pub fn fetch_events(source: &DataSource, match_id: u64) -> Result<EventCollection> {
    let body = source.read_document(&format!("events/{match_id}.json"))?;
    Ok(parse_events_json(&body)?)
}

/// Loads events, lineups and match metadata for one match. Only the events
/// are mandatory; the other two degrade to empty with a warning.
pub fn load_match_data(
    source: &DataSource,
    competition_id: u32,
    season_id: u32,
    match_id: u64,
) -> Result<MatchData> {
    let events =
        fetch_events(source, match_id).with_context(|| format!("events for match {match_id}"))?;

    let lineups = match fetch_lineups(source, match_id) {
        Ok(lineups) => lineups,
        Err(err) => {
            warn!(match_id, error = %err, "lineups unavailable");
            Vec::new()
        }
    };

    let info = match fetch_matches(source, competition_id, season_id) {
        Ok(matches) => {
            let found = matches.into_iter().find(|m| m.match_id == match_id);
            if found.is_none() {
                warn!(
                    match_id,
                    competition_id, season_id, "match not listed for competition season"
                );
            }
            found
        }
        Err(err) => {
            warn!(match_id, error = %err, "match list unavailable");
            None
        }
    };

    info!(
        match_id,
        events = events.len(),
        teams = lineups.len(),
        source = %source.describe(),
        "match data loaded"
    );
    Ok(MatchData {
        match_id,
        info,
        lineups,
        events,
    })
}

#[derive(Debug, Deserialize)]
struct SbNamed {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SbEvent {
    id: String,
    #[serde(default)]
    index: u32,
    #[serde(default = "first_period")]
    period: u8,
    #[serde(default)]
    minute: u32,
    #[serde(default)]
    second: u32,
    #[serde(rename = "type")]
    kind: SbNamed,
    #[serde(default)]
    team: Option<SbNamed>,
    #[serde(default)]
    player: Option<SbNamed>,
    #[serde(default)]
    location: Option<Vec<f64>>,
    #[serde(default)]
    pass: Option<SbPass>,
    #[serde(default)]
    shot: Option<SbShot>,
}

#[derive(Debug, Deserialize)]
struct SbPass {
    #[serde(default)]
    recipient: Option<SbNamed>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    height: Option<SbNamed>,
    #[serde(default)]
    end_location: Option<Vec<f64>>,
    #[serde(default)]
    outcome: Option<SbNamed>,
    #[serde(rename = "type", default)]
    kind: Option<SbNamed>,
}

#[derive(Debug, Deserialize)]
struct SbShot {
    #[serde(default)]
    statsbomb_xg: Option<f64>,
    #[serde(default)]
    end_location: Option<Vec<f64>>,
    #[serde(default)]
    outcome: Option<SbNamed>,
}

fn first_period() -> u8 {
    1
}

/// Parses an events document into a normalized collection.
///
/// The document must be an array of objects, and each required field has to
/// appear on at least one record; otherwise the whole call fails with
/// [`ReportError::SchemaViolation`]. Individual records that cannot be read
/// are skipped.
pub fn parse_events_json(raw: &str) -> ReportResult<EventCollection> {
    let records = parse_record_array(raw, "events")?;
    if !records.is_empty() {
        for field in REQUIRED_EVENT_FIELDS {
            let present = records
                .iter()
                .any(|record| record.get(field).is_some_and(|v| !v.is_null()));
            if !present {
                return Err(ReportError::schema(
                    field,
                    "required field absent from every event record",
                ));
            }
        }
    }

    let total = records.len();
    let mut events = Vec::with_capacity(total);
    let mut skipped = 0usize;
    for record in records {
        match serde_json::from_value::<SbEvent>(record) {
            Ok(raw_event) => events.push(event_from_raw(raw_event)),
            Err(err) => {
                skipped += 1;
                debug!(error = %err, "skipping unreadable event record");
            }
        }
    }
    if skipped > 0 {
        warn!(skipped, total, "skipped unreadable event records");
    }
    Ok(EventCollection::from_events(events))
}

fn parse_record_array(raw: &str, what: &str) -> ReportResult<Vec<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed)?;
    let Value::Array(records) = root else {
        return Err(ReportError::schema(what, "expected a JSON array of records"));
    };
    if let Some(pos) = records.iter().position(|record| !record.is_object()) {
        return Err(ReportError::schema(
            what,
            format!("record {pos} is not an object"),
        ));
    }
    Ok(records)
}

fn event_from_raw(raw: SbEvent) -> MatchEvent {
    let pass = raw.pass.map(|pass| PassDetail {
        end_location: pass.end_location.as_deref().and_then(location_from),
        length: pass.length,
        height: pass.height.map(|h| h.name),
        recipient: pass
            .recipient
            .and_then(|r| normalize_optional_name(Some(&r.name))),
        outcome: pass.outcome.map(|o| o.name),
        sub_type: pass.kind.map(|k| k.name),
    });
    let shot = raw.shot.map(|shot| ShotDetail {
        end_location: shot.end_location.as_deref().and_then(location_from),
        outcome: shot.outcome.map(|o| o.name),
        xg: shot.statsbomb_xg,
    });

    MatchEvent {
        id: raw.id,
        index: raw.index,
        period: raw.period,
        minute: raw.minute,
        second: raw.second,
        event_type: raw.kind.name,
        team: raw.team.map(|t| t.name),
        player: raw
            .player
            .and_then(|p| normalize_optional_name(Some(&p.name))),
        location: raw.location.as_deref().and_then(location_from),
        pass,
        shot,
    }
}

fn location_from(coords: &[f64]) -> Option<Location> {
    match coords {
        [x, y, ..] => Some(Location::new(*x, *y)),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct SbCompetition {
    competition_id: u32,
    season_id: u32,
    competition_name: String,
    season_name: String,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    competition_gender: Option<String>,
}

pub fn parse_competitions_json(raw: &str) -> ReportResult<Vec<Competition>> {
    let rows: Vec<SbCompetition> = parse_typed_array(raw)?;
    Ok(rows
        .into_iter()
        .map(|c| Competition {
            competition_id: c.competition_id,
            season_id: c.season_id,
            competition_name: c.competition_name,
            season_name: c.season_name,
            country_name: c.country_name,
            gender: c.competition_gender,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct SbMatch {
    match_id: u64,
    match_date: String,
    #[serde(default)]
    kick_off: Option<String>,
    competition: SbMatchCompetition,
    season: SbMatchSeason,
    home_team: SbHomeTeam,
    away_team: SbAwayTeam,
    #[serde(default)]
    home_score: Option<u8>,
    #[serde(default)]
    away_score: Option<u8>,
    #[serde(default)]
    competition_stage: Option<SbNamed>,
    #[serde(default)]
    stadium: Option<SbNamed>,
}

#[derive(Debug, Deserialize)]
struct SbMatchCompetition {
    competition_name: String,
}

#[derive(Debug, Deserialize)]
struct SbMatchSeason {
    season_name: String,
}

#[derive(Debug, Deserialize)]
struct SbHomeTeam {
    home_team_name: String,
}

#[derive(Debug, Deserialize)]
struct SbAwayTeam {
    away_team_name: String,
}

pub fn parse_matches_json(raw: &str) -> ReportResult<Vec<MatchInfo>> {
    let rows: Vec<SbMatch> = parse_typed_array(raw)?;
    Ok(rows
        .into_iter()
        .map(|m| MatchInfo {
            match_id: m.match_id,
            match_date: m.match_date,
            kick_off: m.kick_off,
            competition_name: m.competition.competition_name,
            season_name: m.season.season_name,
            stage: m.competition_stage.map(|s| s.name),
            home_team: m.home_team.home_team_name,
            away_team: m.away_team.away_team_name,
            home_score: m.home_score,
            away_score: m.away_score,
            stadium: m.stadium.map(|s| s.name),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct SbLineupTeam {
    team_id: u64,
    team_name: String,
    #[serde(default)]
    lineup: Vec<SbLineupPlayer>,
}

#[derive(Debug, Deserialize)]
struct SbLineupPlayer {
    player_id: u64,
    player_name: String,
    #[serde(default)]
    player_nickname: Option<String>,
    #[serde(default)]
    jersey_number: Option<u32>,
    #[serde(default)]
    positions: Vec<SbLineupPosition>,
}

#[derive(Debug, Deserialize)]
struct SbLineupPosition {
    position: String,
    #[serde(default)]
    start_reason: Option<String>,
}

pub fn parse_lineups_json(raw: &str) -> ReportResult<Vec<LineupTeam>> {
    let rows: Vec<SbLineupTeam> = parse_typed_array(raw)?;
    Ok(rows
        .into_iter()
        .map(|team| LineupTeam {
            team_id: team.team_id,
            team_name: team.team_name,
            players: team.lineup.into_iter().map(lineup_player_from_raw).collect(),
        })
        .collect())
}

fn lineup_player_from_raw(raw: SbLineupPlayer) -> LineupPlayer {
    let first = raw.positions.first();
    LineupPlayer {
        player_id: raw.player_id,
        name: normalize_player_name(&raw.player_name),
        nickname: normalize_optional_name(raw.player_nickname.as_deref()),
        jersey_number: raw.jersey_number,
        position: first.map(|p| p.position.clone()),
        starter: first
            .and_then(|p| p.start_reason.as_deref())
            .is_some_and(|reason| reason == STARTING_XI),
    }
}

fn parse_typed_array<T: for<'de> Deserialize<'de>>(raw: &str) -> ReportResult<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed)?;
    if !root.is_array() {
        return Err(ReportError::schema("document", "expected a JSON array"));
    }
    Ok(serde_json::from_value(root)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_location_arrays_are_dropped() {
        assert_eq!(location_from(&[1.0]), None);
        assert_eq!(location_from(&[]), None);
        assert_eq!(location_from(&[60.0, 40.0, 1.2]), Some(Location::new(60.0, 40.0)));
    }

    #[test]
    fn null_document_is_empty_collection() {
        assert!(parse_events_json("null").unwrap().is_empty());
        assert!(parse_events_json("  ").unwrap().is_empty());
        assert!(parse_lineups_json("null").unwrap().is_empty());
    }

    #[test]
    fn non_array_document_is_schema_violation() {
        let err = parse_events_json(r#"{"id": "x"}"#).unwrap_err();
        assert!(err.is_schema_violation());
        let err = parse_matches_json(r#"{"match_id": 1}"#).unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[test]
    fn remote_default_points_at_open_data() {
        let DataSource::Remote { base_url, timeout } = DataSource::remote_default() else {
            panic!("expected remote source");
        };
        assert_eq!(base_url, OPEN_DATA_BASE_URL);
        assert_eq!(timeout, Duration::from_secs(10));
    }
}
