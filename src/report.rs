use chrono::{NaiveDate, NaiveTime};

use crate::aggregate::{
    self, CategoryCount, CategoryField, PassVector, PlayerSummary, ShotMarker,
};
use crate::config::ReportConfig;
use crate::model::{MatchData, MatchEvent, COMPLETE_OUTCOME, PASS_TYPE, SHOT_TYPE};
use crate::names::normalize_player_name;

pub const THROW_IN: &str = "Throw-in";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub player: String,
    pub compare_players: Vec<String>,
    pub pass_rows: usize,
    pub exclude_throw_ins: bool,
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            player: config.player.clone(),
            compare_players: config.compare_players.clone(),
            pass_rows: config.pass_rows,
            exclude_throw_ins: config.exclude_throw_ins,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassRow {
    pub minute: u32,
    pub second: u32,
    pub recipient: Option<String>,
    pub length: Option<f64>,
    pub height: Option<String>,
    pub outcome: Option<String>,
    pub completed: bool,
}

impl PassRow {
    fn from_event(event: &MatchEvent) -> Self {
        let pass = event.pass.as_ref();
        Self {
            minute: event.minute,
            second: event.second,
            recipient: pass.and_then(|p| p.recipient.clone()),
            length: pass.and_then(|p| p.length),
            height: pass.and_then(|p| p.height.clone()),
            outcome: pass.and_then(|p| p.outcome.clone()),
            completed: aggregate::is_completed_pass(event.outcome()),
        }
    }
}

/// Everything the report page shows for one player, derived fresh from the
/// loaded match.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerReport {
    pub player: String,
    pub team: Option<String>,
    pub summary: PlayerSummary,
    pub total_pass_rows: usize,
    pub pass_rows: Vec<PassRow>,
    pub pass_vectors: Vec<PassVector>,
    pub height_distribution: Vec<CategoryCount>,
    pub shot_markers: Vec<ShotMarker>,
    pub comparison: Vec<PlayerSummary>,
}

impl PlayerReport {
    pub fn has_passes(&self) -> bool {
        self.summary.passes > 0
    }

    pub fn has_shots(&self) -> bool {
        self.summary.shots > 0
    }
}

pub fn build_player_report(data: &MatchData, options: &ReportOptions) -> PlayerReport {
    let player = normalize_player_name(&options.player);
    let events = data.events.as_slice();
    let own = aggregate::filter_by_player(events, &player);

    let mut passes = aggregate::filter_by_type(own.iter().copied(), PASS_TYPE);
    if options.exclude_throw_ins {
        passes = aggregate::exclude_pass_sub_type(passes, THROW_IN);
    }
    let shots = aggregate::filter_by_type(own.iter().copied(), SHOT_TYPE);

    let pass_summary = aggregate::summarize_passes(passes.iter().copied());
    let shot_summary = aggregate::summarize_shots(shots.iter().copied());
    let summary = PlayerSummary {
        player: player.clone(),
        passes: pass_summary.count,
        shots: shot_summary.count,
        total_xg: shot_summary.total_xg,
        goals: shot_summary.goal_count,
        average_pass_length: pass_summary.average_length,
    };

    let pass_rows = passes
        .iter()
        .take(options.pass_rows)
        .map(|event| PassRow::from_event(event))
        .collect();

    PlayerReport {
        team: data.team_of(&player).map(str::to_string).or_else(|| {
            own.first().and_then(|event| event.team.clone())
        }),
        summary,
        total_pass_rows: passes.len(),
        pass_rows,
        pass_vectors: aggregate::pass_vectors(passes.iter().copied()),
        height_distribution: aggregate::distribution_by_field(
            passes.iter().copied(),
            CategoryField::PassHeight,
        ),
        shot_markers: aggregate::shot_markers(shots.iter().copied()),
        comparison: aggregate::compare_players(events, &options.compare_players),
        player,
    }
}

/// One decimal, or "N/A" when no length is known.
pub fn format_average_length(value: Option<f64>) -> String {
    match value {
        Some(length) => format!("{length:.1}"),
        None => "N/A".to_string(),
    }
}

pub fn format_xg(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_optional(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

pub fn pass_outcome_label(outcome: Option<&str>) -> &str {
    outcome.unwrap_or(COMPLETE_OUTCOME)
}

/// "27 Jul 2025 18:00" from the source's `2025-07-27` / `18:00:00.000`.
/// Unparseable dates are passed through untouched.
pub fn format_match_date(date: &str, kick_off: Option<&str>) -> String {
    let Ok(day) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") else {
        return date.trim().to_string();
    };
    let time = kick_off.and_then(|raw| {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
    });
    match time {
        Some(time) => format!("{} {}", day.format("%d %b %Y"), time.format("%H:%M")),
        None => day.format("%d %b %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_length_formats_absence_as_na() {
        assert_eq!(format_average_length(None), "N/A");
        assert_eq!(format_average_length(Some(0.0)), "0.0");
        assert_eq!(format_average_length(Some(20.04)), "20.0");
    }

    #[test]
    fn xg_rounds_to_two_places() {
        assert_eq!(format_xg(0.1 + 0.45), "0.55");
        assert_eq!(format_xg(0.0), "0.00");
    }

    #[test]
    fn match_date_and_kick_off_are_combined() {
        assert_eq!(
            format_match_date("2025-07-27", Some("18:00:00.000")),
            "27 Jul 2025 18:00"
        );
        assert_eq!(format_match_date("2025-07-27", Some("late")), "27 Jul 2025");
        assert_eq!(format_match_date("2025-07-27", None), "27 Jul 2025");
        assert_eq!(format_match_date(" TBD ", None), "TBD");
    }

    #[test]
    fn explicit_complete_outcome_agrees_with_pass_map() {
        use crate::model::{EventCollection, Location, PassDetail};

        let mut explicit = MatchEvent::new("p1", PASS_TYPE);
        explicit.player = Some("Alex Greenwood".to_string());
        explicit.location = Some(Location::new(30.0, 20.0));
        explicit.pass = Some(PassDetail {
            end_location: Some(Location::new(40.0, 22.0)),
            outcome: Some(COMPLETE_OUTCOME.to_string()),
            ..PassDetail::default()
        });
        let mut missed = explicit.clone();
        missed.id = "p2".to_string();
        if let Some(pass) = missed.pass.as_mut() {
            pass.outcome = Some("Incomplete".to_string());
        }
        let data = MatchData {
            match_id: 1,
            info: None,
            lineups: Vec::new(),
            events: EventCollection::from_events(vec![explicit, missed]),
        };
        let options = ReportOptions {
            player: "Alex Greenwood".to_string(),
            compare_players: Vec::new(),
            pass_rows: 20,
            exclude_throw_ins: false,
        };

        let report = build_player_report(&data, &options);
        assert!(report.pass_rows[0].completed);
        assert!(report.pass_vectors[0].completed);
        assert!(!report.pass_rows[1].completed);
        assert!(!report.pass_vectors[1].completed);
    }

    #[test]
    fn missing_outcome_reads_as_complete() {
        assert_eq!(pass_outcome_label(None), "Complete");
        assert_eq!(pass_outcome_label(Some("Out")), "Out");
        assert_eq!(format_optional(None), "-");
    }
}
