//! Player-scoped filters and summaries over a match's event collection.
//!
//! Everything here is a single linear pass over borrowed events. Nothing is
//! cached and nothing is mutated, so repeated calls with the same input give
//! identical output.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{ReportError, ReportResult};
use crate::model::{
    Location, MatchEvent, COMPLETE_OUTCOME, GOAL_OUTCOME, PASS_TYPE, SHOT_TYPE,
};
use crate::names::normalize_player_name;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassSummary {
    pub count: usize,
    pub average_length: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSummary {
    pub count: usize,
    pub total_xg: f64,
    pub goal_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub player: String,
    pub passes: usize,
    pub shots: usize,
    pub total_xg: f64,
    pub goals: usize,
    /// None when the player has no pass with a recorded length.
    pub average_pass_length: Option<f64>,
}

impl PlayerSummary {
    pub fn has_events(&self) -> bool {
        self.passes > 0 || self.shots > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassVector {
    pub start: Location,
    pub end: Location,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotMarker {
    pub location: Location,
    pub xg: f64,
    pub is_goal: bool,
}

/// Categorical event attribute that can be tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryField {
    EventType,
    Player,
    Team,
    Outcome,
    PassHeight,
    PassRecipient,
    PassSubType,
}

impl CategoryField {
    pub const ALL: [CategoryField; 7] = [
        CategoryField::EventType,
        CategoryField::Player,
        CategoryField::Team,
        CategoryField::Outcome,
        CategoryField::PassHeight,
        CategoryField::PassRecipient,
        CategoryField::PassSubType,
    ];

    pub fn value<'a>(&self, event: &'a MatchEvent) -> Option<&'a str> {
        match self {
            CategoryField::EventType => Some(event.event_type.as_str()),
            CategoryField::Player => event.player_name(),
            CategoryField::Team => event.team.as_deref(),
            CategoryField::Outcome => event.outcome(),
            CategoryField::PassHeight => event.pass_height(),
            CategoryField::PassRecipient => event.pass_recipient(),
            CategoryField::PassSubType => event.pass_sub_type(),
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            CategoryField::EventType => "type_name",
            CategoryField::Player => "player_name",
            CategoryField::Team => "team_name",
            CategoryField::Outcome => "outcome_name",
            CategoryField::PassHeight => "pass_height_name",
            CategoryField::PassRecipient => "pass_recipient_name",
            CategoryField::PassSubType => "sub_type_name",
        }
    }
}

impl FromStr for CategoryField {
    type Err = ReportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Some(field) = Self::ALL.into_iter().find(|f| f.column_name() == raw) {
            return Ok(field);
        }
        let field = match raw {
            "type" => CategoryField::EventType,
            "player" => CategoryField::Player,
            "team" => CategoryField::Team,
            "outcome" => CategoryField::Outcome,
            "pass_height" => CategoryField::PassHeight,
            "pass_recipient" => CategoryField::PassRecipient,
            "pass_type" => CategoryField::PassSubType,
            other => {
                return Err(ReportError::schema(
                    other,
                    "no such categorical field on match events",
                ));
            }
        };
        Ok(field)
    }
}

fn filter_events<'a, I, P>(events: I, predicate: P) -> Vec<&'a MatchEvent>
where
    I: IntoIterator<Item = &'a MatchEvent>,
    P: Fn(&MatchEvent) -> bool,
{
    events.into_iter().filter(|event| predicate(event)).collect()
}

/// Events whose type equals `type_name` exactly, in source order.
pub fn filter_by_type<'a, I>(events: I, type_name: &str) -> Vec<&'a MatchEvent>
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    filter_events(events, |event| event.event_type == type_name)
}

/// Events credited to `player_name`, in source order. The query goes through
/// the same normalization applied to stored names at ingestion.
pub fn filter_by_player<'a, I>(events: I, player_name: &str) -> Vec<&'a MatchEvent>
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    let wanted = normalize_player_name(player_name);
    filter_events(events, |event| event.player_name() == Some(wanted.as_str()))
}

/// Passes whose sub-type is not `sub_type` (e.g. drop "Throw-in").
pub fn exclude_pass_sub_type<'a, I>(passes: I, sub_type: &str) -> Vec<&'a MatchEvent>
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    filter_events(passes, |event| event.pass_sub_type() != Some(sub_type))
}

pub fn summarize_passes<'a, I>(passes: I) -> PassSummary
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    let mut count = 0usize;
    let mut length_sum = 0.0;
    let mut with_length = 0usize;
    for pass in passes {
        count += 1;
        if let Some(length) = pass.pass_length() {
            length_sum += length;
            with_length += 1;
        }
    }
    PassSummary {
        count,
        average_length: mean(length_sum, with_length),
    }
}

pub fn summarize_shots<'a, I>(shots: I) -> ShotSummary
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    let mut summary = ShotSummary {
        count: 0,
        total_xg: 0.0,
        goal_count: 0,
    };
    for shot in shots {
        summary.count += 1;
        summary.total_xg += shot.xg().unwrap_or(0.0);
        if shot.outcome() == Some(GOAL_OUTCOME) {
            summary.goal_count += 1;
        }
    }
    summary
}

/// Tally of the distinct values of `field`. Events without a value are left
/// out. Sorted by descending count; equal counts keep first-seen order.
pub fn distribution_by_field<'a, I>(events: I, field: CategoryField) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();
    for event in events {
        let Some(value) = field.value(event) else {
            continue;
        };
        match slots.get(value) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push(CategoryCount {
                    category: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Same as [`distribution_by_field`] with the field given by column name.
pub fn distribution_by_name<'a, I>(events: I, field_name: &str) -> ReportResult<Vec<CategoryCount>>
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    let field = field_name.parse::<CategoryField>()?;
    Ok(distribution_by_field(events, field))
}

pub fn player_summary<'a, I>(events: I, player_name: &str) -> PlayerSummary
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    let own = filter_by_player(events, player_name);
    let passes = summarize_passes(filter_by_type(own.iter().copied(), PASS_TYPE));
    let shots = summarize_shots(filter_by_type(own.iter().copied(), SHOT_TYPE));
    PlayerSummary {
        player: normalize_player_name(player_name),
        passes: passes.count,
        shots: shots.count,
        total_xg: shots.total_xg,
        goals: shots.goal_count,
        average_pass_length: passes.average_length,
    }
}

/// One row per requested player, in the order given. Players without events
/// still get an all-zero row. Type names match ignoring ASCII case; the
/// "Goal" outcome must match exactly.
pub fn compare_players<'a, I, S>(events: I, player_names: &[S]) -> Vec<PlayerSummary>
where
    I: IntoIterator<Item = &'a MatchEvent>,
    S: AsRef<str>,
{
    let events: Vec<&MatchEvent> = events.into_iter().collect();
    player_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let mut acc = SummaryAccumulator::new(normalize_player_name(name));
            for event in filter_by_player(events.iter().copied(), name) {
                acc.push_ignoring_case(event);
            }
            acc.finish()
        })
        .collect()
}

/// Summary for every player that appears in `events`, in first-seen order.
pub fn summaries_by_player<'a, I>(events: I) -> Vec<PlayerSummary>
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<SummaryAccumulator> = Vec::new();
    for event in events {
        let Some(player) = event.player_name() else {
            continue;
        };
        let idx = *slots.entry(player).or_insert_with(|| {
            rows.push(SummaryAccumulator::new(player.to_string()));
            rows.len() - 1
        });
        rows[idx].push_exact(event);
    }
    rows.into_iter().map(SummaryAccumulator::finish).collect()
}

/// A pass with no recorded outcome was completed.
pub fn is_completed_pass(outcome: Option<&str>) -> bool {
    matches!(outcome, None | Some(COMPLETE_OUTCOME))
}

/// Passes that can be drawn as arrows: both ends known.
pub fn pass_vectors<'a, I>(passes: I) -> Vec<PassVector>
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    passes
        .into_iter()
        .filter_map(|pass| {
            let start = pass.location?;
            let detail = pass.pass.as_ref()?;
            let end = detail.end_location?;
            Some(PassVector {
                start,
                end,
                completed: is_completed_pass(detail.outcome.as_deref()),
            })
        })
        .collect()
}

/// Shots with a known origin. Missing xG is drawn as 0.
pub fn shot_markers<'a, I>(shots: I) -> Vec<ShotMarker>
where
    I: IntoIterator<Item = &'a MatchEvent>,
{
    shots
        .into_iter()
        .filter_map(|shot| {
            Some(ShotMarker {
                location: shot.location?,
                xg: shot.xg().unwrap_or(0.0),
                is_goal: shot.outcome() == Some(GOAL_OUTCOME),
            })
        })
        .collect()
}

fn mean(sum: f64, n: usize) -> Option<f64> {
    if n == 0 { None } else { Some(sum / n as f64) }
}

struct SummaryAccumulator {
    player: String,
    passes: usize,
    shots: usize,
    goals: usize,
    total_xg: f64,
    length_sum: f64,
    with_length: usize,
}

impl SummaryAccumulator {
    fn new(player: String) -> Self {
        Self {
            player,
            passes: 0,
            shots: 0,
            goals: 0,
            total_xg: 0.0,
            length_sum: 0.0,
            with_length: 0,
        }
    }

    fn push_exact(&mut self, event: &MatchEvent) {
        let is_pass = event.event_type == PASS_TYPE;
        let is_shot = event.event_type == SHOT_TYPE;
        self.push(event, is_pass, is_shot);
    }

    fn push_ignoring_case(&mut self, event: &MatchEvent) {
        let is_pass = event.event_type.eq_ignore_ascii_case(PASS_TYPE);
        let is_shot = event.event_type.eq_ignore_ascii_case(SHOT_TYPE);
        self.push(event, is_pass, is_shot);
    }

    fn push(&mut self, event: &MatchEvent, is_pass: bool, is_shot: bool) {
        if is_pass {
            self.passes += 1;
            if let Some(length) = event.pass_length() {
                self.length_sum += length;
                self.with_length += 1;
            }
        } else if is_shot {
            self.shots += 1;
            self.total_xg += event.xg().unwrap_or(0.0);
            if event.outcome() == Some(GOAL_OUTCOME) {
                self.goals += 1;
            }
        }
    }

    fn finish(self) -> PlayerSummary {
        PlayerSummary {
            player: self.player,
            passes: self.passes,
            shots: self.shots,
            total_xg: self.total_xg,
            goals: self.goals,
            average_pass_length: mean(self.length_sum, self.with_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PassDetail, ShotDetail};

    fn event(id: &str, kind: &str, player: &str) -> MatchEvent {
        let mut e = MatchEvent::new(id, kind);
        e.player = Some(player.to_string());
        e
    }

    #[test]
    fn mean_of_nothing_is_absent() {
        assert_eq!(mean(0.0, 0), None);
        assert_eq!(mean(9.0, 3), Some(3.0));
    }

    #[test]
    fn unknown_field_name_is_schema_violation() {
        let err = "pass_colour".parse::<CategoryField>().unwrap_err();
        assert!(err.is_schema_violation());
        assert_eq!(
            "pass_height_name".parse::<CategoryField>().unwrap(),
            CategoryField::PassHeight
        );
    }

    #[test]
    fn column_names_parse_back_to_their_field() {
        for field in CategoryField::ALL {
            assert_eq!(field.column_name().parse::<CategoryField>().unwrap(), field);
        }
        assert_eq!("pass_type".parse::<CategoryField>().unwrap(), CategoryField::PassSubType);
    }

    #[test]
    fn summaries_by_player_groups_in_first_seen_order() {
        let mut p1 = event("1", "Pass", "B");
        p1.pass = Some(PassDetail {
            length: Some(12.0),
            ..PassDetail::default()
        });
        let mut s1 = event("2", "Shot", "A");
        s1.shot = Some(ShotDetail {
            xg: Some(0.2),
            outcome: Some("Goal".to_string()),
            end_location: None,
        });
        let p2 = event("3", "Pass", "A");
        let team_event = MatchEvent::new("4", "Half End");

        let events = vec![p1, s1, p2, team_event];
        let rows = summaries_by_player(&events);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player, "B");
        assert_eq!(rows[0].passes, 1);
        assert_eq!(rows[0].average_pass_length, Some(12.0));
        assert_eq!(rows[1].player, "A");
        assert_eq!(rows[1].passes, 1);
        assert_eq!(rows[1].shots, 1);
        assert_eq!(rows[1].goals, 1);
        assert_eq!(rows[1].average_pass_length, None);
    }
}
