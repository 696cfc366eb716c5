use std::collections::HashSet;

use tracing::warn;

pub const PASS_TYPE: &str = "Pass";
pub const SHOT_TYPE: &str = "Shot";
pub const GOAL_OUTCOME: &str = "Goal";
pub const COMPLETE_OUTCOME: &str = "Complete";

/// Point in StatsBomb pitch coordinates (120 x 80, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassDetail {
    pub end_location: Option<Location>,
    pub length: Option<f64>,
    pub height: Option<String>,
    pub recipient: Option<String>,
    // None means the pass was completed.
    pub outcome: Option<String>,
    pub sub_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotDetail {
    pub end_location: Option<Location>,
    pub outcome: Option<String>,
    pub xg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchEvent {
    pub id: String,
    pub index: u32,
    pub period: u8,
    pub minute: u32,
    pub second: u32,
    pub event_type: String,
    pub team: Option<String>,
    pub player: Option<String>,
    pub location: Option<Location>,
    pub pass: Option<PassDetail>,
    pub shot: Option<ShotDetail>,
}

impl MatchEvent {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: 0,
            period: 1,
            minute: 0,
            second: 0,
            event_type: event_type.into(),
            team: None,
            player: None,
            location: None,
            pass: None,
            shot: None,
        }
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player.as_deref()
    }

    /// Outcome of the pass or shot carried by this event, whichever exists.
    pub fn outcome(&self) -> Option<&str> {
        if let Some(pass) = &self.pass {
            return pass.outcome.as_deref();
        }
        self.shot.as_ref().and_then(|shot| shot.outcome.as_deref())
    }

    pub fn end_location(&self) -> Option<Location> {
        if let Some(pass) = &self.pass {
            return pass.end_location;
        }
        self.shot.as_ref().and_then(|shot| shot.end_location)
    }

    pub fn pass_length(&self) -> Option<f64> {
        self.pass.as_ref().and_then(|pass| pass.length)
    }

    pub fn pass_height(&self) -> Option<&str> {
        self.pass.as_ref().and_then(|pass| pass.height.as_deref())
    }

    pub fn pass_recipient(&self) -> Option<&str> {
        self.pass.as_ref().and_then(|pass| pass.recipient.as_deref())
    }

    pub fn pass_sub_type(&self) -> Option<&str> {
        self.pass.as_ref().and_then(|pass| pass.sub_type.as_deref())
    }

    pub fn xg(&self) -> Option<f64> {
        self.shot.as_ref().and_then(|shot| shot.xg)
    }

    pub fn clock_label(&self) -> String {
        format!("{}:{:02}", self.minute, self.second)
    }
}

/// Events of one match in source order, ids unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCollection {
    events: Vec<MatchEvent>,
}

impl EventCollection {
    pub fn from_events(events: Vec<MatchEvent>) -> Self {
        let mut seen = HashSet::with_capacity(events.len());
        let mut kept = Vec::with_capacity(events.len());
        let mut dropped = 0usize;
        for event in events {
            if seen.insert(event.id.clone()) {
                kept.push(event);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(dropped, "dropped events with duplicate ids");
        }
        Self { events: kept }
    }

    pub fn as_slice(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MatchEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Distinct player names in order of first appearance.
    pub fn player_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.events
            .iter()
            .filter_map(|event| event.player_name())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl<'a> IntoIterator for &'a EventCollection {
    type Item = &'a MatchEvent;
    type IntoIter = std::slice::Iter<'a, MatchEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Competition {
    pub competition_id: u32,
    pub season_id: u32,
    pub competition_name: String,
    pub season_name: String,
    pub country_name: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchInfo {
    pub match_id: u64,
    pub match_date: String,
    pub kick_off: Option<String>,
    pub competition_name: String,
    pub season_name: String,
    pub stage: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u8>,
    pub away_score: Option<u8>,
    pub stadium: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineupPlayer {
    pub player_id: u64,
    pub name: String,
    pub nickname: Option<String>,
    pub jersey_number: Option<u32>,
    pub position: Option<String>,
    pub starter: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineupTeam {
    pub team_id: u64,
    pub team_name: String,
    pub players: Vec<LineupPlayer>,
}

impl LineupTeam {
    pub fn starters(&self) -> impl Iterator<Item = &LineupPlayer> {
        self.players.iter().filter(|p| p.starter)
    }

    pub fn bench(&self) -> impl Iterator<Item = &LineupPlayer> {
        self.players.iter().filter(|p| !p.starter)
    }
}

/// Everything loaded for one match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchData {
    pub match_id: u64,
    pub info: Option<MatchInfo>,
    pub lineups: Vec<LineupTeam>,
    pub events: EventCollection,
}

impl MatchData {
    pub fn team_of(&self, player: &str) -> Option<&str> {
        self.lineups
            .iter()
            .find(|team| team.players.iter().any(|p| p.name == player))
            .map(|team| team.team_name.as_str())
    }
}
