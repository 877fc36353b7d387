//! Match (game), Participation, Corner and the per-discipline Score variants.

use crate::models::phase::PhaseId;
use crate::models::registrant::RegistrantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a participation (a registrant placed in a corner, or entered in a phase).
pub type ParticipationId = Uuid;

/// One of the two slots of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    Blue,
    White,
}

impl Corner {
    pub const BOTH: [Corner; 2] = [Corner::Blue, Corner::White];
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Finished,
    /// Skipped: no participant can ever reach this match.
    Voided,
}

/// What the match is for inside its phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Bracket,
    ThirdPlace,
    Group,
}

/// How a technical-points bout was decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryType {
    Points,
    Ippon,
    Superiority,
    Fall,
    Decision,
    Disqualification,
    Walkover,
}

/// Score of one set (volleyball, table tennis).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub blue: u32,
    pub white: u32,
}

/// Judges' marks for one corner, in hundredths of a point.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct JudgedScore {
    pub accuracy: u32,
    pub presentation: u32,
}

impl JudgedScore {
    /// None if the sum does not fit.
    pub fn total(&self) -> Option<u32> {
        self.accuracy.checked_add(self.presentation)
    }
}

/// Raw result of a match. The shape depends on the discipline.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Score {
    Points { blue: u32, white: u32 },
    Sets { sets: Vec<SetScore> },
    Judged { blue: JudgedScore, white: JudgedScore },
    Technical { blue: u32, white: u32, victory: VictoryType },
}

/// A registrant placed into a match corner. Attempt-based phases use participations
/// without a match: the registrant's entry into the phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub id: ParticipationId,
    pub match_id: Option<MatchId>,
    pub registrant_id: RegistrantId,
    pub corner: Option<Corner>,
}

impl Participation {
    pub fn in_match(match_id: MatchId, registrant_id: RegistrantId, corner: Corner) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id: Some(match_id),
            registrant_id,
            corner: Some(corner),
        }
    }

    pub fn in_phase(registrant_id: RegistrantId) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id: None,
            registrant_id,
            corner: None,
        }
    }
}

/// A single contest between (at most) two registrants.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub phase_id: PhaseId,
    pub kind: MatchKind,
    /// 1-based round number; the final (and third-place match) share the last round.
    pub round: u32,
    pub round_label: String,
    /// Position within the round, 0-based.
    pub sequence: u32,
    pub status: MatchStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    /// None if not yet played (or a draw in group play).
    pub winner: Option<RegistrantId>,
    pub score: Option<Score>,
    pub next_match_id: Option<MatchId>,
    pub next_corner: Option<Corner>,
    /// Semifinal whose loser drops into the third-place match.
    pub feeds_third_place: bool,
    pub bye: bool,
    pub walkover: bool,
}

impl GameMatch {
    pub fn new(phase_id: PhaseId, kind: MatchKind, round: u32, round_label: impl Into<String>, sequence: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase_id,
            kind,
            round,
            round_label: round_label.into(),
            sequence,
            status: MatchStatus::Scheduled,
            scheduled_at: None,
            venue: None,
            winner: None,
            score: None,
            next_match_id: None,
            next_corner: None,
            feeds_third_place: false,
            bye: false,
            walkover: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Finished or voided: the match accepts no further result.
    pub fn is_resolved(&self) -> bool {
        matches!(self.status, MatchStatus::Finished | MatchStatus::Voided)
    }
}
