//! Standing rows and athlete results: the calculators' outputs.

use crate::models::attempt::LiftType;
use crate::models::registrant::RegistrantId;
use serde::{Deserialize, Serialize};

/// Per-registrant aggregate within a phase.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub registrant_id: RegistrantId,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    /// None when a finished match had no usable score for this discipline.
    pub score_for: Option<u32>,
    pub score_against: Option<u32>,
    pub score_diff: Option<i64>,
    /// 1-based rank from the tie-break cascade alone.
    pub rank: u32,
    pub manual_rank: Option<u32>,
    /// 1-based displayed position after manual overrides.
    pub position: u32,
    #[serde(skip)]
    pub registration_order: u32,
}

/// Best valid lift of one sub-event, and when it was made.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub weight_kg: u32,
    pub attempt_number: u8,
}

/// Placement of one athlete in one ranking (a lift or the total).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LiftPlacement {
    pub lift_type: LiftType,
    pub best: Option<Mark>,
    pub place: Option<u32>,
}

/// Computed results of one athlete in an attempt-based phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AthleteResult {
    pub registrant_id: RegistrantId,
    pub name: String,
    pub division: Option<String>,
    pub snatch: LiftPlacement,
    pub clean_and_jerk: LiftPlacement,
    /// Snatch + clean & jerk; None unless both lifts have a valid attempt.
    pub total: Option<u32>,
    pub total_place: Option<u32>,
    #[serde(skip)]
    pub registration_order: u32,
}

impl AthleteResult {
    pub fn lift(&self, lift_type: LiftType) -> &LiftPlacement {
        match lift_type {
            LiftType::Snatch => &self.snatch,
            LiftType::CleanAndJerk => &self.clean_and_jerk,
        }
    }

    fn lift_mut(&mut self, lift_type: LiftType) -> &mut LiftPlacement {
        match lift_type {
            LiftType::Snatch => &mut self.snatch,
            LiftType::CleanAndJerk => &mut self.clean_and_jerk,
        }
    }

    pub fn set_place(&mut self, lift_type: LiftType, place: Option<u32>) {
        self.lift_mut(lift_type).place = place;
    }
}
