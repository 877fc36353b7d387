//! Attempts for best-of-N disciplines (weightlifting).

use crate::models::game::ParticipationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an attempt record.
pub type AttemptId = Uuid;

/// Highest attempt number per lift.
pub const MAX_ATTEMPTS: u8 = 3;

/// Sub-event of a weightlifting session.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiftType {
    Snatch,
    CleanAndJerk,
}

impl LiftType {
    pub const ALL: [LiftType; 2] = [LiftType::Snatch, LiftType::CleanAndJerk];
}

/// Referee decision on an attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Valid,
    Invalid,
    NotAttempted,
}

/// Fields supplied by the operator when recording an attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AttemptInput {
    pub lift_type: LiftType,
    pub attempt_number: u8,
    pub weight_kg: u32,
    pub result: AttemptOutcome,
}

/// One recorded trial. Keyed by (participation, lift, attempt number).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub participation_id: ParticipationId,
    pub lift_type: LiftType,
    pub attempt_number: u8,
    /// Declared weight. Only meaningful when `result` is `Valid`.
    pub weight_kg: u32,
    pub result: AttemptOutcome,
    pub recorded_at: DateTime<Utc>,
}

impl Attempt {
    pub fn new(participation_id: ParticipationId, input: AttemptInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            participation_id,
            lift_type: input.lift_type,
            attempt_number: input.attempt_number,
            weight_kg: input.weight_kg,
            result: input.result,
            recorded_at: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.result == AttemptOutcome::Valid
    }
}
