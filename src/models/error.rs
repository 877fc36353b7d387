//! Errors raised by engine operations.

use crate::models::game::{MatchId, ParticipationId};
use crate::models::phase::{PhaseId, PhaseKind};
use crate::models::registrant::RegistrantId;
use thiserror::Error;

/// Errors that can occur during bracket, standings or results operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EngineError {
    /// The phase already has non-voided matches; clear it before regenerating.
    #[error("Phase already has matches; clear it before generating again")]
    AlreadyInitialized,

    /// No registrants to build a bracket or fixture list from.
    #[error("Need at least one registrant to generate a bracket")]
    EmptyBracket,

    #[error("Registrant listed more than once: {0}")]
    DuplicateRegistrant(RegistrantId),

    #[error("Registrant not enrolled in this phase: {0}")]
    RegistrantNotFound(RegistrantId),

    /// The winner is not one of the match's participants. Nothing was changed.
    #[error("Registrant {winner} is not a participant of match {match_id}")]
    InvalidWinner { match_id: MatchId, winner: RegistrantId },

    /// The match already has a result; re-fetch state before retrying.
    #[error("Match already finalized: {0}")]
    AlreadyFinalized(MatchId),

    /// Routing found a slot that should be empty already taken.
    #[error("Inconsistent bracket state: {0}")]
    InconsistentBracketState(String),

    /// A third loser was routed into the third-place match.
    #[error("Third-place match already has two participants")]
    ThirdPlaceSlotFull,

    #[error("Match is waiting for a participant: {0}")]
    MatchNotReady(MatchId),

    #[error("Draws are not allowed in this discipline")]
    DrawNotAllowed,

    #[error("Operation not valid for a {0:?} phase")]
    WrongPhaseKind(PhaseKind),

    #[error("Operation not valid for this discipline")]
    WrongDiscipline,

    #[error("Attempt number must be between 1 and 3 (got {0})")]
    InvalidAttemptNumber(u8),

    #[error("Manual rank position must be at least 1")]
    InvalidRankPosition,

    #[error("Phase is archived")]
    PhaseArchived,

    #[error("Phase not found: {0}")]
    PhaseNotFound(PhaseId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Participation not found: {0}")]
    ParticipationNotFound(ParticipationId),
}

pub type EngineResult<T> = Result<T, EngineError>;
