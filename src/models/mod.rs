//! Data structures for the engine: phases, registrants, matches, attempts and computed rows.

mod attempt;
mod error;
mod game;
mod phase;
mod registrant;
mod slots;
mod standing;

pub use attempt::{Attempt, AttemptId, AttemptInput, AttemptOutcome, LiftType, MAX_ATTEMPTS};
pub use error::{EngineError, EngineResult};
pub use game::{
    Corner, GameMatch, JudgedScore, MatchId, MatchKind, MatchStatus, Participation, ParticipationId, Score,
    SetScore, VictoryType,
};
pub use phase::{Discipline, Phase, PhaseId, PhaseKind, PointsScheme};
pub use registrant::{Registrant, RegistrantId};
pub use slots::{SlotConflict, SlotPair, SlotTable};
pub use standing::{AthleteResult, LiftPlacement, Mark, StandingRow};
