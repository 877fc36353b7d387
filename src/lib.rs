//! Tournament structure and ranking engine: models, bracket/standings/results logic,
//! an in-memory store, and CSV export.

pub mod config;
pub mod export;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{Config, ConfigError};
pub use export::{results_csv, standings_csv, ExportError};
pub use logic::{
    advance_winner, bracket_structure, clear_manual_ranks, compute_results, compute_standings, generate_bracket,
    generate_round_robin, get_champion, get_third_place, is_bracket_complete, record_result, record_walkover,
    set_manual_ranks, upsert_attempt, AdvanceResult, BracketPlan, BracketStructure, ManualRank,
};
pub use models::{
    Attempt, AttemptInput, AttemptOutcome, AthleteResult, Corner, Discipline, EngineError, EngineResult, GameMatch,
    LiftType, Mark, MatchId, MatchKind, MatchStatus, Participation, ParticipationId, Phase, PhaseId, PhaseKind,
    PointsScheme, Registrant, RegistrantId, Score, StandingRow,
};
pub use store::Store;
