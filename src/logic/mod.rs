//! Engine logic: brackets, advancement, group fixtures, standings and attempt results.

mod advancement;
mod bracket;
mod discipline;
mod ranking;
mod round_robin;
mod standings;

pub use advancement::{
    advance_winner, get_champion, get_third_place, is_bracket_complete, record_walkover, schedule_match,
    start_match, AdvanceResult, SlotRef,
};
pub use bracket::{
    bracket_size, bracket_structure, generate_bracket, round_label, seed_order, BracketPlan, BracketStructure,
    MatchView, RoundView,
};
pub use discipline::{
    EarliestAttemptFirst, JudgedRule, PlacementRule, PointsRule, ScoringRule, SetsRule, TechnicalRule,
};
pub use ranking::{compute_results, upsert_attempt};
pub use round_robin::{generate_round_robin, record_result};
pub use standings::{clear_manual_ranks, compute_standings, set_manual_ranks, ManualRank};
