//! In-memory store of phases, addressed by the ids the external interface uses.
//!
//! Each method is one read-modify-write of a single phase. Callers that share a store
//! across threads wrap it in a `RwLock`: reads (standings, results, bracket views) take
//! the read guard, everything else the write guard, which serializes writes per match.

use crate::logic::{self, AdvanceResult, BracketPlan, BracketStructure, ManualRank};
use crate::models::{
    Attempt, AttemptInput, AthleteResult, Discipline, EngineError, EngineResult, GameMatch, MatchId, Participation,
    ParticipationId, Phase, PhaseId, PhaseKind, PointsScheme, Registrant, RegistrantId, Score, StandingRow,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Store {
    phases: HashMap<PhaseId, Phase>,
    match_index: HashMap<MatchId, PhaseId>,
    participation_index: HashMap<ParticipationId, PhaseId>,
    /// Points scheme given to every new phase; None keeps discipline defaults.
    points: Option<PointsScheme>,
}

impl Store {
    pub fn new(points: Option<PointsScheme>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub fn create_phase(
        &mut self,
        name: impl Into<String>,
        kind: PhaseKind,
        discipline: Discipline,
        display_order: u32,
    ) -> &Phase {
        let mut phase = Phase::new(name, kind, discipline, display_order);
        phase.points = self.points;
        let id = phase.id;
        log::info!("Created {:?} phase {} ({:?})", kind, id, discipline);
        self.phases.entry(id).or_insert(phase)
    }

    pub fn phase(&self, phase_id: PhaseId) -> EngineResult<&Phase> {
        self.phases
            .get(&phase_id)
            .ok_or(EngineError::PhaseNotFound(phase_id))
    }

    fn phase_mut(&mut self, phase_id: PhaseId) -> EngineResult<&mut Phase> {
        self.phases
            .get_mut(&phase_id)
            .ok_or(EngineError::PhaseNotFound(phase_id))
    }

    /// All phases by display order.
    pub fn phases(&self) -> Vec<&Phase> {
        let mut phases: Vec<&Phase> = self.phases.values().collect();
        phases.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        phases
    }

    fn phase_id_of_match(&self, match_id: MatchId) -> EngineResult<PhaseId> {
        self.match_index
            .get(&match_id)
            .copied()
            .ok_or(EngineError::MatchNotFound(match_id))
    }

    fn phase_of_match_mut(&mut self, match_id: MatchId) -> EngineResult<&mut Phase> {
        let phase_id = self.phase_id_of_match(match_id)?;
        self.phase_mut(phase_id)
    }

    /// Rebuild the match index entries of one phase after its matches changed.
    fn reindex_matches(&mut self, phase_id: PhaseId) {
        self.match_index.retain(|_, p| *p != phase_id);
        if let Some(phase) = self.phases.get(&phase_id) {
            self.match_index
                .extend(phase.matches.iter().map(|m| (m.id, phase_id)));
        }
    }

    pub fn enroll(
        &mut self,
        phase_id: PhaseId,
        registrant: Registrant,
    ) -> EngineResult<(Registrant, Option<Participation>)> {
        let (registrant, participation) = self.phase_mut(phase_id)?.enroll(registrant)?;
        if let Some(p) = &participation {
            self.participation_index.insert(p.id, phase_id);
        }
        Ok((registrant, participation))
    }

    pub fn archive_phase(&mut self, phase_id: PhaseId) -> EngineResult<&Phase> {
        let phase = self.phase_mut(phase_id)?;
        phase.archive();
        log::info!("Archived phase {}", phase_id);
        Ok(&*phase)
    }

    pub fn generate_bracket(
        &mut self,
        phase_id: PhaseId,
        registrant_ids: &[RegistrantId],
        include_third_place: bool,
    ) -> EngineResult<BracketPlan> {
        let plan = logic::generate_bracket(self.phase_mut(phase_id)?, registrant_ids, include_third_place)?;
        self.reindex_matches(phase_id);
        Ok(plan)
    }

    /// Operator clear before regenerating. Returns the number of matches removed.
    pub fn clear_bracket(&mut self, phase_id: PhaseId) -> EngineResult<usize> {
        let removed = self.phase_mut(phase_id)?.clear_matches()?;
        self.reindex_matches(phase_id);
        log::warn!("Cleared {} match(es) from phase {}", removed, phase_id);
        Ok(removed)
    }

    pub fn get_bracket_structure(&self, phase_id: PhaseId) -> EngineResult<BracketStructure> {
        Ok(logic::bracket_structure(self.phase(phase_id)?))
    }

    pub fn is_bracket_complete(&self, phase_id: PhaseId) -> EngineResult<bool> {
        Ok(logic::is_bracket_complete(self.phase(phase_id)?))
    }

    pub fn get_champion(&self, phase_id: PhaseId) -> EngineResult<Option<RegistrantId>> {
        Ok(logic::get_champion(self.phase(phase_id)?))
    }

    pub fn get_third_place(&self, phase_id: PhaseId) -> EngineResult<Option<RegistrantId>> {
        Ok(logic::get_third_place(self.phase(phase_id)?))
    }

    pub fn advance_winner(
        &mut self,
        match_id: MatchId,
        winner: RegistrantId,
        score: Option<Score>,
    ) -> EngineResult<AdvanceResult> {
        logic::advance_winner(self.phase_of_match_mut(match_id)?, match_id, winner, score)
    }

    pub fn record_walkover(&mut self, match_id: MatchId, winner: RegistrantId) -> EngineResult<AdvanceResult> {
        logic::record_walkover(self.phase_of_match_mut(match_id)?, match_id, winner)
    }

    pub fn start_match(&mut self, match_id: MatchId) -> EngineResult<GameMatch> {
        logic::start_match(self.phase_of_match_mut(match_id)?, match_id)
    }

    pub fn schedule_match(
        &mut self,
        match_id: MatchId,
        at: Option<DateTime<Utc>>,
        venue: Option<String>,
    ) -> EngineResult<GameMatch> {
        logic::schedule_match(self.phase_of_match_mut(match_id)?, match_id, at, venue)
    }

    pub fn generate_round_robin(&mut self, phase_id: PhaseId) -> EngineResult<Vec<GameMatch>> {
        let fixtures = logic::generate_round_robin(self.phase_mut(phase_id)?)?;
        self.reindex_matches(phase_id);
        Ok(fixtures)
    }

    pub fn record_result(
        &mut self,
        match_id: MatchId,
        winner: Option<RegistrantId>,
        score: Score,
    ) -> EngineResult<GameMatch> {
        logic::record_result(self.phase_of_match_mut(match_id)?, match_id, winner, score)
    }

    pub fn compute_standings(&self, phase_id: PhaseId) -> EngineResult<Vec<StandingRow>> {
        Ok(logic::compute_standings(self.phase(phase_id)?))
    }

    pub fn set_manual_ranks(&mut self, phase_id: PhaseId, entries: &[ManualRank]) -> EngineResult<usize> {
        logic::set_manual_ranks(self.phase_mut(phase_id)?, entries)
    }

    pub fn clear_manual_ranks(&mut self, phase_id: PhaseId) -> EngineResult<usize> {
        logic::clear_manual_ranks(self.phase_mut(phase_id)?)
    }

    pub fn upsert_attempt(&mut self, participation_id: ParticipationId, input: AttemptInput) -> EngineResult<Attempt> {
        let phase_id = self
            .participation_index
            .get(&participation_id)
            .copied()
            .ok_or(EngineError::ParticipationNotFound(participation_id))?;
        logic::upsert_attempt(self.phase_mut(phase_id)?, participation_id, input)
    }

    pub fn compute_results(&self, phase_id: PhaseId) -> EngineResult<Vec<AthleteResult>> {
        let phase = self.phase(phase_id)?;
        if !phase.discipline.is_attempt_based() {
            return Err(EngineError::WrongDiscipline);
        }
        Ok(logic::compute_results(phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_with_equal_order_and_name_sort_by_id() {
        let mut store = Store::default();
        for _ in 0..5 {
            store.create_phase("Pool", PhaseKind::Group, Discipline::Football, 1);
        }
        store.create_phase("Final", PhaseKind::Elimination, Discipline::Football, 0);
        let phases = store.phases();
        assert_eq!(phases[0].name, "Final");
        let pool_ids: Vec<_> = phases[1..].iter().map(|p| p.id).collect();
        let mut sorted = pool_ids.clone();
        sorted.sort();
        assert_eq!(pool_ids, sorted);
    }
}
