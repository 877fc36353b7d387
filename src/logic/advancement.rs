//! Advancing winners through a bracket: write-once results, forward routing, third place
//! and the champion.

use crate::models::{
    Corner, EngineError, EngineResult, GameMatch, MatchId, MatchKind, MatchStatus, Phase, RegistrantId, Score,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A (match, corner) slot a registrant was written into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct SlotRef {
    pub match_id: MatchId,
    pub corner: Corner,
}

/// Effects of recording one bracket result.
#[derive(Clone, Debug, Serialize)]
pub struct AdvanceResult {
    pub game: GameMatch,
    pub winner: RegistrantId,
    pub loser: RegistrantId,
    /// Where the winner went; None after the final or the third-place match.
    pub winner_slot: Option<SlotRef>,
    /// Where the loser went; set only for semifinals feeding the third-place match.
    pub loser_slot: Option<SlotRef>,
    pub champion: Option<RegistrantId>,
    pub complete: bool,
}

/// Record the winner of a bracket match and route both registrants onward.
///
/// A match takes exactly one result: a second call fails with `AlreadyFinalized`.
/// Nothing is written unless every slot the result routes into is free.
pub fn advance_winner(
    phase: &mut Phase,
    match_id: MatchId,
    winner: RegistrantId,
    score: Option<Score>,
) -> EngineResult<AdvanceResult> {
    settle(phase, match_id, winner, score, false)
}

/// Award the match without play; routed exactly like a played result. Combat disciplines
/// store a walkover victory, numeric ones no score.
pub fn record_walkover(phase: &mut Phase, match_id: MatchId, winner: RegistrantId) -> EngineResult<AdvanceResult> {
    let score = phase.discipline.scoring_rule().walkover_score();
    settle(phase, match_id, winner, score, true)
}

fn settle(
    phase: &mut Phase,
    match_id: MatchId,
    winner: RegistrantId,
    score: Option<Score>,
    walkover: bool,
) -> EngineResult<AdvanceResult> {
    phase.ensure_mutable()?;
    let game = phase.get_match(match_id)?;
    if game.kind == MatchKind::Group {
        return Err(EngineError::WrongPhaseKind(phase.kind));
    }
    if game.is_resolved() {
        return Err(EngineError::AlreadyFinalized(match_id));
    }
    let participants = phase.participants(match_id);
    if !participants.iter().any(|(_, r)| *r == winner) {
        return Err(EngineError::InvalidWinner { match_id, winner });
    }
    let loser = participants
        .iter()
        .map(|(_, r)| *r)
        .find(|r| *r != winner)
        .ok_or(EngineError::MatchNotReady(match_id))?;

    let winner_slot = match game.next_match_id.zip(game.next_corner) {
        Some((next_id, corner)) => {
            let next = phase.get_match(next_id)?;
            if next.is_resolved() {
                return Err(EngineError::InconsistentBracketState(format!(
                    "next match {next_id} is already resolved"
                )));
            }
            if let Some(occupant) = phase.slots.occupant(next_id, corner) {
                return Err(EngineError::InconsistentBracketState(format!(
                    "{corner:?} corner of match {next_id} already holds {occupant}"
                )));
            }
            Some(SlotRef { match_id: next_id, corner })
        }
        None => None,
    };

    let loser_slot = match phase.third_place_match() {
        Some(third) if game.feeds_third_place && third.status != MatchStatus::Voided => {
            if third.is_resolved() {
                return Err(EngineError::ThirdPlaceSlotFull);
            }
            let corner = phase
                .slots
                .first_open(third.id)
                .ok_or(EngineError::ThirdPlaceSlotFull)?;
            Some(SlotRef { match_id: third.id, corner })
        }
        _ => None,
    };
    let is_final = game.kind == MatchKind::Bracket && game.next_match_id.is_none();

    if let Some(slot) = winner_slot {
        phase.seat(slot.match_id, slot.corner, winner)?;
    }
    if let Some(slot) = loser_slot {
        phase.seat(slot.match_id, slot.corner, loser)?;
    }

    let game = phase.get_match_mut(match_id)?;
    game.status = MatchStatus::Finished;
    game.winner = Some(winner);
    game.score = score;
    game.walkover = walkover;
    let game = game.clone();

    if is_final {
        phase.champion = Some(winner);
    }
    log::info!(
        "Match {} ({}) won by {}{}",
        match_id,
        game.round_label,
        winner,
        if walkover { " by walkover" } else { "" }
    );

    Ok(AdvanceResult {
        game,
        winner,
        loser,
        winner_slot,
        loser_slot,
        champion: get_champion(phase),
        complete: is_bracket_complete(phase),
    })
}

/// The final is finished and the third-place match (if any) is finished or voided.
pub fn is_bracket_complete(phase: &Phase) -> bool {
    let final_done = phase.final_match().is_some_and(|m| m.is_finished());
    final_done && phase.third_place_match().map_or(true, |m| m.is_resolved())
}

pub fn get_champion(phase: &Phase) -> Option<RegistrantId> {
    phase
        .final_match()
        .filter(|m| m.is_finished())
        .and_then(|m| m.winner)
}

pub fn get_third_place(phase: &Phase) -> Option<RegistrantId> {
    phase
        .third_place_match()
        .filter(|m| m.is_finished())
        .and_then(|m| m.winner)
}

/// Mark a seated match as being played.
pub fn start_match(phase: &mut Phase, match_id: MatchId) -> EngineResult<GameMatch> {
    phase.ensure_mutable()?;
    let full = phase.slots.pair(match_id).is_full();
    let game = phase.get_match_mut(match_id)?;
    match game.status {
        MatchStatus::Finished | MatchStatus::Voided => Err(EngineError::AlreadyFinalized(match_id)),
        MatchStatus::InProgress => Ok(game.clone()),
        MatchStatus::Scheduled if !full => Err(EngineError::MatchNotReady(match_id)),
        MatchStatus::Scheduled => {
            game.status = MatchStatus::InProgress;
            Ok(game.clone())
        }
    }
}

/// Set (or clear) the time and venue of a match that has not been decided.
pub fn schedule_match(
    phase: &mut Phase,
    match_id: MatchId,
    at: Option<DateTime<Utc>>,
    venue: Option<String>,
) -> EngineResult<GameMatch> {
    phase.ensure_mutable()?;
    let game = phase.get_match_mut(match_id)?;
    if game.is_resolved() {
        return Err(EngineError::AlreadyFinalized(match_id));
    }
    game.scheduled_at = at;
    game.venue = venue;
    Ok(game.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::bracket::generate_bracket;
    use crate::models::{Discipline, PhaseKind, Registrant};

    fn bracket(n: usize, third_place: bool) -> (Phase, Vec<RegistrantId>) {
        let mut phase = Phase::new("Open", PhaseKind::Elimination, Discipline::Judo, 1);
        let ids: Vec<_> = (0..n)
            .map(|i| phase.enroll(Registrant::new(format!("R{i}"))).unwrap().0.id)
            .collect();
        generate_bracket(&mut phase, &ids, third_place).unwrap();
        (phase, ids)
    }

    fn round_one(phase: &Phase) -> Vec<MatchId> {
        phase
            .matches
            .iter()
            .filter(|m| m.kind == MatchKind::Bracket && m.round == 1)
            .map(|m| m.id)
            .collect()
    }

    #[test]
    fn winner_is_written_to_wired_corner() {
        let (mut phase, ids) = bracket(4, false);
        let first = round_one(&phase)[0];
        let result = advance_winner(&mut phase, first, ids[0], None).unwrap();
        let slot = result.winner_slot.unwrap();
        assert_eq!(slot.corner, Corner::Blue);
        assert_eq!(phase.slots.occupant(slot.match_id, Corner::Blue), Some(ids[0]));
        assert_eq!(result.loser, ids[3]);
        assert!(!result.complete);
    }

    #[test]
    fn occupied_next_slot_is_inconsistent() {
        let (mut phase, ids) = bracket(4, false);
        let first = round_one(&phase)[0];
        let final_id = phase.final_match().unwrap().id;
        phase
            .slots
            .compare_and_set(final_id, Corner::Blue, None, Some(ids[2]))
            .unwrap();
        let err = advance_winner(&mut phase, first, ids[0], None).unwrap_err();
        assert!(matches!(err, EngineError::InconsistentBracketState(_)));
        assert_eq!(phase.get_match(first).unwrap().status, MatchStatus::Scheduled);
    }

    #[test]
    fn walkover_is_flagged_and_routed() {
        let (mut phase, ids) = bracket(2, false);
        let final_id = phase.final_match().unwrap().id;
        let result = record_walkover(&mut phase, final_id, ids[1]).unwrap();
        assert!(result.game.walkover);
        assert!(matches!(
            result.game.score,
            Some(Score::Technical { victory: crate::models::VictoryType::Walkover, .. })
        ));
        assert_eq!(result.champion, Some(ids[1]));
        assert!(result.complete);
    }

    #[test]
    fn start_requires_both_participants() {
        let (mut phase, ids) = bracket(4, false);
        let final_id = phase.final_match().unwrap().id;
        assert_eq!(
            start_match(&mut phase, final_id).unwrap_err(),
            EngineError::MatchNotReady(final_id)
        );
        let first = round_one(&phase)[0];
        assert_eq!(start_match(&mut phase, first).unwrap().status, MatchStatus::InProgress);
        advance_winner(&mut phase, first, ids[3], None).unwrap();
        assert_eq!(
            start_match(&mut phase, first).unwrap_err(),
            EngineError::AlreadyFinalized(first)
        );
    }

    #[test]
    fn schedule_sets_time_and_venue() {
        let (mut phase, _) = bracket(2, false);
        let final_id = phase.final_match().unwrap().id;
        let at = Utc::now();
        let game = schedule_match(&mut phase, final_id, Some(at), Some("Mat 1".into())).unwrap();
        assert_eq!(game.scheduled_at, Some(at));
        assert_eq!(game.venue.as_deref(), Some("Mat 1"));
    }
}
