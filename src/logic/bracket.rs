//! Elimination brackets: sizing, seeding, byes and the third-place match.

use crate::models::{
    Corner, EngineError, EngineResult, GameMatch, MatchId, MatchKind, MatchStatus, Participation, Phase, PhaseId,
    RegistrantId,
};
use serde::Serialize;
use std::collections::HashSet;

/// Everything generation produced for a phase.
#[derive(Clone, Debug, Serialize)]
pub struct BracketPlan {
    pub phase_id: PhaseId,
    /// Slots in round 1: the next power of two at or above the registrant count (at least 2).
    pub size: usize,
    pub bye_count: usize,
    pub rounds: u32,
    pub matches: Vec<GameMatch>,
    pub participations: Vec<Participation>,
    /// Set when byes alone decide the bracket (a single registrant).
    pub champion: Option<RegistrantId>,
}

/// A match together with whoever is seated in it.
#[derive(Clone, Debug, Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub game: GameMatch,
    pub participants: Vec<Participation>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoundView {
    pub round: u32,
    pub label: String,
    pub matches: Vec<MatchView>,
}

/// Read-only tree of a bracket phase, round by round.
#[derive(Clone, Debug, Serialize)]
pub struct BracketStructure {
    pub phase_id: PhaseId,
    pub rounds: Vec<RoundView>,
    pub third_place: Option<MatchView>,
    pub champion: Option<RegistrantId>,
}

/// Round-1 slot count for `n` registrants.
pub fn bracket_size(n: usize) -> usize {
    n.next_power_of_two().max(2)
}

/// Seed numbers (1-based) in bracket order. Seed 1 meets the lowest seed, and seeds 1 and 2
/// sit in opposite halves. Size 8 gives `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn seed_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let len = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, len + 1 - s]).collect();
    }
    order
}

/// Display label for a round, counted back from the final.
pub fn round_label(round: u32, rounds: u32) -> String {
    match rounds - round {
        0 => "Final".to_string(),
        1 => "Semifinal".to_string(),
        2 => "Quarterfinal".to_string(),
        remaining => format!("Round of {}", 1u64 << (remaining + 1)),
    }
}

/// Build the bracket for a phase. `registrant_ids` is the seed order (seed 1 first).
///
/// Round-1 matches with a single registrant are finished as byes right away and their
/// winners move on; a chain of byes keeps resolving later rounds during generation.
pub fn generate_bracket(
    phase: &mut Phase,
    registrant_ids: &[RegistrantId],
    include_third_place: bool,
) -> EngineResult<BracketPlan> {
    phase.ensure_mutable()?;
    if !phase.kind.is_bracket() {
        return Err(EngineError::WrongPhaseKind(phase.kind));
    }
    if phase.has_active_matches() {
        return Err(EngineError::AlreadyInitialized);
    }
    if registrant_ids.is_empty() {
        return Err(EngineError::EmptyBracket);
    }
    let mut seen = HashSet::new();
    for &id in registrant_ids {
        if !seen.insert(id) {
            return Err(EngineError::DuplicateRegistrant(id));
        }
        if phase.registrant(id).is_none() {
            return Err(EngineError::RegistrantNotFound(id));
        }
    }

    // Only voided leftovers can remain here.
    phase.clear_matches()?;

    let size = bracket_size(registrant_ids.len());
    let seats: Vec<Option<RegistrantId>> = seed_order(size)
        .into_iter()
        .map(|seed| registrant_ids.get(seed - 1).copied())
        .collect();
    let plan = build_from_seats(phase, &seats, include_third_place)?;
    log::info!(
        "Generated bracket for phase {}: {} registrants, size {}, {} byes, {} rounds",
        phase.id,
        registrant_ids.len(),
        plan.size,
        plan.bye_count,
        plan.rounds
    );
    Ok(plan)
}

/// Create the match tree for round-1 `seats` (pairs in order: blue, white) and resolve byes.
fn build_from_seats(
    phase: &mut Phase,
    seats: &[Option<RegistrantId>],
    include_third_place: bool,
) -> EngineResult<BracketPlan> {
    let size = seats.len();
    let rounds = size.trailing_zeros();

    let mut by_round: Vec<Vec<GameMatch>> = (1..=rounds)
        .map(|round| {
            let count = size >> round;
            (0..count)
                .map(|seq| {
                    GameMatch::new(
                        phase.id,
                        MatchKind::Bracket,
                        round,
                        round_label(round, rounds),
                        seq as u32,
                    )
                })
                .collect()
        })
        .collect();

    for r in 0..by_round.len().saturating_sub(1) {
        let next_ids: Vec<MatchId> = by_round[r + 1].iter().map(|m| m.id).collect();
        for (seq, m) in by_round[r].iter_mut().enumerate() {
            m.next_match_id = Some(next_ids[seq / 2]);
            m.next_corner = Some(if seq % 2 == 0 { Corner::Blue } else { Corner::White });
        }
    }

    let with_third_place = include_third_place && rounds >= 2;
    if with_third_place {
        let semis = by_round.len() - 2;
        for m in &mut by_round[semis] {
            m.feeds_third_place = true;
        }
    }

    let mut matches: Vec<GameMatch> = by_round.into_iter().flatten().collect();
    if with_third_place {
        matches.push(GameMatch::new(phase.id, MatchKind::ThirdPlace, rounds, "Third place", 1));
    }
    for m in &matches {
        phase.slots.open(m.id);
    }
    phase.matches = matches;

    let first_round: Vec<MatchId> = phase
        .matches
        .iter()
        .filter(|m| m.kind == MatchKind::Bracket && m.round == 1)
        .map(|m| m.id)
        .collect();
    for (match_id, pair) in first_round.iter().zip(seats.chunks(2)) {
        for (corner, seat) in Corner::BOTH.into_iter().zip(pair) {
            if let Some(registrant_id) = seat {
                phase.seat(*match_id, corner, *registrant_id)?;
            }
        }
    }

    resolve_byes(phase, rounds)?;

    if with_third_place {
        let semis_short = phase
            .matches
            .iter()
            .filter(|m| m.feeds_third_place)
            .any(|m| m.bye || m.status == MatchStatus::Voided);
        if semis_short {
            // Fewer than two real semifinal losers can ever exist.
            if let Some(third) = phase.matches.iter_mut().find(|m| m.kind == MatchKind::ThirdPlace) {
                third.status = MatchStatus::Voided;
            }
        }
    }

    let match_ids: HashSet<MatchId> = phase.matches.iter().map(|m| m.id).collect();
    Ok(BracketPlan {
        phase_id: phase.id,
        size,
        bye_count: seats.iter().filter(|s| s.is_none()).count(),
        rounds,
        matches: phase.matches.clone(),
        participations: phase
            .participations
            .iter()
            .filter(|p| p.match_id.is_some_and(|id| match_ids.contains(&id)))
            .cloned()
            .collect(),
        champion: phase.champion,
    })
}

/// Round by round, finish every match that can only ever hold one registrant and void
/// the ones that can hold none. Matches still waiting on a real result are left alone.
fn resolve_byes(phase: &mut Phase, rounds: u32) -> EngineResult<()> {
    for round in 1..=rounds {
        let ids: Vec<MatchId> = phase
            .matches
            .iter()
            .filter(|m| m.kind == MatchKind::Bracket && m.round == round)
            .map(|m| m.id)
            .collect();
        for match_id in ids {
            let feeders_pending = phase
                .matches
                .iter()
                .filter(|m| m.next_match_id == Some(match_id))
                .any(|m| !m.is_resolved());
            if feeders_pending {
                continue;
            }
            let occupants = phase.participants(match_id);
            match occupants.as_slice() {
                [] => phase.get_match_mut(match_id)?.status = MatchStatus::Voided,
                [(_, registrant_id)] => finish_bye(phase, match_id, *registrant_id)?,
                _ => {}
            }
        }
    }
    Ok(())
}

fn finish_bye(phase: &mut Phase, match_id: MatchId, registrant_id: RegistrantId) -> EngineResult<()> {
    let m = phase.get_match_mut(match_id)?;
    m.status = MatchStatus::Finished;
    m.bye = true;
    m.winner = Some(registrant_id);
    let next = m.next_match_id.zip(m.next_corner);
    match next {
        Some((next_id, corner)) => phase.seat(next_id, corner, registrant_id)?,
        None => phase.champion = Some(registrant_id),
    }
    log::debug!("Bye: {} advances from match {}", registrant_id, match_id);
    Ok(())
}

fn view(phase: &Phase, game: &GameMatch) -> MatchView {
    MatchView {
        game: game.clone(),
        participants: phase
            .participations
            .iter()
            .filter(|p| p.match_id == Some(game.id))
            .cloned()
            .collect(),
    }
}

/// The bracket as a tree of rounds, each with its matches and seated participations.
pub fn bracket_structure(phase: &Phase) -> BracketStructure {
    let rounds = phase
        .matches
        .iter()
        .filter(|m| m.kind == MatchKind::Bracket)
        .map(|m| m.round)
        .max()
        .unwrap_or(0);
    let rounds = (1..=rounds)
        .map(|round| {
            let mut matches: Vec<&GameMatch> = phase
                .matches
                .iter()
                .filter(|m| m.kind == MatchKind::Bracket && m.round == round)
                .collect();
            matches.sort_by_key(|m| m.sequence);
            RoundView {
                round,
                label: matches.first().map(|m| m.round_label.clone()).unwrap_or_default(),
                matches: matches.into_iter().map(|m| view(phase, m)).collect(),
            }
        })
        .collect();
    BracketStructure {
        phase_id: phase.id,
        rounds,
        third_place: phase.third_place_match().map(|m| view(phase, m)),
        champion: phase.champion,
    }
}
