//! Group stage: fixture generation and result recording.

use crate::models::{
    Corner, EngineError, EngineResult, GameMatch, MatchId, MatchKind, MatchStatus, Phase, PhaseKind, RegistrantId,
    Score,
};

/// Generate every pairing of the enrolled registrants once, arranged in rounds.
///
/// 1. Take registrants in registration order; add an empty seat when the count is odd.
/// 2. Each round pairs seat `i` with seat `len - 1 - i`; the empty seat sits that round out.
/// 3. Seat 0 stays put while the others rotate one place (circle method).
pub fn generate_round_robin(phase: &mut Phase) -> EngineResult<Vec<GameMatch>> {
    phase.ensure_mutable()?;
    if phase.kind != PhaseKind::Group {
        return Err(EngineError::WrongPhaseKind(phase.kind));
    }
    if phase.has_active_matches() {
        return Err(EngineError::AlreadyInitialized);
    }
    if phase.registrants.len() < 2 {
        return Err(EngineError::EmptyBracket);
    }
    phase.clear_matches()?;

    let mut seats: Vec<Option<RegistrantId>> = phase.registrants.iter().map(|r| Some(r.id)).collect();
    if seats.len() % 2 == 1 {
        seats.push(None);
    }
    let len = seats.len();

    let mut fixtures: Vec<(GameMatch, RegistrantId, RegistrantId)> = Vec::new();
    for round in 1..len as u32 {
        let mut sequence = 0;
        for i in 0..len / 2 {
            if let (Some(blue), Some(white)) = (seats[i], seats[len - 1 - i]) {
                let game = GameMatch::new(phase.id, MatchKind::Group, round, format!("Round {round}"), sequence);
                fixtures.push((game, blue, white));
                sequence += 1;
            }
        }
        seats[1..].rotate_right(1);
    }

    for (game, blue, white) in &fixtures {
        phase.slots.open(game.id);
        phase.matches.push(game.clone());
        phase.seat(game.id, Corner::Blue, *blue)?;
        phase.seat(game.id, Corner::White, *white)?;
    }
    log::info!(
        "Generated {} group fixtures over {} rounds for phase {}",
        fixtures.len(),
        len - 1,
        phase.id
    );
    Ok(fixtures.into_iter().map(|(game, _, _)| game).collect())
}

/// Record the result of a group fixture. `winner = None` is a draw.
pub fn record_result(
    phase: &mut Phase,
    match_id: MatchId,
    winner: Option<RegistrantId>,
    score: Score,
) -> EngineResult<GameMatch> {
    phase.ensure_mutable()?;
    let allows_draws = phase.discipline.scoring_rule().allows_draws();
    let participants = phase.participants(match_id);
    let kind = phase.kind;
    let game = phase.get_match_mut(match_id)?;
    if game.kind != MatchKind::Group {
        return Err(EngineError::WrongPhaseKind(kind));
    }
    if game.is_resolved() {
        return Err(EngineError::AlreadyFinalized(match_id));
    }
    if participants.len() < 2 {
        return Err(EngineError::MatchNotReady(match_id));
    }
    match winner {
        Some(w) if !participants.iter().any(|(_, r)| *r == w) => {
            return Err(EngineError::InvalidWinner { match_id, winner: w });
        }
        None if !allows_draws => return Err(EngineError::DrawNotAllowed),
        _ => {}
    }
    game.status = MatchStatus::Finished;
    game.winner = winner;
    game.score = Some(score);
    log::debug!("Recorded group result for match {}", match_id);
    Ok(game.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Discipline, Registrant};
    use std::collections::HashSet;

    fn group(n: usize, discipline: Discipline) -> Phase {
        let mut phase = Phase::new("Pool A", PhaseKind::Group, discipline, 1);
        for i in 0..n {
            phase.enroll(Registrant::new(format!("T{i}"))).unwrap();
        }
        phase
    }

    #[test]
    fn every_pair_meets_once() {
        for n in 2..=7 {
            let mut phase = group(n, Discipline::Football);
            let fixtures = generate_round_robin(&mut phase).unwrap();
            assert_eq!(fixtures.len(), n * (n - 1) / 2);
            let pairs: HashSet<_> = fixtures
                .iter()
                .map(|m| {
                    let mut p: Vec<_> = phase.participants(m.id).into_iter().map(|(_, r)| r).collect();
                    p.sort();
                    (p[0], p[1])
                })
                .collect();
            assert_eq!(pairs.len(), fixtures.len());
        }
    }

    #[test]
    fn nobody_plays_twice_in_a_round() {
        let mut phase = group(6, Discipline::Football);
        let fixtures = generate_round_robin(&mut phase).unwrap();
        for round in 1..=5 {
            let seated: Vec<_> = fixtures
                .iter()
                .filter(|m| m.round == round)
                .flat_map(|m| phase.participants(m.id))
                .map(|(_, r)| r)
                .collect();
            let unique: HashSet<_> = seated.iter().collect();
            assert_eq!(seated.len(), 6);
            assert_eq!(unique.len(), 6);
        }
    }

    #[test]
    fn regenerating_over_fixtures_is_rejected() {
        let mut phase = group(4, Discipline::Football);
        generate_round_robin(&mut phase).unwrap();
        assert_eq!(
            generate_round_robin(&mut phase).unwrap_err(),
            EngineError::AlreadyInitialized
        );
    }

    #[test]
    fn draw_needs_a_discipline_with_draws() {
        let mut phase = group(2, Discipline::Basketball);
        let fixture = generate_round_robin(&mut phase).unwrap()[0].id;
        let score = Score::Points { blue: 80, white: 80 };
        assert_eq!(
            record_result(&mut phase, fixture, None, score).unwrap_err(),
            EngineError::DrawNotAllowed
        );
    }
}
