//! Property-based tests for bracket generation, play-through and group fixtures.
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tournament_engine::logic::{bracket_size, seed_order};
use tournament_engine::{
    Discipline, MatchKind, MatchStatus, PhaseId, PhaseKind, Registrant, RegistrantId, Store,
};

fn enrolled(n: usize, kind: PhaseKind) -> (Store, PhaseId, Vec<RegistrantId>) {
    let mut store = Store::default();
    let phase_id = store.create_phase("Open", kind, Discipline::Wrestling, 1).id;
    let ids = (0..n)
        .map(|i| store.enroll(phase_id, Registrant::new(format!("W{i}"))).unwrap().0.id)
        .collect();
    (store, phase_id, ids)
}

/// Advance one ready match; `pick` chooses which participant wins. False when nothing is ready.
fn play_one(store: &mut Store, phase_id: PhaseId, pick: usize) -> bool {
    let phase = store.phase(phase_id).unwrap();
    let ready = phase
        .matches
        .iter()
        .filter(|m| m.status == MatchStatus::Scheduled)
        .find(|m| phase.slots.pair(m.id).is_full());
    let Some(game) = ready else {
        return false;
    };
    let seated = phase.participants(game.id);
    let (match_id, winner) = (game.id, seated[pick % seated.len()].1);
    store.advance_winner(match_id, winner, None).unwrap();
    true
}

proptest! {
    #[test]
    fn seed_order_is_a_permutation(exp in 1u32..=7) {
        let size = 1usize << exp;
        let order = seed_order(size);
        let seeds: BTreeSet<_> = order.iter().copied().collect();
        prop_assert_eq!(order.len(), size);
        prop_assert_eq!(seeds, (1..=size).collect::<BTreeSet<_>>());
        prop_assert_eq!(order[0], 1);
    }

    #[test]
    fn bracket_shape_follows_entry_count(n in 1usize..=40, third_place in any::<bool>()) {
        let (mut store, phase_id, ids) = enrolled(n, PhaseKind::Elimination);
        let plan = store.generate_bracket(phase_id, &ids, third_place).unwrap();

        let size = bracket_size(n);
        prop_assert!(size.is_power_of_two() && size >= n && size < 2 * n.max(2));
        prop_assert_eq!(plan.size, size);
        prop_assert_eq!(plan.bye_count, size - n);
        prop_assert_eq!(plan.rounds, size.trailing_zeros());

        let phase = store.phase(phase_id).unwrap();
        let bracket_matches = phase.matches.iter().filter(|m| m.kind == MatchKind::Bracket).count();
        prop_assert_eq!(bracket_matches, size - 1);
        let thirds = phase.matches.iter().filter(|m| m.kind == MatchKind::ThirdPlace).count();
        prop_assert_eq!(thirds, usize::from(third_place && plan.rounds >= 2));

        // Byes go to the top seeds.
        let bye_winners: BTreeSet<_> = phase
            .matches
            .iter()
            .filter(|m| m.bye && m.round == 1)
            .filter_map(|m| m.winner)
            .collect();
        let top: BTreeSet<_> = ids[..size - n].iter().copied().collect();
        prop_assert_eq!(bye_winners, top);
    }

    #[test]
    fn every_bracket_plays_out_to_a_champion(n in 1usize..=24, third_place in any::<bool>(), pick in 0usize..2) {
        let (mut store, phase_id, ids) = enrolled(n, PhaseKind::Elimination);
        store.generate_bracket(phase_id, &ids, third_place).unwrap();
        while play_one(&mut store, phase_id, pick) {}

        prop_assert!(store.is_bracket_complete(phase_id).unwrap());
        let champion = store.get_champion(phase_id).unwrap();
        prop_assert!(champion.is_some_and(|c| ids.contains(&c)));

        let phase = store.phase(phase_id).unwrap();
        prop_assert!(phase
            .matches
            .iter()
            .all(|m| matches!(m.status, MatchStatus::Finished | MatchStatus::Voided)));
        // Everyone but the champion lost exactly once in the main bracket.
        let mut losses: HashMap<RegistrantId, usize> = HashMap::new();
        for game in phase.matches.iter().filter(|m| m.kind == MatchKind::Bracket && !m.bye) {
            for (_, r) in phase.participants(game.id) {
                if game.winner != Some(r) {
                    *losses.entry(r).or_default() += 1;
                }
            }
        }
        prop_assert_eq!(losses.len(), n - 1);
        prop_assert!(losses.values().all(|&l| l == 1));
    }

    #[test]
    fn round_robin_pairs_everyone_once(n in 2usize..=12) {
        let (mut store, phase_id, ids) = enrolled(n, PhaseKind::Group);
        let fixtures = store.generate_round_robin(phase_id).unwrap();
        prop_assert_eq!(fixtures.len(), n * (n - 1) / 2);

        let phase = store.phase(phase_id).unwrap();
        let mut played: HashMap<RegistrantId, usize> = HashMap::new();
        for game in &fixtures {
            for (_, r) in phase.participants(game.id) {
                *played.entry(r).or_default() += 1;
            }
        }
        for id in &ids {
            prop_assert_eq!(played.get(id).copied(), Some(n - 1));
        }
    }
}
