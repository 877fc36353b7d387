//! Integration tests for attempt recording and weightlifting results.

use tournament_engine::{
    AttemptInput, AttemptOutcome, Discipline, EngineError, LiftType, ParticipationId, PhaseId, PhaseKind, Registrant,
    Store,
};

fn session() -> (Store, PhaseId) {
    let mut store = Store::default();
    let phase_id = store
        .create_phase("Session A", PhaseKind::Group, Discipline::Weightlifting, 1)
        .id;
    (store, phase_id)
}

fn enter(store: &mut Store, phase_id: PhaseId, registrant: Registrant) -> ParticipationId {
    store.enroll(phase_id, registrant).unwrap().1.unwrap().id
}

fn lift(
    store: &mut Store,
    participation_id: ParticipationId,
    lift_type: LiftType,
    attempt_number: u8,
    weight_kg: u32,
    result: AttemptOutcome,
) {
    store
        .upsert_attempt(
            participation_id,
            AttemptInput {
                lift_type,
                attempt_number,
                weight_kg,
                result,
            },
        )
        .unwrap();
}

#[test]
fn earlier_attempt_wins_at_equal_weight() {
    let (mut store, phase_id) = session();
    let late = enter(&mut store, phase_id, Registrant::new("Late"));
    let early = enter(&mut store, phase_id, Registrant::new("Early"));
    lift(&mut store, late, LiftType::Snatch, 1, 95, AttemptOutcome::Invalid);
    lift(&mut store, late, LiftType::Snatch, 2, 100, AttemptOutcome::Valid);
    lift(&mut store, early, LiftType::Snatch, 1, 100, AttemptOutcome::Valid);

    let results = store.compute_results(phase_id).unwrap();
    let early_row = results.iter().find(|r| r.name == "Early").unwrap();
    let late_row = results.iter().find(|r| r.name == "Late").unwrap();
    assert_eq!(early_row.snatch.place, Some(1));
    assert_eq!(late_row.snatch.place, Some(2));
    assert_eq!(late_row.snatch.best.unwrap().attempt_number, 2);
}

#[test]
fn total_needs_both_lifts() {
    let (mut store, phase_id) = session();
    let complete = enter(&mut store, phase_id, Registrant::new("Complete"));
    let bombed = enter(&mut store, phase_id, Registrant::new("Bombed"));
    lift(&mut store, complete, LiftType::Snatch, 1, 80, AttemptOutcome::Valid);
    lift(&mut store, complete, LiftType::CleanAndJerk, 1, 100, AttemptOutcome::Valid);
    lift(&mut store, bombed, LiftType::Snatch, 1, 120, AttemptOutcome::Valid);
    for n in 1..=3 {
        lift(&mut store, bombed, LiftType::CleanAndJerk, n, 150, AttemptOutcome::Invalid);
    }

    let results = store.compute_results(phase_id).unwrap();
    assert_eq!(results[0].name, "Complete");
    assert_eq!(results[0].total, Some(180));
    assert_eq!(results[0].total_place, Some(1));
    assert_eq!(results[1].name, "Bombed");
    assert_eq!(results[1].total, None);
    assert_eq!(results[1].total_place, None);
    // The snatch still counts on its own.
    assert_eq!(results[1].snatch.place, Some(1));
    assert_eq!(results[1].clean_and_jerk.best, None);
}

#[test]
fn divisions_are_ranked_independently() {
    let (mut store, phase_id) = session();
    let light = enter(&mut store, phase_id, Registrant::new("Light").with_division("-61kg"));
    let heavy = enter(&mut store, phase_id, Registrant::new("Heavy").with_division("-89kg"));
    let light2 = enter(&mut store, phase_id, Registrant::new("Light 2").with_division("-61kg"));
    for (p, snatch, cj) in [(light, 110, 140), (heavy, 160, 200), (light2, 115, 140)] {
        lift(&mut store, p, LiftType::Snatch, 1, snatch, AttemptOutcome::Valid);
        lift(&mut store, p, LiftType::CleanAndJerk, 1, cj, AttemptOutcome::Valid);
    }

    let results = store.compute_results(phase_id).unwrap();
    let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Light 2", "Light", "Heavy"]);
    assert_eq!(results[0].total_place, Some(1));
    assert_eq!(results[1].total_place, Some(2));
    assert_eq!(results[2].total_place, Some(1));
}

#[test]
fn upsert_replaces_the_same_attempt() {
    let (mut store, phase_id) = session();
    let p = enter(&mut store, phase_id, Registrant::new("Lifter"));
    lift(&mut store, p, LiftType::Snatch, 1, 100, AttemptOutcome::Valid);
    lift(&mut store, p, LiftType::Snatch, 1, 100, AttemptOutcome::Invalid);
    lift(&mut store, p, LiftType::Snatch, 2, 97, AttemptOutcome::Valid);

    assert_eq!(store.phase(phase_id).unwrap().attempts.len(), 2);
    let results = store.compute_results(phase_id).unwrap();
    assert_eq!(results[0].snatch.best.map(|m| m.weight_kg), Some(97));
}

#[test]
fn attempt_numbers_stop_at_three() {
    let (mut store, phase_id) = session();
    let p = enter(&mut store, phase_id, Registrant::new("Lifter"));
    let input = AttemptInput {
        lift_type: LiftType::CleanAndJerk,
        attempt_number: 4,
        weight_kg: 120,
        result: AttemptOutcome::Valid,
    };
    assert_eq!(
        store.upsert_attempt(p, input).unwrap_err(),
        EngineError::InvalidAttemptNumber(4)
    );
}

#[test]
fn match_disciplines_have_no_attempt_results() {
    let mut store = Store::default();
    let phase_id = store.create_phase("Pool", PhaseKind::Group, Discipline::Judo, 1).id;
    let (_, participation) = store.enroll(phase_id, Registrant::new("Judoka")).unwrap();
    assert!(participation.is_none());
    assert_eq!(
        store.compute_results(phase_id).unwrap_err(),
        EngineError::WrongDiscipline
    );
}

#[test]
fn total_that_does_not_fit_is_left_unplaced() {
    let (mut store, phase_id) = session();
    let huge = enter(&mut store, phase_id, Registrant::new("Huge"));
    let normal = enter(&mut store, phase_id, Registrant::new("Normal"));
    lift(&mut store, huge, LiftType::Snatch, 1, u32::MAX, AttemptOutcome::Valid);
    lift(&mut store, huge, LiftType::CleanAndJerk, 1, u32::MAX, AttemptOutcome::Valid);
    lift(&mut store, normal, LiftType::Snatch, 1, 90, AttemptOutcome::Valid);
    lift(&mut store, normal, LiftType::CleanAndJerk, 1, 110, AttemptOutcome::Valid);

    let results = store.compute_results(phase_id).unwrap();
    assert_eq!(results[0].name, "Normal");
    assert_eq!(results[0].total_place, Some(1));
    assert_eq!(results[1].name, "Huge");
    assert_eq!(results[1].total, None);
    assert_eq!(results[1].total_place, None);
    assert_eq!(results[1].snatch.place, Some(1));
}
