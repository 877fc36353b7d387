//! Results for best-of-N attempt disciplines (weightlifting): best lifts, totals and
//! placements per division.

use crate::logic::discipline::PlacementRule;
use crate::models::{
    Attempt, AttemptInput, AthleteResult, EngineError, EngineResult, LiftPlacement, LiftType, Mark, Phase,
    ParticipationId, MAX_ATTEMPTS,
};
use chrono::Utc;
use std::cmp::Ordering;

/// Record an attempt, replacing the one already stored for the same
/// (participation, lift, attempt number). Other attempts are untouched.
pub fn upsert_attempt(
    phase: &mut Phase,
    participation_id: ParticipationId,
    input: AttemptInput,
) -> EngineResult<Attempt> {
    phase.ensure_mutable()?;
    if !phase.discipline.is_attempt_based() {
        return Err(EngineError::WrongDiscipline);
    }
    if !phase
        .participation(participation_id)
        .is_some_and(|p| p.match_id.is_none())
    {
        return Err(EngineError::ParticipationNotFound(participation_id));
    }
    if !(1..=MAX_ATTEMPTS).contains(&input.attempt_number) {
        return Err(EngineError::InvalidAttemptNumber(input.attempt_number));
    }

    let existing = phase.attempts.iter_mut().find(|a| {
        a.participation_id == participation_id
            && a.lift_type == input.lift_type
            && a.attempt_number == input.attempt_number
    });
    let attempt = match existing {
        Some(a) => {
            a.weight_kg = input.weight_kg;
            a.result = input.result;
            a.recorded_at = Utc::now();
            a.clone()
        }
        None => {
            let a = Attempt::new(participation_id, input);
            phase.attempts.push(a.clone());
            a
        }
    };
    log::debug!(
        "Attempt {:?} #{} for participation {}: {} kg {:?}",
        attempt.lift_type,
        attempt.attempt_number,
        participation_id,
        attempt.weight_kg,
        attempt.result
    );
    Ok(attempt)
}

/// Best valid lift of one sub-event. Non-valid attempts never count, whatever weight they carry.
fn best_mark(attempts: &[&Attempt], lift_type: LiftType, rule: &dyn PlacementRule) -> Option<Mark> {
    attempts
        .iter()
        .filter(|a| a.lift_type == lift_type && a.is_valid())
        .map(|a| Mark {
            weight_kg: a.weight_kg,
            attempt_number: a.attempt_number,
        })
        .min_by(|a, b| rule.compare(a, b))
}

/// The total, tagged with the clean & jerk attempt that completed it. None when a lift is
/// missing or the sum does not fit.
fn total_mark(result: &AthleteResult) -> Option<Mark> {
    let snatch = result.snatch.best?;
    let clean_and_jerk = result.clean_and_jerk.best?;
    Some(Mark {
        weight_kg: snatch.weight_kg.checked_add(clean_and_jerk.weight_kg)?,
        attempt_number: clean_and_jerk.attempt_number,
    })
}

/// Assign 1-based places among `group` to the results that have a mark.
fn place<F, S>(results: &mut [AthleteResult], group: &[usize], rule: &dyn PlacementRule, mark: F, mut set: S)
where
    F: Fn(&AthleteResult) -> Option<Mark>,
    S: FnMut(&mut AthleteResult, Option<u32>),
{
    let mut ranked: Vec<(usize, Mark)> = group
        .iter()
        .filter_map(|&i| mark(&results[i]).map(|m| (i, m)))
        .collect();
    ranked.sort_by(|(ia, a), (ib, b)| {
        rule.compare(a, b)
            .then_with(|| results[*ia].registration_order.cmp(&results[*ib].registration_order))
    });
    for &i in group {
        set(&mut results[i], None);
    }
    for (n, (i, _)) in ranked.into_iter().enumerate() {
        set(&mut results[i], Some(n as u32 + 1));
    }
}

/// Ranked results of every entered athlete, grouped by division in order of first
/// appearance. Placements never compare athletes across divisions.
///
/// Phases of match-based disciplines have no attempt results and give an empty list.
pub fn compute_results(phase: &Phase) -> Vec<AthleteResult> {
    let Some(rule) = phase.discipline.placement_rule() else {
        return Vec::new();
    };

    let mut entries: Vec<_> = phase
        .participations
        .iter()
        .filter(|p| p.match_id.is_none())
        .filter_map(|p| phase.registrant(p.registrant_id).map(|r| (p, r)))
        .collect();
    entries.sort_by_key(|(_, r)| r.registration_order);

    let mut results: Vec<AthleteResult> = entries
        .iter()
        .map(|(participation, registrant)| {
            let attempts: Vec<&Attempt> = phase
                .attempts
                .iter()
                .filter(|a| a.participation_id == participation.id)
                .collect();
            let lift = |lift_type| LiftPlacement {
                lift_type,
                best: best_mark(&attempts, lift_type, rule),
                place: None,
            };
            let mut result = AthleteResult {
                registrant_id: registrant.id,
                name: registrant.name.clone(),
                division: registrant.division.clone(),
                snatch: lift(LiftType::Snatch),
                clean_and_jerk: lift(LiftType::CleanAndJerk),
                total: None,
                total_place: None,
                registration_order: registrant.registration_order,
            };
            result.total = total_mark(&result).map(|m| m.weight_kg);
            result
        })
        .collect();

    let mut divisions: Vec<(Option<String>, Vec<usize>)> = Vec::new();
    for (i, result) in results.iter().enumerate() {
        match divisions.iter_mut().find(|(d, _)| *d == result.division) {
            Some((_, members)) => members.push(i),
            None => divisions.push((result.division.clone(), vec![i])),
        }
    }

    let mut ordered = Vec::with_capacity(results.len());
    for (_, group) in &divisions {
        for lift_type in LiftType::ALL {
            place(
                &mut results,
                group,
                rule,
                |r| r.lift(lift_type).best,
                |r, p| r.set_place(lift_type, p),
            );
        }
        place(&mut results, group, rule, total_mark, |r, p| r.total_place = p);

        let mut members = group.clone();
        members.sort_by(|&a, &b| {
            let (a, b) = (&results[a], &results[b]);
            let by_place = match (a.total_place, b.total_place) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_place.then_with(|| a.registration_order.cmp(&b.registration_order))
        });
        ordered.extend(members);
    }

    ordered.into_iter().map(|i| results[i].clone()).collect()
}
