//! Standings: aggregate finished matches into a ranked table, then lay manual
//! overrides over the computed order.

use crate::models::{EngineError, EngineResult, Phase, RegistrantId, StandingRow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Operator override for one registrant; `None` clears it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ManualRank {
    pub registrant_id: RegistrantId,
    pub manual_rank_position: Option<u32>,
}

/// Ranked table of every enrolled registrant.
///
/// Pure function of the phase's finished matches and manual overrides: the same inputs
/// always give the same rows in the same order. Byes are not matches played and are skipped.
pub fn compute_standings(phase: &Phase) -> Vec<StandingRow> {
    let rule = phase.discipline.scoring_rule();
    let points = phase.points.unwrap_or_else(|| rule.default_points());

    let mut rows: Vec<StandingRow> = phase
        .registrants
        .iter()
        .map(|r| StandingRow {
            registrant_id: r.id,
            registration_order: r.registration_order,
            score_for: Some(0),
            score_against: Some(0),
            ..StandingRow::default()
        })
        .collect();
    let index: HashMap<RegistrantId, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.registrant_id, i))
        .collect();

    for game in phase.matches.iter().filter(|m| m.is_finished() && !m.bye) {
        for (corner, registrant_id) in phase.participants(game.id) {
            let Some(&i) = index.get(&registrant_id) else {
                continue;
            };
            let row = &mut rows[i];
            row.played += 1;
            match game.winner {
                Some(w) if w == registrant_id => {
                    row.wins += 1;
                    row.points = row.points.saturating_add(points.win);
                }
                Some(_) => {
                    row.losses += 1;
                    row.points = row.points.saturating_add(points.loss);
                }
                None if rule.allows_draws() => {
                    row.draws += 1;
                    row.points = row.points.saturating_add(points.draw);
                }
                None => {}
            }
            if game.walkover {
                continue;
            }
            match game.score.as_ref().and_then(|s| rule.tally(s, corner)) {
                Some((scored, conceded)) => {
                    // Overflow is treated like missing data.
                    let totals = row
                        .score_for
                        .and_then(|v| v.checked_add(scored))
                        .zip(row.score_against.and_then(|v| v.checked_add(conceded)));
                    row.score_for = totals.map(|(f, _)| f);
                    row.score_against = totals.map(|(_, a)| a);
                }
                None => {
                    row.score_for = None;
                    row.score_against = None;
                }
            }
        }
    }

    for row in &mut rows {
        row.score_diff = row
            .score_for
            .zip(row.score_against)
            .map(|(f, a)| i64::from(f) - i64::from(a));
    }
    rows.sort_by(|a, b| rule.compare(a, b));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
    apply_manual_ranks(rows, &phase.manual_ranks)
}

/// Put overridden rows at their fixed positions and fill the gaps with the rest in
/// computed order. Each requested position goes to the overridden row with the better
/// computed rank. Clash losers are settled afterwards, into the nearest free position
/// after the one they asked for, else the nearest before it. Positions past the end
/// clamp to the last row.
fn apply_manual_ranks(rows: Vec<StandingRow>, manual: &BTreeMap<RegistrantId, u32>) -> Vec<StandingRow> {
    let n = rows.len();
    let (mut fixed, free): (Vec<StandingRow>, Vec<StandingRow>) = rows
        .into_iter()
        .partition(|r| manual.contains_key(&r.registrant_id));
    for row in &mut fixed {
        row.manual_rank = manual.get(&row.registrant_id).copied();
    }
    fixed.sort_by_key(|r| (r.manual_rank, r.rank));

    let wanted = |row: &StandingRow| (row.manual_rank.unwrap_or(1) as usize).clamp(1, n) - 1;
    let mut placed: Vec<Option<StandingRow>> = vec![None; n];
    let mut displaced = Vec::new();
    for row in fixed {
        let i = wanted(&row);
        if placed[i].is_none() {
            placed[i] = Some(row);
        } else {
            displaced.push(row);
        }
    }
    for row in displaced {
        let i = wanted(&row);
        let slot = (i..n).chain((0..i).rev()).find(|&k| placed[k].is_none());
        if let Some(k) = slot {
            placed[k] = Some(row);
        }
    }
    let mut free = free.into_iter();
    for cell in placed.iter_mut().filter(|c| c.is_none()) {
        *cell = free.next();
    }

    placed
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, mut row)| {
            row.position = i as u32 + 1;
            row
        })
        .collect()
}

/// Set or clear manual positions. All entries are checked before any is applied.
/// Returns the number of registrants updated.
pub fn set_manual_ranks(phase: &mut Phase, entries: &[ManualRank]) -> EngineResult<usize> {
    phase.ensure_mutable()?;
    for entry in entries {
        if phase.registrant(entry.registrant_id).is_none() {
            return Err(EngineError::RegistrantNotFound(entry.registrant_id));
        }
        if entry.manual_rank_position == Some(0) {
            return Err(EngineError::InvalidRankPosition);
        }
    }
    for entry in entries {
        match entry.manual_rank_position {
            Some(position) => phase.manual_ranks.insert(entry.registrant_id, position),
            None => phase.manual_ranks.remove(&entry.registrant_id),
        };
    }
    log::info!("Set {} manual rank(s) in phase {}", entries.len(), phase.id);
    Ok(entries.len())
}

/// Drop every override; standings revert to computed order. Returns the number cleared.
pub fn clear_manual_ranks(phase: &mut Phase) -> EngineResult<usize> {
    phase.ensure_mutable()?;
    let cleared = phase.manual_ranks.len();
    phase.manual_ranks.clear();
    log::info!("Cleared {} manual rank(s) in phase {}", cleared, phase.id);
    Ok(cleared)
}
