//! CSV export of standings and athlete results.

use crate::models::{AthleteResult, Phase, StandingRow};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Serialize)]
struct StandingRecord<'a> {
    position: u32,
    rank: u32,
    manual_rank: Option<u32>,
    name: &'a str,
    played: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    points: u32,
    score_for: Option<u32>,
    score_against: Option<u32>,
    score_diff: Option<i64>,
}

#[derive(Serialize)]
struct ResultRecord<'a> {
    division: &'a str,
    name: &'a str,
    snatch_kg: Option<u32>,
    snatch_attempt: Option<u8>,
    snatch_place: Option<u32>,
    clean_and_jerk_kg: Option<u32>,
    clean_and_jerk_attempt: Option<u8>,
    clean_and_jerk_place: Option<u32>,
    total_kg: Option<u32>,
    total_place: Option<u32>,
}

fn write_records<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut bytes = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut bytes);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8(bytes)?)
}

/// Standings in displayed order. Missing score data is an empty cell.
pub fn standings_csv(phase: &Phase, rows: &[StandingRow]) -> Result<String, ExportError> {
    write_records(rows.iter().map(|row| StandingRecord {
        position: row.position,
        rank: row.rank,
        manual_rank: row.manual_rank,
        name: phase
            .registrant(row.registrant_id)
            .map(|r| r.name.as_str())
            .unwrap_or_default(),
        played: row.played,
        wins: row.wins,
        draws: row.draws,
        losses: row.losses,
        points: row.points,
        score_for: row.score_for,
        score_against: row.score_against,
        score_diff: row.score_diff,
    }))
}

pub fn results_csv(results: &[AthleteResult]) -> Result<String, ExportError> {
    write_records(results.iter().map(|r| ResultRecord {
        division: r.division.as_deref().unwrap_or_default(),
        name: &r.name,
        snatch_kg: r.snatch.best.map(|m| m.weight_kg),
        snatch_attempt: r.snatch.best.map(|m| m.attempt_number),
        snatch_place: r.snatch.place,
        clean_and_jerk_kg: r.clean_and_jerk.best.map(|m| m.weight_kg),
        clean_and_jerk_attempt: r.clean_and_jerk.best.map(|m| m.attempt_number),
        clean_and_jerk_place: r.clean_and_jerk.place,
        total_kg: r.total,
        total_place: r.total_place,
    }))
}
