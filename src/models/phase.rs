//! Phase: one stage of a competition category, with its matches, participations and attempts.

use crate::models::attempt::Attempt;
use crate::models::error::{EngineError, EngineResult};
use crate::models::game::{Corner, GameMatch, MatchId, MatchKind, MatchStatus, Participation, ParticipationId};
use crate::models::registrant::{Registrant, RegistrantId};
use crate::models::slots::SlotTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a phase.
pub type PhaseId = Uuid;

/// Structural kind of a phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Round robin; ranked by standings.
    Group,
    /// Single elimination bracket.
    Elimination,
    /// Second-chance bracket for eliminated registrants; built like an elimination bracket.
    Repechage,
}

impl PhaseKind {
    pub fn is_bracket(self) -> bool {
        matches!(self, PhaseKind::Elimination | PhaseKind::Repechage)
    }
}

/// Sport played in the phase. Selects the scoring and placement rules.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    #[default]
    Judo,
    Wrestling,
    Taekwondo,
    KarateKata,
    Fencing,
    Football,
    Basketball,
    Volleyball,
    TableTennis,
    Weightlifting,
}

impl Discipline {
    /// Ranked from attempt records rather than matches.
    pub fn is_attempt_based(self) -> bool {
        matches!(self, Discipline::Weightlifting)
    }
}

/// League points awarded per outcome.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PointsScheme {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Default for PointsScheme {
    fn default() -> Self {
        Self { win: 3, draw: 1, loss: 0 }
    }
}

/// Full phase state: registrants, matches, routing slots, attempts and operator overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub name: String,
    pub kind: PhaseKind,
    pub discipline: Discipline,
    pub display_order: u32,
    pub archived: bool,
    /// Enrolled registrants, in registration order.
    pub registrants: Vec<Registrant>,
    pub matches: Vec<GameMatch>,
    pub participations: Vec<Participation>,
    pub attempts: Vec<Attempt>,
    pub slots: SlotTable,
    /// Operator-fixed display positions (1-based).
    pub manual_ranks: BTreeMap<RegistrantId, u32>,
    pub champion: Option<RegistrantId>,
    /// Overrides the discipline's default points.
    pub points: Option<PointsScheme>,
}

impl Phase {
    /// Create an empty phase.
    pub fn new(name: impl Into<String>, kind: PhaseKind, discipline: Discipline, display_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            discipline,
            display_order,
            archived: false,
            registrants: Vec::new(),
            matches: Vec::new(),
            participations: Vec::new(),
            attempts: Vec::new(),
            slots: SlotTable::default(),
            manual_ranks: BTreeMap::new(),
            champion: None,
            points: None,
        }
    }

    /// Fails once the phase is archived.
    pub fn ensure_mutable(&self) -> EngineResult<()> {
        if self.archived {
            return Err(EngineError::PhaseArchived);
        }
        Ok(())
    }

    /// Enroll a registrant at the end of the registration order. Attempt-based disciplines
    /// also get a phase-level participation to hang attempts off.
    pub fn enroll(&mut self, mut registrant: Registrant) -> EngineResult<(Registrant, Option<Participation>)> {
        self.ensure_mutable()?;
        if self.registrant(registrant.id).is_some() {
            return Err(EngineError::DuplicateRegistrant(registrant.id));
        }
        registrant.registration_order = self.registrants.len() as u32;
        self.registrants.push(registrant.clone());
        let participation = if self.discipline.is_attempt_based() {
            let p = Participation::in_phase(registrant.id);
            self.participations.push(p.clone());
            Some(p)
        } else {
            None
        };
        Ok((registrant, participation))
    }

    pub fn registrant(&self, id: RegistrantId) -> Option<&Registrant> {
        self.registrants.iter().find(|r| r.id == id)
    }

    /// Position of the registrant in registration order; unknown registrants sort last.
    pub fn registration_order(&self, id: RegistrantId) -> u32 {
        self.registrant(id).map(|r| r.registration_order).unwrap_or(u32::MAX)
    }

    pub fn get_match(&self, id: MatchId) -> EngineResult<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(EngineError::MatchNotFound(id))
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> EngineResult<&mut GameMatch> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(EngineError::MatchNotFound(id))
    }

    pub fn participation(&self, id: ParticipationId) -> Option<&Participation> {
        self.participations.iter().find(|p| p.id == id)
    }

    /// Registrants seated in a match, blue first.
    pub fn participants(&self, match_id: MatchId) -> Vec<(Corner, RegistrantId)> {
        self.slots.occupants(match_id)
    }

    /// True when any match is still in play or decided (voided ones don't count).
    pub fn has_active_matches(&self) -> bool {
        self.matches.iter().any(|m| m.status != MatchStatus::Voided)
    }

    /// The last bracket round's single match.
    pub fn final_match(&self) -> Option<&GameMatch> {
        self.matches
            .iter()
            .filter(|m| m.kind == MatchKind::Bracket)
            .max_by_key(|m| m.round)
    }

    pub fn third_place_match(&self) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.kind == MatchKind::ThirdPlace)
    }

    /// Seat a registrant and record the participation. The slot must be empty.
    pub fn seat(&mut self, match_id: MatchId, corner: Corner, registrant_id: RegistrantId) -> EngineResult<()> {
        self.slots
            .compare_and_set(match_id, corner, None, Some(registrant_id))
            .map_err(|conflict| {
                EngineError::InconsistentBracketState(format!(
                    "{:?} corner of match {} already holds {:?}",
                    conflict.corner, conflict.match_id, conflict.occupant
                ))
            })?;
        self.participations
            .push(Participation::in_match(match_id, registrant_id, corner));
        Ok(())
    }

    /// Remove every match and match participation; phase-level participations and attempts stay.
    /// Returns the number of matches removed.
    pub fn clear_matches(&mut self) -> EngineResult<usize> {
        self.ensure_mutable()?;
        let removed = self.matches.len();
        self.matches.clear();
        self.participations.retain(|p| p.match_id.is_none());
        self.slots.clear();
        self.champion = None;
        Ok(removed)
    }

    /// Freeze the phase. Further mutations fail with `PhaseArchived`.
    pub fn archive(&mut self) {
        self.archived = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enroll_assigns_registration_order() {
        let mut phase = Phase::new("U60", PhaseKind::Group, Discipline::Judo, 1);
        let (a, pa) = phase.enroll(Registrant::new("A")).unwrap();
        let (b, _) = phase.enroll(Registrant::new("B")).unwrap();
        assert_eq!(a.registration_order, 0);
        assert_eq!(b.registration_order, 1);
        assert!(pa.is_none());
    }

    #[test]
    fn attempt_disciplines_get_a_phase_participation() {
        let mut phase = Phase::new("M73", PhaseKind::Group, Discipline::Weightlifting, 1);
        let (r, p) = phase.enroll(Registrant::new("Lifter")).unwrap();
        let p = p.unwrap();
        assert_eq!(p.registrant_id, r.id);
        assert_eq!(p.match_id, None);
        assert_eq!(phase.participations.len(), 1);
    }

    #[test]
    fn archived_phase_rejects_enrollment() {
        let mut phase = Phase::new("U60", PhaseKind::Group, Discipline::Judo, 1);
        phase.archive();
        assert_eq!(
            phase.enroll(Registrant::new("A")).unwrap_err(),
            EngineError::PhaseArchived
        );
    }
}
