//! Routing table: who occupies each (match, corner) slot.
//!
//! Every write goes through [`SlotTable::compare_and_set`], so two results racing into the
//! same corner cannot both land: the second sees an occupant it did not expect and fails.

use crate::models::game::{Corner, MatchId};
use crate::models::registrant::RegistrantId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occupants of the two corners of one match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SlotPair {
    pub blue: Option<RegistrantId>,
    pub white: Option<RegistrantId>,
}

impl SlotPair {
    pub fn get(&self, corner: Corner) -> Option<RegistrantId> {
        match corner {
            Corner::Blue => self.blue,
            Corner::White => self.white,
        }
    }

    fn get_mut(&mut self, corner: Corner) -> &mut Option<RegistrantId> {
        match corner {
            Corner::Blue => &mut self.blue,
            Corner::White => &mut self.white,
        }
    }

    pub fn is_full(&self) -> bool {
        self.blue.is_some() && self.white.is_some()
    }
}

/// The slot write found a different occupant than the caller expected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotConflict {
    pub match_id: MatchId,
    pub corner: Corner,
    pub occupant: Option<RegistrantId>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SlotTable {
    slots: BTreeMap<MatchId, SlotPair>,
}

impl SlotTable {
    /// Register an empty pair of slots for a match.
    pub fn open(&mut self, match_id: MatchId) {
        self.slots.entry(match_id).or_default();
    }

    pub fn pair(&self, match_id: MatchId) -> SlotPair {
        self.slots.get(&match_id).copied().unwrap_or_default()
    }

    pub fn occupant(&self, match_id: MatchId, corner: Corner) -> Option<RegistrantId> {
        self.pair(match_id).get(corner)
    }

    /// First corner (blue before white) with no occupant.
    pub fn first_open(&self, match_id: MatchId) -> Option<Corner> {
        let pair = self.pair(match_id);
        Corner::BOTH.into_iter().find(|c| pair.get(*c).is_none())
    }

    /// Registrants seated in the match, blue first.
    pub fn occupants(&self, match_id: MatchId) -> Vec<(Corner, RegistrantId)> {
        let pair = self.pair(match_id);
        Corner::BOTH
            .into_iter()
            .filter_map(|c| pair.get(c).map(|r| (c, r)))
            .collect()
    }

    /// Write `new` into the slot only if it currently holds `expected`.
    pub fn compare_and_set(
        &mut self,
        match_id: MatchId,
        corner: Corner,
        expected: Option<RegistrantId>,
        new: Option<RegistrantId>,
    ) -> Result<(), SlotConflict> {
        let slot = self.slots.entry(match_id).or_default().get_mut(corner);
        if *slot != expected {
            return Err(SlotConflict {
                match_id,
                corner,
                occupant: *slot,
            });
        }
        *slot = new;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn compare_and_set_rejects_occupied_slot() {
        let mut table = SlotTable::default();
        let m = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        table.open(m);
        table.compare_and_set(m, Corner::Blue, None, Some(a)).unwrap();
        let err = table.compare_and_set(m, Corner::Blue, None, Some(b)).unwrap_err();
        assert_eq!(err.occupant, Some(a));
        assert_eq!(table.occupant(m, Corner::Blue), Some(a));
    }

    #[test]
    fn first_open_prefers_blue() {
        let mut table = SlotTable::default();
        let m = Uuid::new_v4();
        table.open(m);
        assert_eq!(table.first_open(m), Some(Corner::Blue));
        table.compare_and_set(m, Corner::Blue, None, Some(Uuid::new_v4())).unwrap();
        assert_eq!(table.first_open(m), Some(Corner::White));
        table.compare_and_set(m, Corner::White, None, Some(Uuid::new_v4())).unwrap();
        assert_eq!(table.first_open(m), None);
        assert!(table.pair(m).is_full());
    }
}
