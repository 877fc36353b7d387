//! Registrant: an athlete or team entered in a phase.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registrant (used in matches, standings and results).
pub type RegistrantId = Uuid;

/// An athlete or team registered for a category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registrant {
    pub id: RegistrantId,
    pub name: String,
    /// Weight class or other division; placements never cross divisions.
    pub division: Option<String>,
    /// 0-based enrollment index within the phase. Terminal tie-break everywhere.
    pub registration_order: u32,
}

impl Registrant {
    /// Create a new registrant with the given name. Enrollment assigns the registration order.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            division: None,
            registration_order: 0,
        }
    }

    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.division = Some(division.into());
        self
    }
}
