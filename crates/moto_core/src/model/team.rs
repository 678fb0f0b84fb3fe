//! Team record.

use super::entity::{Entity, UNASSIGNED_ID};
use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type TeamId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("team", "name", &self.name)
    }
}

impl Entity<TeamId> for Team {
    fn id(&self) -> TeamId {
        self.id
    }

    fn set_id(&mut self, id: TeamId) {
        self.id = id;
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Team {{ id: {}, name: {} }}", self.id, self.name)
    }
}
