//! Player record.

use super::entity::{Entity, UNASSIGNED_ID};
use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type PlayerId = i64;

/// A race participant.
///
/// `team` is a plain number kept as-is; it is not checked against `Team`
/// identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub code: String,
    pub team: i64,
}

impl Player {
    /// Creates an unsaved player.
    pub fn new(name: impl Into<String>, code: impl Into<String>, team: i64) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            code: code.into(),
            team,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("player", "name", &self.name)?;
        require_text("player", "code", &self.code)
    }
}

impl Entity<PlayerId> for Player {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn set_id(&mut self, id: PlayerId) {
        self.id = id;
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Player {{ id: {}, name: {}, code: {}, team: {} }}",
            self.id, self.name, self.code, self.team
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Player;
    use crate::model::ValidationError;

    #[test]
    fn new_player_is_unsaved() {
        let player = Player::new("Norris", "111", 3);
        assert_eq!(player.id, 0);
        assert!(player.validate().is_ok());
    }

    #[test]
    fn blank_code_is_rejected() {
        let player = Player::new("Norris", "  ", 3);
        assert_eq!(
            player.validate(),
            Err(ValidationError::BlankField {
                entity: "player",
                field: "code"
            })
        );
    }
}
