//! Domain records persisted by the repositories.
//!
//! # Responsibility
//! - Define the player/team/user/race records and their identity contract.
//! - Provide pre-persistence validation for user-supplied fields.
//!
//! # Invariants
//! - Every record carries exactly one integer identifier.
//! - Identifiers are assigned by the store; `UNASSIGNED_ID` marks a record
//!   that has not been saved yet.

pub mod entity;
pub mod player;
pub mod race;
pub mod team;
pub mod user;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected record input, reported before any SQL runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} must not be blank")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}
