//! User account record.

use super::entity::{Entity, UNASSIGNED_ID};
use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type UserId = i64;

/// Login account.
///
/// `username` is expected to be unique, but the store does not enforce it;
/// lookups by username return the first matching row.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("user", "username", &self.username)
    }
}

impl Entity<UserId> for User {
    fn id(&self) -> UserId {
        self.id
    }

    fn set_id(&mut self, id: UserId) {
        self.id = id;
    }
}

// Password is redacted in both Debug and Display so records can be logged.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "User {{ id: {}, username: {} }}", self.id, self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::User;

    #[test]
    fn debug_output_hides_password() {
        let user = User::new("admin", "hunter2");
        let rendered = format!("{user:?} {user}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
