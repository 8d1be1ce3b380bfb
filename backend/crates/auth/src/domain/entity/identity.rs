//! Request Identity
//!
//! Who the current request is acting as. Set once by the authenticator.

use crate::domain::entity::user::User;

#[derive(Debug, Clone)]
pub enum Identity {
    /// No `Authorization` header was sent
    Anonymous,
    /// A valid authentication token resolved to this user
    User(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }
}
