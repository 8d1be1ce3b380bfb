//! User Entity
//!
//! An account as seen by the request pipeline.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{email::Email, user_id::UserId};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Database-assigned identifier
    pub id: UserId,
    pub name: String,
    /// Unique, lowercased
    pub email: Email,
    /// Argon2id PHC string
    pub password_hash: HashedPassword,
    /// Email confirmation completed
    pub activated: bool,
    pub admin: bool,
    /// Optimistic concurrency counter
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

/// User to be inserted; the store assigns id, version and timestamp
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub activated: bool,
    pub admin: bool,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: Email, password_hash: HashedPassword) -> Self {
        Self {
            name: name.into(),
            email,
            password_hash,
            activated: false,
            admin: false,
        }
    }

    pub fn activated(mut self) -> Self {
        self.activated = true;
        self
    }

    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }
}
