//! Permission Codes
//!
//! Capabilities are plain strings such as `movies:read`; a user holds an
//! unordered set of them.

use serde::Serialize;
use std::collections::BTreeSet;

pub const MOVIES_READ: &str = "movies:read";
pub const MOVIES_WRITE: &str = "movies:write";

/// Codes seeded into the `permissions` table
pub const KNOWN_CODES: [&str; 2] = [MOVIES_READ, MOVIES_WRITE];

pub fn is_known(code: &str) -> bool {
    KNOWN_CODES.contains(&code)
}

/// Set of permission codes held by one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Permissions(BTreeSet<String>);

impl Permissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn includes(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    /// Returns false if the code was already present
    pub fn insert(&mut self, code: impl Into<String>) -> bool {
        self.0.insert(code.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Permissions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
