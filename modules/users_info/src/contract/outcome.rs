//! Business outcomes of the user service.
//!
//! Expected conditions (missing user, duplicate cpf/email) are values of these
//! enums, never errors. Only storage faults travel through `Err`.

use std::fmt;

use crate::contract::model::User;

/// A field that must be unique across all users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Cpf,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Cpf => f.write_str("cpf"),
            UniqueField::Email => f.write_str("email"),
        }
    }
}

/// Result of a lookup by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(User),
    NotFound,
}

impl Lookup {
    pub fn into_user(self) -> Option<User> {
        match self {
            Lookup::Found(user) => Some(user),
            Lookup::NotFound => None,
        }
    }
}

impl From<Option<User>> for Lookup {
    fn from(found: Option<User>) -> Self {
        found.map_or(Lookup::NotFound, Lookup::Found)
    }
}

/// Result of the insert workflow. The generated id is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    Created,
    Conflict(UniqueField),
}

/// Result of the delete workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
}
