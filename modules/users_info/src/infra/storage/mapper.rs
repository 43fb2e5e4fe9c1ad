use chrono::{DateTime, Utc};
use sea_orm::Set;

use crate::contract::model::{NewUser, User};
use crate::infra::storage::entity::{ActiveModel, Model};

impl From<Model> for User {
    fn from(entity: Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            cpf: entity.cpf,
            email: entity.email,
            phone: entity.phone,
            created_at: entity.created_at,
        }
    }
}

/// Build an insertable row; `id` is left unset so storage generates it.
pub fn new_user_to_active(candidate: NewUser, created_at: DateTime<Utc>) -> ActiveModel {
    ActiveModel {
        name: Set(candidate.name),
        cpf: Set(candidate.cpf),
        email: Set(candidate.email),
        phone: Set(candidate.phone),
        created_at: Set(created_at),
        ..Default::default()
    }
}
