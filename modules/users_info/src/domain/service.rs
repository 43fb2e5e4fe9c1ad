use std::sync::Arc;

use crate::contract::model::{NewUser, User};
use crate::contract::outcome::{Creation, Lookup, Removal, UniqueField};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;
use tracing::{debug, info, instrument};

/// Domain service with business rules for user management.
/// Depends only on the repository port, not on infra types.
///
/// Holds no user data between calls; every operation re-reads through the
/// repository.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn UsersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "users_info.service.find_all", skip(self))]
    pub async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        debug!("Listing all users");

        let users = self.repo.find_all().await?;

        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    #[instrument(name = "users_info.service.find_by_id", skip(self), fields(user_id = id))]
    pub async fn find_by_id(&self, id: i64) -> Result<Lookup, DomainError> {
        debug!("Getting user by id");

        let lookup = Lookup::from(self.repo.find_by_id(id).await?);
        if lookup == Lookup::NotFound {
            debug!("User not found");
        }
        Ok(lookup)
    }

    /// Insert a candidate after both uniqueness checks pass.
    ///
    /// The cpf check always runs first; when both fields collide the cpf
    /// conflict is the one reported and email is never looked up.
    #[instrument(
        name = "users_info.service.insert",
        skip(self, candidate),
        fields(cpf = %candidate.cpf, email = %candidate.email)
    )]
    pub async fn insert(&self, candidate: NewUser) -> Result<Creation, DomainError> {
        info!("Creating new user");

        if self.repo.find_by_cpf(&candidate.cpf).await?.is_some() {
            info!(field = %UniqueField::Cpf, "Rejected duplicate user");
            return Ok(Creation::Conflict(UniqueField::Cpf));
        }

        if self.repo.find_by_email(&candidate.email).await?.is_some() {
            info!(field = %UniqueField::Email, "Rejected duplicate user");
            return Ok(Creation::Conflict(UniqueField::Email));
        }

        let id = self.repo.insert(candidate).await?;

        info!("Successfully created user with id={}", id);
        Ok(Creation::Created)
    }

    #[instrument(name = "users_info.service.remove", skip(self), fields(user_id = id))]
    pub async fn remove(&self, id: i64) -> Result<Removal, DomainError> {
        info!("Deleting user");

        if self.repo.find_by_id(id).await?.is_none() {
            debug!("User not found");
            return Ok(Removal::NotFound);
        }

        let affected = self.repo.remove(id).await?;

        info!(affected, "Successfully deleted user");
        Ok(Removal::Removed)
    }
}
