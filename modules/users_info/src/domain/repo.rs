use crate::contract::model::{NewUser, User};
use async_trait::async_trait;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// Every method fails only with a storage fault. A missing row is `Ok(None)`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// All rows, in whatever order storage returns them.
    async fn find_all(&self) -> anyhow::Result<Vec<User>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_cpf(&self, cpf: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Persist a candidate and return the id storage generated for it.
    async fn insert(&self, candidate: NewUser) -> anyhow::Result<i64>;
    /// Delete by id. Returns the number of affected rows.
    async fn remove(&self, id: i64) -> anyhow::Result<u64>;
}
