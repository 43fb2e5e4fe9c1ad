//! SeaORM-backed repository implementation for the domain port.
//!
//! This struct is generic over `C: ConnectionTrait`, so you can construct it
//! with a `DatabaseConnection` **or** a transactional connection.

use anyhow::Context;
use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::contract::model::{NewUser, User};
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::{Column, Entity as UserEntity};
use crate::infra::storage::mapper::new_user_to_active;

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("find_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_cpf(&self, cpf: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(Column::Cpf.eq(cpf))
            .one(&self.conn)
            .await
            .context("find_by_cpf failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, candidate: NewUser) -> anyhow::Result<i64> {
        let m = new_user_to_active(candidate, Utc::now());
        let res = UserEntity::insert(m)
            .exec(&self.conn)
            .await
            .context("insert failed")?;
        Ok(res.last_insert_id)
    }

    async fn remove(&self, id: i64) -> anyhow::Result<u64> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("remove failed")?;
        Ok(res.rows_affected)
    }
}
