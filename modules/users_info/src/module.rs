use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use crate::api::rest::routes;
use crate::auth::{AuthService, JwtAuthService};
use crate::config::UsersInfoConfig;
use crate::domain::service::Service;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// The users module: storage adapter, domain service and token helper, wired.
#[derive(Clone)]
pub struct UsersInfo {
    service: Arc<Service>,
    auth: Option<Arc<dyn AuthService>>,
}

impl UsersInfo {
    pub const NAME: &'static str = "users_info";

    /// Run the module's database migrations.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running users_info database migrations");
        Migrator::up(db, None)
            .await
            .context("users_info migrations failed")?;
        info!("Users database migrations completed successfully");
        Ok(())
    }

    pub fn init(db: DatabaseConnection, cfg: &UsersInfoConfig) -> anyhow::Result<Self> {
        info!("Initializing users_info module");

        // Wire repository (infra) to domain service (port)
        let repo = SeaOrmUsersRepository::new(db);
        let service = Arc::new(Service::new(Arc::new(repo)));

        let auth: Option<Arc<dyn AuthService>> = if cfg.jwt_secret.trim().is_empty() {
            warn!("users_info.jwt_secret is not set; token helper disabled");
            None
        } else {
            Some(Arc::new(
                JwtAuthService::new(&cfg.jwt_secret).context("token helper init failed")?,
            ))
        };

        Ok(Self { service, auth })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Token helper, when a signing secret is configured.
    pub fn auth(&self) -> Option<Arc<dyn AuthService>> {
        self.auth.clone()
    }

    pub fn register_rest(&self, router: Router) -> Router {
        info!("Registering users_info REST routes");
        routes::register_routes(router, self.service.clone())
    }
}
