use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the user resource on `router`.
///
/// - `GET    /user`       list
/// - `GET    /user/{id}`  get by id
/// - `POST   /user`       create
/// - `DELETE /user/{id}`  delete
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route(
            "/user",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/user/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .layer(Extension(service))
}
