use std::sync::Arc;

use axum::{
    extract::Path,
    http::Uri,
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{error, info};

use crate::api::rest::dto::{CreateUserReq, UserDto};
use crate::api::rest::error::map_domain_error;
use crate::contract::descriptor::ResultDescriptor;
use crate::domain::service::Service;

/// List all users
pub async fn list_users(Extension(svc): Extension<Arc<Service>>, uri: Uri) -> Response {
    info!("Listing users");

    match svc.find_all().await {
        Ok(users) => ResultDescriptor::from(users)
            .map(|users| users.into_iter().map(UserDto::from).collect::<Vec<_>>())
            .into_response(),
        Err(e) => {
            error!("Failed to list users: {}", e);
            map_domain_error(&e, uri.path()).into_response()
        }
    }
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i64>,
    uri: Uri,
) -> Response {
    info!("Getting user with id: {}", id);

    match svc.find_by_id(id).await {
        Ok(lookup) => ResultDescriptor::from(lookup)
            .map(UserDto::from)
            .into_response(),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            map_domain_error(&e, uri.path()).into_response()
        }
    }
}

/// Create a new user
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<CreateUserReq>,
) -> Response {
    info!("Creating user: {:?}", req_body);

    match svc.insert(req_body.into()).await {
        Ok(creation) => ResultDescriptor::from(creation).into_response(),
        Err(e) => {
            error!("Failed to create user: {}", e);
            map_domain_error(&e, uri.path()).into_response()
        }
    }
}

/// Delete a user by ID
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i64>,
    uri: Uri,
) -> Response {
    info!("Deleting user: {}", id);

    match svc.remove(id).await {
        Ok(removal) => ResultDescriptor::from(removal).into_response(),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            map_domain_error(&e, uri.path()).into_response()
        }
    }
}
