use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::rest::dto::MessageDto;
use crate::contract::descriptor::{Payload, ResultDescriptor};
use crate::domain::error::DomainError;

pub const MSG_INTERNAL_ERROR: &str = "Internal server error";

/// Status code plus `{"msg": ...}` body.
#[derive(Debug, Clone)]
pub struct MessageResponse(pub StatusCode, pub MessageDto);

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

/// Status = `code`; body = the data, or `{"msg": ...}` for message payloads.
impl<T: Serialize> IntoResponse for ResultDescriptor<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.payload {
            Payload::Data(data) => (status, Json(data)).into_response(),
            Payload::Message(msg) => MessageResponse(status, MessageDto::new(msg)).into_response(),
        }
    }
}

/// Map a storage fault to a generic 500; the detail only goes to the log.
pub fn map_domain_error(e: &DomainError, instance: &str) -> MessageResponse {
    match e {
        DomainError::Storage(_) => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, instance, "Storage fault while serving request");
            MessageResponse(
                StatusCode::INTERNAL_SERVER_ERROR,
                MessageDto::new(MSG_INTERNAL_ERROR),
            )
        }
    }
}
