//! SCIM JSON responses and error bodies.

use crate::error::ScimError;
use crate::schema::{ERROR_SCHEMA, SCIM_CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;

/// Detail sent for every 5xx response.
pub const SERVER_ERROR_DETAIL: &str = "Something went wrong.";

/// A JSON body served as `application/scim+json`.
pub struct ScimJson<T> {
    body: T,
    status: StatusCode,
    location: Option<String>,
}

impl<T: Serialize> ScimJson<T> {
    pub fn ok(body: T) -> Self {
        Self {
            body,
            status: StatusCode::OK,
            location: None,
        }
    }

    /// A 201 response carrying a `Location` header.
    pub fn created(body: T, location: Option<&str>) -> Self {
        Self {
            body,
            status: StatusCode::CREATED,
            location: location.map(str::to_string),
        }
    }
}

impl<T: Serialize> IntoResponse for ScimJson<T> {
    fn into_response(self) -> Response {
        let body = match serde_json::to_vec(&self.body) {
            Ok(body) => body,
            Err(e) => return ScimError::from(e).into_response(),
        };

        let mut response = (self.status, scim_content_type(), body).into_response();
        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(e) => warn!("Dropping invalid Location header '{}': {}", location, e),
            }
        }
        response
    }
}

/// SCIM error body (RFC 7644 §3.12).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimErrorResponse {
    pub schemas: Vec<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scim_type: Option<&'static str>,
    pub detail: String,
}

impl From<&ScimError> for ScimErrorResponse {
    fn from(error: &ScimError) -> Self {
        let detail = if error.is_server_error() {
            SERVER_ERROR_DETAIL.to_string()
        } else {
            error.to_string()
        };

        Self {
            schemas: vec![ERROR_SCHEMA.to_string()],
            status: error.status_code().to_string(),
            scim_type: error.scim_type(),
            detail,
        }
    }
}

impl IntoResponse for ScimError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!("Request failed: {}", self);
        }

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ScimErrorResponse::from(&self);
        match serde_json::to_vec(&body) {
            Ok(body) => (status, scim_content_type(), body).into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

fn scim_content_type() -> [(header::HeaderName, HeaderValue); 1] {
    [(header::CONTENT_TYPE, HeaderValue::from_static(SCIM_CONTENT_TYPE))]
}
