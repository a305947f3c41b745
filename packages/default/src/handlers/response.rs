//! Uniform JSON envelope for every API response.
//!
//! ```json
//! { "code": 400, "status": "Bad Request",
//!   "errors": [{ "code": "400", "internalMessage": "...", "userMessage": "..." }] }
//! ```
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub code: String,
    pub internal_message: String,
    pub user_message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub status: String,
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiErrorBody>>,
}

impl<T: Serialize> ApiResponse<T> {
    /// `user_message` defaults to the error text when not given. A message
    /// without an error still becomes an error entry on non-success statuses.
    pub fn new(
        err: Option<&dyn Display>,
        user_message: Option<&str>,
        result: Option<T>,
        status: StatusCode,
    ) -> Self {
        let error_body = match (err, user_message) {
            (Some(err), message) => {
                let internal = err.to_string();
                Some(ApiErrorBody {
                    code: status.as_u16().to_string(),
                    user_message: message.map(str::to_string).unwrap_or_else(|| internal.clone()),
                    internal_message: internal,
                })
            }
            (None, Some(message)) if !status.is_success() => Some(ApiErrorBody {
                code: status.as_u16().to_string(),
                internal_message: message.to_string(),
                user_message: message.to_string(),
            }),
            (None, _) => None,
        };

        Self {
            code: status.as_u16(),
            status: status.canonical_reason().unwrap_or("Unknown").to_string(),
            result,
            errors: error_body.map(|e| vec![e]),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Write `result` (or the error) wrapped in the standard envelope with `status`.
pub fn write_json_resp<T: Serialize>(
    err: Option<&dyn Display>,
    user_message: Option<&str>,
    result: Option<T>,
    status: StatusCode,
) -> Response {
    ApiResponse::new(err, user_message, result, status).into_response()
}
