//! REST handlers for per-environment Helm configuration.
//!
//! `save` resolves the caller before it looks at the body; `get_by_environment`
//! is public unless `api.read_requires_auth` is set.
use crate::handlers::response::write_json_resp;
use crate::handlers::state::AppState;
use crate::models::cluster_helm_config::{ClusterHelmConfigRequest, ValidationError};
use crate::services::cluster_helm_config::ServiceError;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const UNAUTHORIZED_USER: &str = "Unauthorized User";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed request body: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Parse and validate a save body.
pub fn decode_request(body: &[u8]) -> Result<ClusterHelmConfigRequest, DecodeError> {
    let request: ClusterHelmConfigRequest = serde_json::from_slice(body)?;
    Ok(request.validate()?)
}

/// Resolve the calling user, or build the 401 response to return instead.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<i32, Response> {
    match state.user_service.get_logged_in_user(headers).await {
        Ok(user_id) if user_id != 0 => Ok(user_id),
        Ok(_) => {
            warn!("⚠️ Token resolved to an empty user id");
            Err(write_json_resp::<()>(
                None,
                Some(UNAUTHORIZED_USER),
                None,
                StatusCode::UNAUTHORIZED,
            ))
        }
        Err(e) => {
            debug!(error = %e, "authentication failed");
            Err(write_json_resp::<()>(
                Some(&e),
                Some(UNAUTHORIZED_USER),
                None,
                StatusCode::UNAUTHORIZED,
            ))
        }
    }
}

/// Handles `POST /cluster/helm/config`.
///
/// 401 when the caller is unknown, 400 when the body does not decode or
/// validate, 500 when the service fails, 201 with a null result otherwise.
pub async fn save(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let user_id = match authenticate(&state, &headers).await {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, user_id, "❌ request err, Save");
            return write_json_resp::<()>(Some(&e), None, None, StatusCode::BAD_REQUEST);
        }
    };
    debug!(environment = %request.environment, user_id, "request payload, Save");

    let environment = request.environment.clone();
    match state.helm_config_service.save(request, user_id).await {
        Ok(record) => {
            info!(
                "✅ Helm config {} saved for environment {} by user {}",
                record.id, record.environment, user_id
            );
            write_json_resp::<()>(None, None, None, StatusCode::CREATED)
        }
        Err(e) => {
            error!(error = %e, %environment, user_id, "❌ service err, Save");
            write_json_resp::<()>(Some(&e), None, None, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handles `GET /cluster/helm/config/{environment}`.
pub async fn get_by_environment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(environment): Path<String>,
) -> Response {
    if state.policy.read_requires_auth {
        if let Err(response) = authenticate(&state, &headers).await {
            return response;
        }
    }

    match state
        .helm_config_service
        .find_one_by_environment(&environment)
        .await
    {
        Ok(record) => write_json_resp(None, None, Some(record), StatusCode::OK),
        Err(e @ ServiceError::NotFound(_)) if state.policy.not_found_as_404 => {
            debug!(%environment, "no helm config for environment");
            write_json_resp::<()>(Some(&e), None, None, StatusCode::NOT_FOUND)
        }
        Err(e) => {
            error!(error = %e, %environment, "❌ service err, GetByEnvironment");
            write_json_resp::<()>(Some(&e), None, None, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
