use axum::{Json, body::to_bytes, extract::{Request, State}};
use std::sync::Arc;

use crate::credentials::generate_token;
use crate::error::ApiError;
use crate::handlers::MAX_BODY_BYTES;
use crate::metrics::{LOGIN_FAILURE, LOGIN_SUCCESS};
use crate::models::{LoginRequest, LoginResponse};
use crate::state::AppState;

// Unknown names and wrong codes share one error so callers can't probe for names.
// The token is not stored anywhere; nothing downstream checks it.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to read login request body");
            ApiError::InternalError
        })?;
    let req = LoginRequest::parse(&body)?;

    if !state.credentials.verify(&req.name, &req.code) {
        LOGIN_FAILURE.inc();
        tracing::info!(name = %req.name, "login rejected");
        return Err(ApiError::InvalidCredential);
    }

    LOGIN_SUCCESS.inc();
    tracing::info!(name = %req.name, "login accepted");

    Ok(Json(LoginResponse {
        success: true,
        nome: req.name,
        token: generate_token(),
        message: "Login realizado com sucesso",
    }))
}
