use axum::{Json, body::to_bytes, extract::{Request, State}};
use std::sync::Arc;

use crate::client_ip::ClientIp;
use crate::error::ApiError;
use crate::handlers::MAX_BODY_BYTES;
use crate::metrics::{GUESSES_FORWARDED, RATE_LIMITED, SAVES_TOTAL};
use crate::models::{SaveRequest, SaveResponse};
use crate::state::AppState;

// The body is taken as the raw request so nothing reads it before the rate limit check.
pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    request: Request,
) -> Result<Json<SaveResponse>, ApiError> {
    if !state.rate_limiter.check_and_consume(&ip) {
        RATE_LIMITED.inc();
        tracing::warn!(%ip, "rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %ip, "failed to read save request body");
            ApiError::InternalError
        })?;

    let req = SaveRequest::parse(&body, state.max_guesses)?;
    let count = req.count();

    state.forwarder.forward(&req.forward_payload()).await?;

    SAVES_TOTAL.inc();
    GUESSES_FORWARDED.inc_by(count as f64);
    tracing::info!(
        timestamp = %chrono::Utc::now().to_rfc3339(),
        participant = %req.participant,
        count,
        %ip,
        "guesses saved"
    );

    Ok(Json(SaveResponse {
        success: true,
        message: "Palpites salvos com sucesso",
        count,
    }))
}
