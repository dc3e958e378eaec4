use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Seconds a rate-limited caller is told to wait. Fixed, not derived from the window.
pub const RETRY_AFTER_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Nome e código são obrigatórios")]
    MissingField,

    #[error("Nome ou código inválido")]
    InvalidCredential,

    #[error("Dados inválidos")]
    InvalidInput,

    #[error("Formato de palpites inválido")]
    InvalidFormat,

    #[error("Número excessivo de palpites")]
    TooManyGuesses,

    #[error("Valores de gols inválidos")]
    InvalidGuessValue,

    #[error("Muitas requisições. Tente novamente em 1 hora.")]
    RateLimited,

    #[error("Apps Script URL não configurada")]
    ConfigurationError,

    #[error("Erro ao salvar palpites")]
    UpstreamError(String),

    #[error("Erro interno do servidor")]
    InternalError,

    #[error("Método não permitido")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField
            | ApiError::InvalidInput
            | ApiError::InvalidFormat
            | ApiError::TooManyGuesses
            | ApiError::InvalidGuessValue => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredential => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ConfigurationError
            | ApiError::UpstreamError(_)
            | ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        match self {
            ApiError::RateLimited => {
                let body = json!({ "error": message, "retryAfter": RETRY_AFTER_SECS });
                let mut response = (status, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
                response
            }
            ApiError::UpstreamError(details) => {
                (status, Json(json!({ "error": message, "details": details }))).into_response()
            }
            _ => (status, Json(json!({ "error": message }))).into_response(),
        }
    }
}
