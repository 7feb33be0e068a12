//! Request-facing failures and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::http::response::{ApiResponse, Popup};
use crate::security::CsrfViolation;
use crate::validation::FieldErrors;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Forbidden: {0}")]
    Forbidden(#[from] CsrfViolation),

    #[error("Rate limit exceeded for {client}")]
    RateLimited { client: String },

    #[error("Template error: {0}")]
    Render(#[from] tera::Error),
}

impl SiteError {
    pub fn status(&self) -> StatusCode {
        match self {
            SiteError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            SiteError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SiteError::Forbidden(_) => StatusCode::FORBIDDEN,
            SiteError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            SiteError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            SiteError::MalformedPayload(_) => {
                ApiResponse::failed(Popup::error("Erro", "JSON inválido."))
            }
            SiteError::Validation(errors) => ApiResponse::invalid(
                errors,
                Popup::error("Erro de validação", "Verifique os campos preenchidos."),
            ),
            SiteError::Forbidden(CsrfViolation::UntrustedOrigin { .. }) => ApiResponse::failed(
                Popup::error("Requisição bloqueada", "Origem não autorizada."),
            ),
            SiteError::Forbidden(CsrfViolation::UntrustedReferer { .. }) => ApiResponse::failed(
                Popup::error("Requisição suspeita", "Referer inválido detectado."),
            ),
            SiteError::RateLimited { .. } => ApiResponse::failed(Popup::error(
                "Limite de requisições",
                "Você excedeu o limite de requisições. Tente novamente em breve.",
            )),
            SiteError::Render(e) => {
                tracing::error!(error = ?e, "Page rendering failed");
                return (status, "Erro ao carregar a página").into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}
