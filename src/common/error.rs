// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

// Todas as falhas da aplicação passam por aqui antes de virar resposta HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Id malformado, query inválida, JSON ilegível
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Duplicate(String),

    // Exclusão bloqueada ou registro referenciado inexistente
    #[error("{0}")]
    ReferenceConflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Acesso negado. Permissão de administrador necessária.")]
    Forbidden,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(entidade: &str) -> Self {
        AppError::NotFound(format!("{} não encontrado", entidade))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::Duplicate(_)
            | AppError::ReferenceConflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para o envelope de resposta. `detail` só aparece em desenvolvimento.
    pub fn to_api_error(&self, config: &Config) -> ApiError {
        let status = self.status();

        let (message, errors) = match self {
            AppError::ValidationError(errors) => {
                let mut details: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("{} inválido", field))
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (
                    "Um ou mais campos são inválidos.".to_string(),
                    serde_json::to_value(details).ok(),
                )
            }
            AppError::InvalidCredentials => ("Credenciais inválidas".to_string(), None),
            e if status.is_server_error() => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ("Erro no servidor".to_string(), None)
            }
            e => (e.to_string(), None),
        };

        let detail = (config.is_development() && status.is_server_error()).then(|| self.to_string());

        ApiError { status, message, errors, detail }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// O erro já traduzido para HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<Value>,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError { status, message: message.into(), errors: None, detail: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.message,
            errors: self.errors,
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::field_error;

    #[test]
    fn maps_each_kind_to_its_status() {
        assert_eq!(AppError::Duplicate("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ReferenceConflict("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("Cliente").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let config = Config::for_tests();
        let api = AppError::from(field_error("cpf", "invalid_cpf", "CPF inválido")).to_api_error(&config);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.errors.unwrap()["cpf"][0], "CPF inválido");
    }

    #[test]
    fn internal_detail_only_in_development() {
        let mut config = Config::for_tests();
        let err = AppError::InternalServerError(anyhow::anyhow!("conexão recusada"));

        let dev = err.to_api_error(&config);
        assert_eq!(dev.message, "Erro no servidor");
        assert!(dev.detail.unwrap().contains("conexão recusada"));

        config.app_env = crate::config::AppEnv::Production;
        assert!(err.to_api_error(&config).detail.is_none());
    }
}
