// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    models::auth::User,
};

use super::pipeline::{self, AuthContext, ADMIN, AUTHENTICATED};

/// O usuário dono do token, já conferido no armazenamento.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

// Protege as rotas de recursos. Com `admin_only_deletes`, DELETE exige administrador.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let config = &app_state.config;

    let stages = if config.admin_only_deletes && request.method() == Method::DELETE {
        ADMIN
    } else {
        AUTHENTICATED
    };

    let claims = pipeline::run(stages, config, AuthContext::from_headers(request.headers()))
        .and_then(AuthContext::into_claims)
        .map_err(|e| e.to_api_error(config))?;

    // O token pode sobreviver ao usuário
    let user = app_state
        .auth_service
        .find_user(claims.sub)
        .await
        .map_err(|e| e.to_api_error(config))?
        .ok_or_else(|| {
            AppError::Unauthorized("Token inválido: usuário não encontrado".into()).to_api_error(config)
        })?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Acesso negado. Token não fornecido."))
    }
}
