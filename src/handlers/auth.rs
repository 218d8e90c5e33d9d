// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{error::ApiError, extract::ApiJson, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, User},
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário registrado", body = AuthResponse),
        (status = 400, description = "Dados inválidos ou usuário já existente")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = app_state
        .auth_service
        .register(payload)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(auth).with_message("Usuário registrado com sucesso")),
    ))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = app_state
        .auth_service
        .login(payload)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok(Json(ApiResponse::ok(auth).with_message("Login realizado com sucesso")))
}

// GET /api/auth/profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .auth_service
        .profile(user.id)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok(Json(ApiResponse::ok(user)))
}
