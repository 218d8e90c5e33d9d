// src/handlers/clientes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::{
        error::ApiError,
        extract::{ApiJson, ApiQuery},
        query::{parse_id, ListQuery},
        response::ApiResponse,
    },
    config::AppState,
    models::pessoa::{ClientePayload, Pessoa, PessoaPatch},
};

// GET /api/clientes
#[utoipa::path(
    get,
    path = "/api/clientes",
    tag = "Clientes",
    params(ListQuery),
    responses(
        (status = 200, description = "Lista de clientes", body = Vec<Pessoa>),
        (status = 400, description = "Parâmetros de listagem inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clientes(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (clientes, total) = app_state
        .cliente_service
        .list(&query)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok(Json(ApiResponse::page(clientes, total)))
}

// GET /api/clientes/{id}
#[utoipa::path(
    get,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "ID do Cliente")),
    responses(
        (status = 200, description = "Cliente encontrado", body = Pessoa),
        (status = 400, description = "ID inválido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_cliente(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    let cliente = app_state
        .cliente_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(cliente)))
}

// POST /api/clientes
#[utoipa::path(
    post,
    path = "/api/clientes",
    tag = "Clientes",
    request_body = ClientePayload,
    responses(
        (status = 201, description = "Cliente criado", body = Pessoa),
        (status = 400, description = "Dados inválidos ou CPF já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_cliente(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<ClientePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let cliente = app_state
        .cliente_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(cliente))))
}

// PUT /api/clientes/{id}
#[utoipa::path(
    put,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "ID do Cliente")),
    request_body = PessoaPatch,
    responses(
        (status = 200, description = "Cliente atualizado", body = Pessoa),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_cliente(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<PessoaPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    let cliente = app_state
        .cliente_service
        .update(id, patch)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(cliente)))
}

// DELETE /api/clientes/{id}
#[utoipa::path(
    delete,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "ID do Cliente")),
    responses(
        (status = 200, description = "Cliente excluído"),
        (status = 400, description = "Cliente possui vendas associadas"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_cliente(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    app_state
        .cliente_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(json!({}))))
}
