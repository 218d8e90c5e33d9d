// src/handlers/fabricantes.rs

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
    models::pessoa::{FabricantePayload, Pessoa, PessoaPatch},
};

// GET /api/fabricantes
#[utoipa::path(
    get,
    path = "/api/fabricantes",
    tag = "Fabricantes",
    params(ListQuery),
    responses(
        (status = 200, description = "Lista de fabricantes", body = Vec<Pessoa>),
        (status = 400, description = "Parâmetros de listagem inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_fabricantes(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (fabricantes, total) = app_state
        .fabricante_service
        .list(&query)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok(Json(ApiResponse::page(fabricantes, total)))
}

// GET /api/fabricantes/{id}
#[utoipa::path(
    get,
    path = "/api/fabricantes/{id}",
    tag = "Fabricantes",
    params(("id" = String, Path, description = "ID do Fabricante")),
    responses(
        (status = 200, description = "Fabricante encontrado", body = Pessoa),
        (status = 400, description = "ID inválido"),
        (status = 404, description = "Fabricante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_fabricante(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    let fabricante = app_state
        .fabricante_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(fabricante)))
}

// POST /api/fabricantes
#[utoipa::path(
    post,
    path = "/api/fabricantes",
    tag = "Fabricantes",
    request_body = FabricantePayload,
    responses(
        (status = 201, description = "Fabricante criado", body = Pessoa),
        (status = 400, description = "Dados inválidos ou CNPJ já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_fabricante(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<FabricantePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let fabricante = app_state
        .fabricante_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(fabricante))))
}

// PUT /api/fabricantes/{id}
#[utoipa::path(
    put,
    path = "/api/fabricantes/{id}",
    tag = "Fabricantes",
    params(("id" = String, Path, description = "ID do Fabricante")),
    request_body = PessoaPatch,
    responses(
        (status = 200, description = "Fabricante atualizado", body = Pessoa),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Fabricante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_fabricante(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<PessoaPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    let fabricante = app_state
        .fabricante_service
        .update(id, patch)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(fabricante)))
}

// DELETE /api/fabricantes/{id}
#[utoipa::path(
    delete,
    path = "/api/fabricantes/{id}",
    tag = "Fabricantes",
    params(("id" = String, Path, description = "ID do Fabricante")),
    responses(
        (status = 200, description = "Fabricante excluído"),
        (status = 400, description = "Fabricante possui produtos associados"),
        (status = 404, description = "Fabricante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_fabricante(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    app_state
        .fabricante_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(json!({}))))
}
