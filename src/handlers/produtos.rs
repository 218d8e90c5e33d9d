// src/handlers/produtos.rs

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
        query::{parse_id, ListQuery, ProdutoFilter},
        response::ApiResponse,
    },
    config::AppState,
    models::produto::{Produto, ProdutoPatch, ProdutoPayload},
};

// GET /api/produtos
#[utoipa::path(
    get,
    path = "/api/produtos",
    tag = "Produtos",
    params(ListQuery, ProdutoFilter),
    responses(
        (status = 200, description = "Lista de produtos", body = Vec<Produto>),
        (status = 400, description = "Parâmetros de listagem inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_produtos(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
    ApiQuery(filter): ApiQuery<ProdutoFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let (produtos, total) = app_state
        .produto_service
        .list(&query, &filter)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok(Json(ApiResponse::page(produtos, total)))
}

// GET /api/produtos/{id}
#[utoipa::path(
    get,
    path = "/api/produtos/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto encontrado", body = Produto),
        (status = 400, description = "ID inválido"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_produto(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    let produto = app_state
        .produto_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(produto)))
}

// POST /api/produtos
#[utoipa::path(
    post,
    path = "/api/produtos",
    tag = "Produtos",
    request_body = ProdutoPayload,
    responses(
        (status = 201, description = "Produto criado", body = Produto),
        (status = 400, description = "Dados inválidos ou fabricante inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_produto(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<ProdutoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let produto = app_state
        .produto_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(produto))))
}

// PUT /api/produtos/{id}
#[utoipa::path(
    put,
    path = "/api/produtos/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do Produto")),
    request_body = ProdutoPatch,
    responses(
        (status = 200, description = "Produto atualizado", body = Produto),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_produto(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProdutoPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    let produto = app_state
        .produto_service
        .update(id, patch)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(produto)))
}

// DELETE /api/produtos/{id}
#[utoipa::path(
    delete,
    path = "/api/produtos/{id}",
    tag = "Produtos",
    params(("id" = String, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto excluído"),
        (status = 400, description = "Produto possui vendas associadas"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_produto(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    app_state
        .produto_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(json!({}))))
}
