// src/handlers/vendas.rs

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
        query::{parse_id, ListQuery, VendaFilter},
        response::ApiResponse,
    },
    config::AppState,
    models::{
        relatorio::{ResumoCliente, ResumoMensal},
        venda::{Venda, VendaPatch, VendaPayload},
    },
    services::relatorio_service::parse_ano,
};

// GET /api/vendas
#[utoipa::path(
    get,
    path = "/api/vendas",
    tag = "Vendas",
    params(ListQuery, VendaFilter),
    responses(
        (status = 200, description = "Lista de vendas", body = Vec<Venda>),
        (status = 400, description = "Parâmetros de listagem inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_vendas(
    State(app_state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
    ApiQuery(filter): ApiQuery<VendaFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let (vendas, total) = app_state
        .venda_service
        .list(&query, &filter)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok(Json(ApiResponse::page(vendas, total)))
}

// GET /api/vendas/{id}
#[utoipa::path(
    get,
    path = "/api/vendas/{id}",
    tag = "Vendas",
    params(("id" = String, Path, description = "ID da Venda")),
    responses(
        (status = 200, description = "Venda encontrada", body = Venda),
        (status = 400, description = "ID inválido"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_venda(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    let venda = app_state
        .venda_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(venda)))
}

// POST /api/vendas
#[utoipa::path(
    post,
    path = "/api/vendas",
    tag = "Vendas",
    request_body = VendaPayload,
    responses(
        (status = 201, description = "Venda registrada", body = Venda),
        (status = 400, description = "Dados inválidos, identificador duplicado ou referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_venda(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<VendaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let venda = app_state
        .venda_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(venda))))
}

// PUT /api/vendas/{id}
#[utoipa::path(
    put,
    path = "/api/vendas/{id}",
    tag = "Vendas",
    params(("id" = String, Path, description = "ID da Venda")),
    request_body = VendaPatch,
    responses(
        (status = 200, description = "Venda atualizada", body = Venda),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_venda(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<VendaPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    let venda = app_state
        .venda_service
        .update(id, patch)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(venda)))
}

// DELETE /api/vendas/{id}
#[utoipa::path(
    delete,
    path = "/api/vendas/{id}",
    tag = "Vendas",
    params(("id" = String, Path, description = "ID da Venda")),
    responses(
        (status = 200, description = "Venda excluída"),
        (status = 400, description = "ID inválido"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_venda(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let id = parse_id(&id).map_err(|e| e.to_api_error(config))?;

    app_state
        .venda_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::ok(json!({}))))
}

// GET /api/vendas/summary/month/{year}
#[utoipa::path(
    get,
    path = "/api/vendas/summary/month/{year}",
    tag = "Vendas",
    params(("year" = String, Path, description = "Ano do resumo", example = "2025")),
    responses(
        (status = 200, description = "Total e quantidade de vendas por mês", body = Vec<ResumoMensal>),
        (status = 400, description = "Ano inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn summary_by_month(
    State(app_state): State<AppState>,
    Path(year): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let config = &app_state.config;
    let ano = parse_ano(&year).map_err(|e| e.to_api_error(config))?;

    let resumo = app_state
        .relatorio_service
        .resumo_mensal(ano)
        .await
        .map_err(|e| e.to_api_error(config))?;

    Ok(Json(ApiResponse::list(resumo)))
}

// GET /api/vendas/summary/cliente
#[utoipa::path(
    get,
    path = "/api/vendas/summary/cliente",
    tag = "Vendas",
    responses(
        (status = 200, description = "Total e quantidade de vendas por cliente", body = Vec<ResumoCliente>)
    ),
    security(("api_jwt" = []))
)]
pub async fn summary_by_cliente(State(app_state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let resumo = app_state
        .relatorio_service
        .resumo_por_cliente()
        .await
        .map_err(|e| e.to_api_error(&app_state.config))?;

    Ok(Json(ApiResponse::list(resumo)))
}
