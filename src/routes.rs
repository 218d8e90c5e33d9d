// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

async fn api_status() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "API de Gestão de Vendas",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth",
            "clientes": "/api/clientes",
            "fabricantes": "/api/fabricantes",
            "produtos": "/api/produtos",
            "vendas": "/api/vendas",
            "docs": "/api-docs"
        }
    }))
}

pub fn create_router(app_state: AppState) -> Router {
    let guard = || axum_middleware::from_fn_with_state(app_state.clone(), auth_guard);

    // Registro e login são públicos; o perfil exige token
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .merge(
            Router::new()
                .route("/profile", get(handlers::auth::profile))
                .layer(guard()),
        );

    let cliente_routes = Router::new()
        .route(
            "/",
            get(handlers::clientes::list_clientes).post(handlers::clientes::create_cliente),
        )
        .route(
            "/{id}",
            get(handlers::clientes::get_cliente)
                .put(handlers::clientes::update_cliente)
                .delete(handlers::clientes::delete_cliente),
        )
        .layer(guard());

    let fabricante_routes = Router::new()
        .route(
            "/",
            get(handlers::fabricantes::list_fabricantes).post(handlers::fabricantes::create_fabricante),
        )
        .route(
            "/{id}",
            get(handlers::fabricantes::get_fabricante)
                .put(handlers::fabricantes::update_fabricante)
                .delete(handlers::fabricantes::delete_fabricante),
        )
        .layer(guard());

    let produto_routes = Router::new()
        .route(
            "/",
            get(handlers::produtos::list_produtos).post(handlers::produtos::create_produto),
        )
        .route(
            "/{id}",
            get(handlers::produtos::get_produto)
                .put(handlers::produtos::update_produto)
                .delete(handlers::produtos::delete_produto),
        )
        .layer(guard());

    let venda_routes = Router::new()
        .route("/summary/month/{year}", get(handlers::vendas::summary_by_month))
        .route("/summary/cliente", get(handlers::vendas::summary_by_cliente))
        .route(
            "/",
            get(handlers::vendas::list_vendas).post(handlers::vendas::create_venda),
        )
        .route(
            "/{id}",
            get(handlers::vendas::get_venda)
                .put(handlers::vendas::update_venda)
                .delete(handlers::vendas::delete_venda),
        )
        .layer(guard());

    Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api", get(api_status))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/clientes", cliente_routes)
        .nest("/api/fabricantes", fabricante_routes)
        .nest("/api/produtos", produto_routes)
        .nest("/api/vendas", venda_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::{
        common::db_utils::USUARIO_DUPLICADO,
        config::Config,
        db::{memory::MemoryStore, Database},
    };

    fn app_with(config: Config) -> Router {
        create_router(AppState::new(config, Database::Memory(MemoryStore::new())))
    }

    fn app() -> Router {
        app_with(Config::for_tests())
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn register(app: &Router, username: &str, email: &str) -> (StatusCode, Value) {
        let body = json!({ "username": username, "email": email, "password": "segredo123" });
        send(app, Method::POST, "/api/auth/register", None, Some(body)).await
    }

    async fn token(app: &Router) -> String {
        let (status, body) = register(app, "maria", "maria@example.com").await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn create(app: &Router, token: &str, uri: &str, body: Value) -> String {
        let (status, body) = send(app, Method::POST, uri, Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn cliente(app: &Router, token: &str) -> String {
        let body = json!({
            "nome": "João Silva",
            "telefone": "(61) 99999-9999",
            "endereco": "Rua das Flores, 123, Brasília-DF",
            "email": "joao@email.com",
            "cpf": "529.982.247-25",
            "forma_pagamento": "Pix",
            "rg": "1234567"
        });
        create(app, token, "/api/clientes", body).await
    }

    async fn produto(app: &Router, token: &str) -> String {
        let fabricante = json!({
            "nome": "Tech Solutions",
            "telefone": "(11) 3333-3333",
            "endereco": "Av. Paulista, 1000, São Paulo-SP",
            "email": "contato@tech.com",
            "razao_social": "Tech Solutions Ltda",
            "cnpj": "45.997.418/0001-53",
            "contato": "Carlos"
        });
        let fabr = create(app, token, "/api/fabricantes", fabricante).await;

        let body = json!({
            "nome": "Notebook",
            "valor_custo": 3000,
            "valor_venda": 4500,
            "categoria": "Informática",
            "fabr": fabr
        });
        create(app, token, "/api/produtos", body).await
    }

    fn venda(identificador: &str, dia: i32, mes: i32, total: i64, clnt: &str, prod: &str) -> Value {
        json!({
            "identificador": identificador,
            "dia": dia,
            "mes": mes,
            "ano": 2025,
            "valor_total": total,
            "clnt": clnt,
            "prod": prod
        })
    }

    #[tokio::test]
    async fn status_and_health_are_public() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/api", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["vendas"], "/api/vendas");

        let response = app
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn resources_require_a_token() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/api/clientes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, Method::GET, "/api/vendas", Some("nao-e-um-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_first_user_still_logs_in() {
        let app = app();
        token(&app).await;

        let (status, body) = register(&app, "outra", "maria@example.com").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], USUARIO_DUPLICADO);

        let login = json!({ "email": "maria@example.com", "password": "segredo123" });
        let (status, body) = send(&app, Method::POST, "/api/auth/login", None, Some(login)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["username"], "maria");
    }

    #[tokio::test]
    async fn profile_returns_the_token_owner() {
        let app = app();
        let token = token(&app).await;

        let (status, body) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "maria@example.com");
        assert!(body["data"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request() {
        let app = app();
        let token = token(&app).await;

        let (status, body) = send(&app, Method::GET, "/api/clientes/abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn referenced_records_cannot_be_deleted() {
        let app = app();
        let token = token(&app).await;
        let clnt = cliente(&app, &token).await;
        let prod = produto(&app, &token).await;
        let venda_id = create(&app, &token, "/api/vendas", venda("V001", 15, 6, 4500, &clnt, &prod)).await;

        let cliente_uri = format!("/api/clientes/{}", clnt);
        let (status, body) = send(&app, Method::DELETE, &cliente_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Não é possível excluir cliente com vendas associadas");
        assert_eq!(send(&app, Method::GET, &cliente_uri, Some(&token), None).await.0, StatusCode::OK);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/produtos/{}", prod), Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::DELETE, &format!("/api/vendas/{}", venda_id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": {} }));

        let (status, _) = send(&app, Method::DELETE, &cliente_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(send(&app, Method::GET, &cliente_uri, Some(&token), None).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deletes_cascade_manually_from_venda_to_fabricante() {
        let app = app();
        let token = token(&app).await;
        let clnt = cliente(&app, &token).await;
        let prod = produto(&app, &token).await;
        let venda_id = create(&app, &token, "/api/vendas", venda("V001", 15, 6, 4500, &clnt, &prod)).await;

        let produto_uri = format!("/api/produtos/{}", prod);
        let (_, body) = send(&app, Method::GET, &produto_uri, Some(&token), None).await;
        let fabricante_uri = format!("/api/fabricantes/{}", body["data"]["fabr"].as_str().unwrap());

        let (status, body) = send(&app, Method::DELETE, &fabricante_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Não é possível excluir fabricante com produtos associados");
        assert_eq!(send(&app, Method::GET, &fabricante_uri, Some(&token), None).await.0, StatusCode::OK);

        let (status, body) = send(&app, Method::DELETE, &produto_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Não é possível excluir produto com vendas associadas");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/vendas/{}", venda_id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::DELETE, &produto_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "data": {} }));
        assert_eq!(send(&app, Method::GET, &produto_uri, Some(&token), None).await.0, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &fabricante_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(send(&app, Method::GET, &fabricante_uri, Some(&token), None).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn monthly_summary_groups_by_month() {
        let app = app();
        let token = token(&app).await;
        let clnt = cliente(&app, &token).await;
        let prod = produto(&app, &token).await;

        for (id, dia, mes, total) in [("V001", 10, 6, 2000), ("V002", 20, 6, 1500), ("V003", 5, 7, 800)] {
            create(&app, &token, "/api/vendas", venda(id, dia, mes, total, &clnt, &prod)).await;
        }

        let (status, body) = send(&app, Method::GET, "/api/vendas/summary/month/2025", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["month"], 6);
        assert_eq!(body["data"][0]["count"], 2);
        assert_eq!(body["data"][0]["totalValue"].as_f64(), Some(3500.0));
        assert_eq!(body["data"][1]["month"], 7);
        assert_eq!(body["data"][1]["count"], 1);

        let (status, body) = send(&app, Method::GET, "/api/vendas/summary/cliente", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["clientName"], "João Silva");
        assert_eq!(body["data"][0]["count"], 3);

        let (status, _) = send(&app, Method::GET, "/api/vendas/summary/month/abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn impossible_date_is_rejected() {
        let app = app();
        let token = token(&app).await;
        let clnt = cliente(&app, &token).await;
        let prod = produto(&app, &token).await;

        let mut body = venda("V001", 31, 4, 100, &clnt, &prod);
        body["ano"] = json!(2024);
        let (status, body) = send(&app, Method::POST, "/api/vendas", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["dia"].is_array());
    }

    #[tokio::test]
    async fn sale_price_must_exceed_cost() {
        let app = app();
        let token = token(&app).await;
        let prod = produto(&app, &token).await;

        let uri = format!("/api/produtos/{}", prod);
        let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "valor_venda": 3000 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["valor_venda"].is_array());

        let (status, body) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "valor_venda": 3000.004 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["valor_venda"].is_array());

        let (status, _) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "valor_venda": 3000.01 }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn list_filters_and_bad_queries() {
        let app = app();
        let token = token(&app).await;
        cliente(&app, &token).await;

        let (status, body) = send(&app, Method::GET, "/api/clientes?search=SILVA", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);

        let (status, _) = send(&app, Method::GET, "/api/clientes?sort=senha", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/api/clientes?limit=abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let uri = "/api/vendas?dataInicio=2025-13-01&dataFim=2025-12-31";
        let (status, body) = send(&app, Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Formato de data inválido");
    }

    #[tokio::test]
    async fn malformed_json_uses_the_error_envelope() {
        let app = app();
        let token = token(&app).await;

        let request = Request::post("/api/clientes")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ nome: "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn admin_only_deletes_forbids_regular_users() {
        let mut config = Config::for_tests();
        config.admin_only_deletes = true;
        let app = app_with(config);
        let token = token(&app).await;
        let clnt = cliente(&app, &token).await;

        let (status, _) = send(&app, Method::DELETE, &format!("/api/clientes/{}", clnt), Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = send(&app(), Method::GET, "/api-docs/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/api/vendas/summary/month/{year}").is_some());
    }
}
