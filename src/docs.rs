// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Gestão de Vendas", description = "Clientes, fabricantes, produtos e vendas"),
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::profile,

        // --- Clientes ---
        handlers::clientes::list_clientes,
        handlers::clientes::get_cliente,
        handlers::clientes::create_cliente,
        handlers::clientes::update_cliente,
        handlers::clientes::delete_cliente,

        // --- Fabricantes ---
        handlers::fabricantes::list_fabricantes,
        handlers::fabricantes::get_fabricante,
        handlers::fabricantes::create_fabricante,
        handlers::fabricantes::update_fabricante,
        handlers::fabricantes::delete_fabricante,

        // --- Produtos ---
        handlers::produtos::list_produtos,
        handlers::produtos::get_produto,
        handlers::produtos::create_produto,
        handlers::produtos::update_produto,
        handlers::produtos::delete_produto,

        // --- Vendas ---
        handlers::vendas::list_vendas,
        handlers::vendas::get_venda,
        handlers::vendas::create_venda,
        handlers::vendas::update_venda,
        handlers::vendas::delete_venda,
        handlers::vendas::summary_by_month,
        handlers::vendas::summary_by_cliente,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Pessoas ---
            models::pessoa::FormaPagamento,
            models::pessoa::DadosCliente,
            models::pessoa::DadosFabricante,
            models::pessoa::TipoPessoa,
            models::pessoa::Pessoa,
            models::pessoa::ClientePayload,
            models::pessoa::FabricantePayload,
            models::pessoa::PessoaPatch,

            // --- Produtos ---
            models::produto::Produto,
            models::produto::ProdutoPayload,
            models::produto::ProdutoPatch,

            // --- Vendas ---
            models::venda::Venda,
            models::venda::VendaPayload,
            models::venda::VendaPatch,
            models::relatorio::ResumoMensal,
            models::relatorio::ResumoCliente,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Clientes", description = "Cadastro de Clientes"),
        (name = "Fabricantes", description = "Cadastro de Fabricantes"),
        (name = "Produtos", description = "Catálogo de Produtos"),
        (name = "Vendas", description = "Registro de Vendas e Resumos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
