pub mod auth;
pub mod cliente_service;
pub mod fabricante_service;
pub mod integridade;
pub mod produto_service;
pub mod relatorio_service;
pub mod seed;
pub mod venda_service;
