pub mod auth;
pub mod clientes;
pub mod fabricantes;
pub mod produtos;
pub mod vendas;
