pub mod auth;
pub mod pessoa;
pub mod produto;
pub mod relatorio;
pub mod venda;
