pub mod database;
pub mod memory;
pub mod pessoa_repo;
pub mod produto_repo;
pub mod repository;
pub mod user_repo;
pub mod venda_repo;

pub use database::Database;
