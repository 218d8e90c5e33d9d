// src/db/repository.rs
//
// Contratos de acesso a dados. Cada backend (Postgres, memória) implementa todos.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{error::AppError, query::FindOptions},
    models::{
        auth::User,
        pessoa::Pessoa,
        produto::Produto,
        relatorio::{ResumoCliente, ResumoMensal},
        venda::Venda,
    },
};

/// CRUD genérico, comum a todas as entidades.
#[async_trait]
pub trait Repository<T>: Send + Sync {
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, AppError>;

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<T>, AppError>;

    /// Grava o registro já mesclado. `None` se o id não existe mais.
    async fn update_by_id(&self, id: Uuid, entity: &T) -> Result<Option<T>, AppError>;

    /// `true` se algo foi removido.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError>;

    async fn count(&self) -> Result<u64, AppError>;

    /// Busca por substring, sem diferenciar maiúsculas.
    async fn search(&self, term: &str) -> Result<Vec<T>, AppError>;
}

#[async_trait]
pub trait ClienteRepository: Repository<Pessoa> {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Pessoa>, AppError>;
}

#[async_trait]
pub trait FabricanteRepository: Repository<Pessoa> {
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Pessoa>, AppError>;
}

#[async_trait]
pub trait ProdutoRepository: Repository<Produto> {
    async fn find_by_categoria(&self, categoria: &str) -> Result<Vec<Produto>, AppError>;

    async fn find_by_fabricante(&self, fabricante_id: Uuid) -> Result<Vec<Produto>, AppError>;

    async fn exists_for_fabricante(&self, fabricante_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait VendaRepository: Repository<Venda> {
    async fn find_by_identificador(&self, identificador: &str) -> Result<Option<Venda>, AppError>;

    async fn find_by_cliente(&self, cliente_id: Uuid) -> Result<Vec<Venda>, AppError>;

    /// Vendas com data entre `inicio` e `fim`, inclusive.
    async fn find_by_periodo(&self, inicio: NaiveDate, fim: NaiveDate) -> Result<Vec<Venda>, AppError>;

    async fn exists_for_cliente(&self, cliente_id: Uuid) -> Result<bool, AppError>;

    async fn exists_for_produto(&self, produto_id: Uuid) -> Result<bool, AppError>;

    async fn summary_by_month(&self, ano: i32) -> Result<Vec<ResumoMensal>, AppError>;

    async fn summary_by_cliente(&self) -> Result<Vec<ResumoCliente>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn count(&self) -> Result<u64, AppError>;
}

/// Um repositório de cada entidade, todos do mesmo backend.
#[derive(Clone)]
pub struct Repositories {
    pub clientes: Arc<dyn ClienteRepository>,
    pub fabricantes: Arc<dyn FabricanteRepository>,
    pub produtos: Arc<dyn ProdutoRepository>,
    pub vendas: Arc<dyn VendaRepository>,
    pub users: Arc<dyn UserRepository>,
}
