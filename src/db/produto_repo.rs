// src/db/produto_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{like_pattern, map_unique_violation, order_clause},
        error::AppError,
        query::FindOptions,
    },
    db::repository::{ProdutoRepository, Repository},
    models::produto::Produto,
};

const COLUNAS: &str = "id, nome, valor_custo, valor_venda, categoria, fabr, created_at, updated_at";

#[derive(Clone)]
pub struct PgProdutoRepository {
    pool: PgPool,
}

impl PgProdutoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Produto> for PgProdutoRepository {
    async fn create(&self, produto: &Produto) -> Result<Produto, AppError> {
        let sql = format!(
            "INSERT INTO produtos ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            COLUNAS, COLUNAS
        );
        let created = sqlx::query_as::<_, Produto>(&sql)
            .bind(produto.id)
            .bind(&produto.nome)
            .bind(produto.valor_custo)
            .bind(produto.valor_venda)
            .bind(&produto.categoria)
            .bind(produto.fabr)
            .bind(produto.created_at)
            .bind(produto.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Produto>, AppError> {
        let sql = format!("SELECT {} FROM produtos WHERE id = $1", COLUNAS);
        let produto = sqlx::query_as::<_, Produto>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(produto)
    }

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Produto>, AppError> {
        let sql = format!(
            "SELECT {} FROM produtos {} LIMIT $1 OFFSET $2",
            COLUNAS,
            order_clause(options.sort)
        );
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .bind(options.limit)
            .bind(options.skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(produtos)
    }

    async fn update_by_id(&self, id: Uuid, produto: &Produto) -> Result<Option<Produto>, AppError> {
        let sql = format!(
            "UPDATE produtos SET nome = $2, valor_custo = $3, valor_venda = $4, \
             categoria = $5, fabr = $6, updated_at = $7 \
             WHERE id = $1 RETURNING {}",
            COLUNAS
        );
        let updated = sqlx::query_as::<_, Produto>(&sql)
            .bind(id)
            .bind(&produto.nome)
            .bind(produto.valor_custo)
            .bind(produto.valor_venda)
            .bind(&produto.categoria)
            .bind(produto.fabr)
            .bind(produto.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM produtos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM produtos")
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn search(&self, term: &str) -> Result<Vec<Produto>, AppError> {
        let sql = format!(
            "SELECT {} FROM produtos WHERE nome ILIKE $1 OR categoria ILIKE $1 {}",
            COLUNAS,
            order_clause(None)
        );
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(produtos)
    }
}

#[async_trait]
impl ProdutoRepository for PgProdutoRepository {
    async fn find_by_categoria(&self, categoria: &str) -> Result<Vec<Produto>, AppError> {
        let sql = format!(
            "SELECT {} FROM produtos WHERE LOWER(categoria) = LOWER($1) {}",
            COLUNAS,
            order_clause(None)
        );
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .bind(categoria)
            .fetch_all(&self.pool)
            .await?;
        Ok(produtos)
    }

    async fn find_by_fabricante(&self, fabricante_id: Uuid) -> Result<Vec<Produto>, AppError> {
        let sql = format!("SELECT {} FROM produtos WHERE fabr = $1 {}", COLUNAS, order_clause(None));
        let produtos = sqlx::query_as::<_, Produto>(&sql)
            .bind(fabricante_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(produtos)
    }

    async fn exists_for_fabricante(&self, fabricante_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM produtos WHERE fabr = $1)")
            .bind(fabricante_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
