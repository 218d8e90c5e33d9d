// src/services/produto_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        query::{parse_id, ListQuery, ProdutoFilter},
    },
    db::repository::{FabricanteRepository, ProdutoRepository, Repository},
    models::produto::{Produto, ProdutoPatch, ProdutoPayload},
    services::integridade::{ensure, IntegrityGuard},
};

const NAO_ENCONTRADO: &str = "Produto";

#[derive(Clone)]
pub struct ProdutoService {
    produtos: Arc<dyn ProdutoRepository>,
    fabricantes: Arc<dyn FabricanteRepository>,
    guard: IntegrityGuard,
}

impl ProdutoService {
    pub fn new(
        produtos: Arc<dyn ProdutoRepository>,
        fabricantes: Arc<dyn FabricanteRepository>,
        guard: IntegrityGuard,
    ) -> Self {
        Self { produtos, fabricantes, guard }
    }

    /// Prioridade dos filtros: `search`, `categoria`, `fabricante`. Sem filtro, a página pedida.
    pub async fn list(&self, query: &ListQuery, filter: &ProdutoFilter) -> Result<(Vec<Produto>, u64), AppError> {
        let options = query.find_options(Produto::SORTABLE_FIELDS)?;

        let filtrados = if let Some(term) = query.search_term() {
            Some(self.produtos.search(term).await?)
        } else if let Some(categoria) = filter.categoria.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(self.produtos.find_by_categoria(categoria.trim()).await?)
        } else if let Some(fabricante) = filter.fabricante.as_deref() {
            Some(self.produtos.find_by_fabricante(parse_id(fabricante)?).await?)
        } else {
            None
        };

        if let Some(produtos) = filtrados {
            let count = produtos.len() as u64;
            return Ok((produtos, count));
        }

        let produtos = self.produtos.find_all(&options).await?;
        let count = self.produtos.count().await?;
        Ok((produtos, count))
    }

    pub async fn get(&self, id: Uuid) -> Result<Produto, AppError> {
        self.produtos
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(NAO_ENCONTRADO))
    }

    async fn ensure_fabricante(&self, fabricante_id: Uuid) -> Result<(), AppError> {
        if self.fabricantes.find_by_id(fabricante_id).await?.is_none() {
            return Err(AppError::ReferenceConflict("Fabricante não encontrado".into()));
        }
        Ok(())
    }

    pub async fn create(&self, payload: ProdutoPayload) -> Result<Produto, AppError> {
        let produto = payload.into_produto(Utc::now());
        produto.check()?;
        self.ensure_fabricante(produto.fabr).await?;

        let produto = self.produtos.create(&produto).await?;
        tracing::info!(produto_id = %produto.id, "Produto criado");
        Ok(produto)
    }

    pub async fn update(&self, id: Uuid, patch: ProdutoPatch) -> Result<Produto, AppError> {
        let mut produto = self.get(id).await?;
        let novo_fabricante = patch.fabr;

        patch.apply(&mut produto);
        produto.check()?;

        if let Some(fabr) = novo_fabricante {
            self.ensure_fabricante(fabr).await?;
        }

        produto.updated_at = Utc::now();
        let produto = self
            .produtos
            .update_by_id(id, &produto)
            .await?
            .ok_or_else(|| AppError::not_found(NAO_ENCONTRADO))?;

        tracing::info!(produto_id = %id, "Produto atualizado");
        Ok(produto)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        ensure(
            self.guard.can_delete_produto(id).await?,
            "Não é possível excluir produto com vendas associadas",
        )?;

        if !self.produtos.delete_by_id(id).await? {
            return Err(AppError::not_found(NAO_ENCONTRADO));
        }

        tracing::info!(produto_id = %id, "Produto excluído");
        Ok(())
    }
}
