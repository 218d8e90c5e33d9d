// src/services/venda_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::IDENTIFICADOR_DUPLICADO,
        error::AppError,
        query::{parse_id, ListQuery, VendaFilter},
    },
    db::repository::{ClienteRepository, ProdutoRepository, Repository, VendaRepository},
    models::venda::{Venda, VendaPatch, VendaPayload},
};

#[derive(Clone)]
pub struct VendaService {
    vendas: Arc<dyn VendaRepository>,
    clientes: Arc<dyn ClienteRepository>,
    produtos: Arc<dyn ProdutoRepository>,
}

fn nao_encontrada() -> AppError {
    AppError::NotFound("Venda não encontrada".into())
}

impl VendaService {
    pub fn new(
        vendas: Arc<dyn VendaRepository>,
        clientes: Arc<dyn ClienteRepository>,
        produtos: Arc<dyn ProdutoRepository>,
    ) -> Self {
        Self { vendas, clientes, produtos }
    }

    /// Prioridade: `cliente`, período (`dataInicio` + `dataFim`), `search`.
    pub async fn list(&self, query: &ListQuery, filter: &VendaFilter) -> Result<(Vec<Venda>, u64), AppError> {
        let options = query.find_options(Venda::SORTABLE_FIELDS)?;

        let filtradas = if let Some(cliente) = filter.cliente.as_deref() {
            Some(self.vendas.find_by_cliente(parse_id(cliente)?).await?)
        } else if let Some((inicio, fim)) = filter.periodo()? {
            Some(self.vendas.find_by_periodo(inicio, fim).await?)
        } else if let Some(term) = query.search_term() {
            Some(self.vendas.search(term).await?)
        } else {
            None
        };

        if let Some(vendas) = filtradas {
            let count = vendas.len() as u64;
            return Ok((vendas, count));
        }

        let vendas = self.vendas.find_all(&options).await?;
        let count = self.vendas.count().await?;
        Ok((vendas, count))
    }

    pub async fn get(&self, id: Uuid) -> Result<Venda, AppError> {
        self.vendas.find_by_id(id).await?.ok_or_else(nao_encontrada)
    }

    async fn ensure_references(&self, clnt: Option<Uuid>, prod: Option<Uuid>) -> Result<(), AppError> {
        if let Some(clnt) = clnt {
            if self.clientes.find_by_id(clnt).await?.is_none() {
                return Err(AppError::ReferenceConflict("Cliente não encontrado".into()));
            }
        }
        if let Some(prod) = prod {
            if self.produtos.find_by_id(prod).await?.is_none() {
                return Err(AppError::ReferenceConflict("Produto não encontrado".into()));
            }
        }
        Ok(())
    }

    pub async fn create(&self, payload: VendaPayload) -> Result<Venda, AppError> {
        let venda = payload.into_venda(Utc::now());
        venda.check()?;

        if self.vendas.find_by_identificador(&venda.identificador).await?.is_some() {
            return Err(AppError::Duplicate(IDENTIFICADOR_DUPLICADO.into()));
        }
        self.ensure_references(Some(venda.clnt), Some(venda.prod)).await?;

        let venda = self.vendas.create(&venda).await?;
        tracing::info!(venda_id = %venda.id, identificador = %venda.identificador, "Venda registrada");
        Ok(venda)
    }

    pub async fn update(&self, id: Uuid, patch: VendaPatch) -> Result<Venda, AppError> {
        let mut venda = self.get(id).await?;
        let identificador_anterior = venda.identificador.clone();
        let (clnt, prod) = (patch.clnt, patch.prod);

        patch.apply(&mut venda);
        venda.check()?;

        if venda.identificador != identificador_anterior
            && self
                .vendas
                .find_by_identificador(&venda.identificador)
                .await?
                .is_some_and(|outra| outra.id != id)
        {
            return Err(AppError::Duplicate(IDENTIFICADOR_DUPLICADO.into()));
        }
        self.ensure_references(clnt, prod).await?;

        venda.updated_at = Utc::now();
        let venda = self.vendas.update_by_id(id, &venda).await?.ok_or_else(nao_encontrada)?;

        tracing::info!(venda_id = %id, "Venda atualizada");
        Ok(venda)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.vendas.delete_by_id(id).await? {
            return Err(nao_encontrada());
        }
        tracing::info!(venda_id = %id, "Venda excluída");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn references_must_exist() {
        let repos = MemoryStore::new().repositories();
        let vendas = VendaService::new(repos.vendas, repos.clientes, repos.produtos);

        let payload = VendaPayload {
            identificador: "V001".into(),
            dia: 15,
            mes: 6,
            ano: 2025,
            valor_total: Decimal::new(3500, 0),
            clnt: Uuid::new_v4(),
            prod: Uuid::new_v4(),
        };

        let err = vendas.create(payload).await.unwrap_err();
        assert!(matches!(err, AppError::ReferenceConflict(ref msg) if msg == "Cliente não encontrado"));
    }

    #[tokio::test]
    async fn invalid_date_is_checked_before_references() {
        let repos = MemoryStore::new().repositories();
        let vendas = VendaService::new(repos.vendas, repos.clientes, repos.produtos);

        let payload = VendaPayload {
            identificador: "V002".into(),
            dia: 31,
            mes: 4,
            ano: 2024,
            valor_total: Decimal::new(10, 0),
            clnt: Uuid::new_v4(),
            prod: Uuid::new_v4(),
        };

        assert!(matches!(vendas.create(payload).await, Err(AppError::ValidationError(_))));
    }
}
