// src/services/integridade.rs
//
// Integridade referencial feita pela aplicação: o banco não tem chaves estrangeiras.
// A checagem e a exclusão são duas operações separadas; uma venda gravada entre
// as duas não é detectada.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::{ProdutoRepository, VendaRepository},
};

#[derive(Clone)]
pub struct IntegrityGuard {
    produtos: Arc<dyn ProdutoRepository>,
    vendas: Arc<dyn VendaRepository>,
}

impl IntegrityGuard {
    pub fn new(produtos: Arc<dyn ProdutoRepository>, vendas: Arc<dyn VendaRepository>) -> Self {
        Self { produtos, vendas }
    }

    pub async fn can_delete_produto(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(!self.vendas.exists_for_produto(id).await?)
    }

    pub async fn can_delete_cliente(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(!self.vendas.exists_for_cliente(id).await?)
    }

    pub async fn can_delete_fabricante(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(!self.produtos.exists_for_fabricante(id).await?)
    }
}

/// Converte a resposta do guard em erro de conflito.
pub fn ensure(allowed: bool, message: &str) -> Result<(), AppError> {
    if allowed {
        Ok(())
    } else {
        tracing::warn!("Exclusão bloqueada: {}", message);
        Err(AppError::ReferenceConflict(message.to_string()))
    }
}
