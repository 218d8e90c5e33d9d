// src/services/relatorio_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::repository::VendaRepository,
    models::relatorio::{ResumoCliente, ResumoMensal},
};

#[derive(Clone)]
pub struct RelatorioService {
    vendas: Arc<dyn VendaRepository>,
}

/// O ano vem como texto no path.
pub fn parse_ano(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|ano| (1..=9999).contains(ano))
        .ok_or_else(|| AppError::BadRequest("Ano inválido".into()))
}

impl RelatorioService {
    pub fn new(vendas: Arc<dyn VendaRepository>) -> Self {
        Self { vendas }
    }

    pub async fn resumo_mensal(&self, ano: i32) -> Result<Vec<ResumoMensal>, AppError> {
        self.vendas.summary_by_month(ano).await
    }

    pub async fn resumo_por_cliente(&self) -> Result<Vec<ResumoCliente>, AppError> {
        self.vendas.summary_by_cliente().await
    }
}
