// src/services/fabricante_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{db_utils::CNPJ_DUPLICADO, error::AppError, query::ListQuery},
    db::repository::{FabricanteRepository, Repository},
    models::pessoa::{FabricantePayload, Pessoa, PessoaPatch},
    services::integridade::{ensure, IntegrityGuard},
    validation::CpfPolicy,
};

const NAO_ENCONTRADO: &str = "Fabricante";

#[derive(Clone)]
pub struct FabricanteService {
    fabricantes: Arc<dyn FabricanteRepository>,
    guard: IntegrityGuard,
}

impl FabricanteService {
    pub fn new(fabricantes: Arc<dyn FabricanteRepository>, guard: IntegrityGuard) -> Self {
        Self { fabricantes, guard }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<Pessoa>, u64), AppError> {
        let options = query.find_options(Pessoa::SORTABLE_FIELDS)?;

        if let Some(term) = query.search_term() {
            let fabricantes = self.fabricantes.search(term).await?;
            let count = fabricantes.len() as u64;
            return Ok((fabricantes, count));
        }

        let fabricantes = self.fabricantes.find_all(&options).await?;
        let count = self.fabricantes.count().await?;
        Ok((fabricantes, count))
    }

    pub async fn get(&self, id: Uuid) -> Result<Pessoa, AppError> {
        self.fabricantes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(NAO_ENCONTRADO))
    }

    pub async fn create(&self, payload: FabricantePayload) -> Result<Pessoa, AppError> {
        let fabricante = payload.into_pessoa(Utc::now());
        // Fabricante não tem CPF; a política não faz diferença aqui
        fabricante.check(CpfPolicy::Strict)?;

        let cnpj = fabricante.as_fabricante().map(|f| f.cnpj.as_str()).unwrap_or_default();
        if self.fabricantes.find_by_cnpj(cnpj).await?.is_some() {
            return Err(AppError::Duplicate(CNPJ_DUPLICADO.into()));
        }

        let fabricante = self.fabricantes.create(&fabricante).await?;
        tracing::info!(fabricante_id = %fabricante.id, "Fabricante criado");
        Ok(fabricante)
    }

    pub async fn update(&self, id: Uuid, patch: PessoaPatch) -> Result<Pessoa, AppError> {
        let mut fabricante = self.get(id).await?;
        let cnpj_anterior = fabricante.as_fabricante().map(|f| f.cnpj.clone());

        patch.apply(&mut fabricante)?;
        fabricante.check(CpfPolicy::Strict)?;

        let cnpj = fabricante.as_fabricante().map(|f| f.cnpj.clone());
        if cnpj != cnpj_anterior {
            if let Some(cnpj) = cnpj.as_deref() {
                if self.fabricantes.find_by_cnpj(cnpj).await?.is_some_and(|outro| outro.id != id) {
                    return Err(AppError::Duplicate(CNPJ_DUPLICADO.into()));
                }
            }
        }

        fabricante.updated_at = Utc::now();
        let fabricante = self
            .fabricantes
            .update_by_id(id, &fabricante)
            .await?
            .ok_or_else(|| AppError::not_found(NAO_ENCONTRADO))?;

        tracing::info!(fabricante_id = %id, "Fabricante atualizado");
        Ok(fabricante)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        ensure(
            self.guard.can_delete_fabricante(id).await?,
            "Não é possível excluir fabricante com produtos associados",
        )?;

        if !self.fabricantes.delete_by_id(id).await? {
            return Err(AppError::not_found(NAO_ENCONTRADO));
        }

        tracing::info!(fabricante_id = %id, "Fabricante excluído");
        Ok(())
    }
}
