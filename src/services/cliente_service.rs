// src/services/cliente_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{db_utils::CPF_DUPLICADO, error::AppError, query::ListQuery},
    db::repository::{ClienteRepository, Repository},
    models::pessoa::{ClientePayload, Pessoa, PessoaPatch},
    services::integridade::{ensure, IntegrityGuard},
    validation::CpfPolicy,
};

const NAO_ENCONTRADO: &str = "Cliente";

#[derive(Clone)]
pub struct ClienteService {
    clientes: Arc<dyn ClienteRepository>,
    guard: IntegrityGuard,
    cpf_policy: CpfPolicy,
}

impl ClienteService {
    pub fn new(clientes: Arc<dyn ClienteRepository>, guard: IntegrityGuard, cpf_policy: CpfPolicy) -> Self {
        Self { clientes, guard, cpf_policy }
    }

    /// Com `search`, devolve só os resultados da busca; senão a página pedida e o total.
    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<Pessoa>, u64), AppError> {
        let options = query.find_options(Pessoa::SORTABLE_FIELDS)?;

        if let Some(term) = query.search_term() {
            let clientes = self.clientes.search(term).await?;
            let count = clientes.len() as u64;
            return Ok((clientes, count));
        }

        let clientes = self.clientes.find_all(&options).await?;
        let count = self.clientes.count().await?;
        Ok((clientes, count))
    }

    pub async fn get(&self, id: Uuid) -> Result<Pessoa, AppError> {
        self.clientes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(NAO_ENCONTRADO))
    }

    pub async fn create(&self, payload: ClientePayload) -> Result<Pessoa, AppError> {
        let cliente = payload.into_pessoa(Utc::now())?;
        cliente.check(self.cpf_policy)?;

        let cpf = cliente.as_cliente().map(|c| c.cpf.as_str()).unwrap_or_default();
        if self.clientes.find_by_cpf(cpf).await?.is_some() {
            return Err(AppError::Duplicate(CPF_DUPLICADO.into()));
        }

        let cliente = self.clientes.create(&cliente).await?;
        tracing::info!(cliente_id = %cliente.id, "Cliente criado");
        Ok(cliente)
    }

    pub async fn update(&self, id: Uuid, patch: PessoaPatch) -> Result<Pessoa, AppError> {
        let mut cliente = self.get(id).await?;
        let cpf_anterior = cliente.as_cliente().map(|c| c.cpf.clone());

        patch.apply(&mut cliente)?;
        cliente.check(self.cpf_policy)?;

        let cpf = cliente.as_cliente().map(|c| c.cpf.clone());
        if cpf != cpf_anterior {
            if let Some(cpf) = cpf.as_deref() {
                if self.clientes.find_by_cpf(cpf).await?.is_some_and(|outro| outro.id != id) {
                    return Err(AppError::Duplicate(CPF_DUPLICADO.into()));
                }
            }
        }

        cliente.updated_at = Utc::now();
        let cliente = self
            .clientes
            .update_by_id(id, &cliente)
            .await?
            .ok_or_else(|| AppError::not_found(NAO_ENCONTRADO))?;

        tracing::info!(cliente_id = %id, "Cliente atualizado");
        Ok(cliente)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        ensure(
            self.guard.can_delete_cliente(id).await?,
            "Não é possível excluir cliente com vendas associadas",
        )?;

        if !self.clientes.delete_by_id(id).await? {
            return Err(AppError::not_found(NAO_ENCONTRADO));
        }

        tracing::info!(cliente_id = %id, "Cliente excluído");
        Ok(())
    }
}
