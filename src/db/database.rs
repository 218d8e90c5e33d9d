// src/db/database.rs

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::{Config, StoreBackend},
    db::{
        memory::MemoryStore,
        pessoa_repo::PgPessoaRepository,
        produto_repo::PgProdutoRepository,
        repository::Repositories,
        user_repo::PgUserRepository,
        venda_repo::PgVendaRepository,
    },
};

/// A conexão com o armazenamento, aberta no início e fechada no desligamento.
#[derive(Clone)]
pub enum Database {
    Postgres(PgPool),
    Memory(MemoryStore),
}

impl Database {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Usando armazenamento em memória: os dados somem ao reiniciar");
                Ok(Database::Memory(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida para STORE_BACKEND=postgres")?;

                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                Ok(Database::Postgres(pool))
            }
        }
    }

    /// Roda as migrações embutidas. Sem efeito no backend em memória.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        if let Database::Postgres(pool) = self {
            sqlx::migrate!()
                .run(pool)
                .await
                .context("Falha ao rodar as migrações do banco de dados")?;
            tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
        }
        Ok(())
    }

    pub fn repositories(&self) -> Repositories {
        match self {
            Database::Memory(store) => store.repositories(),
            Database::Postgres(pool) => Repositories {
                clientes: Arc::new(PgPessoaRepository::clientes(pool.clone())),
                fabricantes: Arc::new(PgPessoaRepository::fabricantes(pool.clone())),
                produtos: Arc::new(PgProdutoRepository::new(pool.clone())),
                vendas: Arc::new(PgVendaRepository::new(pool.clone())),
                users: Arc::new(PgUserRepository::new(pool.clone())),
            },
        }
    }

    pub async fn close(&self) {
        if let Database::Postgres(pool) = self {
            pool.close().await;
            tracing::info!("Conexões com o banco de dados encerradas");
        }
    }
}
