// src/config.rs

use std::{env, str::FromStr, sync::Arc};

use anyhow::{bail, Context};

use crate::{
    db::Database,
    services::{
        auth::AuthService, cliente_service::ClienteService, fabricante_service::FabricanteService,
        integridade::IntegrityGuard, produto_service::ProdutoService,
        relatorio_service::RelatorioService, venda_service::VendaService,
    },
    validation::CpfPolicy,
};

const DEFAULT_JWT_SECRET: &str = "secret_key_development";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            other => bail!("APP_ENV inválido: '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "memoria" => Ok(StoreBackend::Memory),
            other => bail!("STORE_BACKEND inválido: '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub cpf_policy: CpfPolicy,
    /// Quando ligado, DELETE exige papel de administrador.
    pub admin_only_deletes: bool,
    pub seed_demo_data: bool,
}

fn parse_bool(name: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} deve ser true ou false, recebido '{}'", name, other),
    }
}

impl Config {
    /// Lê o `.env` (se houver) e as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let app_env = match get("APP_ENV") {
            Some(v) => v.parse()?,
            None => AppEnv::Development,
        };

        let database_url = get("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let store_backend = match get("STORE_BACKEND") {
            Some(v) => v.parse()?,
            None if database_url.is_some() => StoreBackend::Postgres,
            None => StoreBackend::Memory,
        };

        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida quando STORE_BACKEND=postgres");
        }

        let port: u16 = match get("PORT") {
            Some(v) => v.trim().parse().with_context(|| format!("PORT inválida: '{}'", v))?,
            None => 3000,
        };

        let db_max_connections: u32 = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v.trim().parse().with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", v))?,
            None => 5,
        };

        let jwt_secret = match get("JWT_SECRET").filter(|v| !v.is_empty()) {
            Some(secret) => secret,
            None => {
                if app_env == AppEnv::Production {
                    bail!("JWT_SECRET deve ser definido em produção");
                }
                tracing::warn!("JWT_SECRET não definido; usando o segredo padrão de desenvolvimento");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let jwt_expiration_hours: i64 = match get("JWT_EXPIRATION_HOURS") {
            Some(v) => v.trim().parse().with_context(|| format!("JWT_EXPIRATION_HOURS inválido: '{}'", v))?,
            None => 24,
        };
        if jwt_expiration_hours <= 0 {
            bail!("JWT_EXPIRATION_HOURS deve ser positivo");
        }

        let bcrypt_cost: u32 = match get("BCRYPT_COST") {
            Some(v) => v.trim().parse().with_context(|| format!("BCRYPT_COST inválido: '{}'", v))?,
            None => bcrypt::DEFAULT_COST,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("BCRYPT_COST deve estar entre 4 e 31");
        }

        let cpf_policy = match get("CPF_VALIDATION") {
            Some(v) => v.parse().map_err(anyhow::Error::msg)?,
            None => CpfPolicy::Strict,
        };

        let admin_only_deletes = match get("ADMIN_ONLY_DELETES") {
            Some(v) => parse_bool("ADMIN_ONLY_DELETES", &v)?,
            None => false,
        };

        let seed_demo_data = match get("SEED_DEMO_DATA") {
            Some(v) => parse_bool("SEED_DEMO_DATA", &v)?,
            None => false,
        };

        Ok(Config {
            app_env,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            store_backend,
            database_url,
            db_max_connections,
            jwt_secret,
            jwt_expiration_hours,
            bcrypt_cost,
            cpf_policy,
            admin_only_deletes,
            seed_demo_data,
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == AppEnv::Development
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuração dos testes: memória e bcrypt barato.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            app_env: AppEnv::Development,
            host: "127.0.0.1".into(),
            port: 0,
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: 1,
            jwt_secret: "segredo-de-teste".into(),
            jwt_expiration_hours: 1,
            bcrypt_cost: 4,
            cpf_policy: CpfPolicy::Strict,
            admin_only_deletes: false,
            seed_demo_data: false,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Database,
    pub auth_service: AuthService,
    pub cliente_service: ClienteService,
    pub fabricante_service: FabricanteService,
    pub produto_service: ProdutoService,
    pub venda_service: VendaService,
    pub relatorio_service: RelatorioService,
}

impl AppState {
    /// Monta o grafo de dependências sobre o banco já conectado.
    pub fn new(config: Config, database: Database) -> Self {
        let config = Arc::new(config);
        let repos = database.repositories();

        let guard = IntegrityGuard::new(repos.produtos.clone(), repos.vendas.clone());

        let auth_service = AuthService::new(repos.users.clone(), config.clone());
        let cliente_service = ClienteService::new(repos.clientes.clone(), guard.clone(), config.cpf_policy);
        let fabricante_service = FabricanteService::new(repos.fabricantes.clone(), guard.clone());
        let produto_service =
            ProdutoService::new(repos.produtos.clone(), repos.fabricantes.clone(), guard);
        let venda_service =
            VendaService::new(repos.vendas.clone(), repos.clientes.clone(), repos.produtos.clone());
        let relatorio_service = RelatorioService::new(repos.vendas);

        Self {
            config,
            database,
            auth_service,
            cliente_service,
            fabricante_service,
            produto_service,
            venda_service,
            relatorio_service,
        }
    }
}
