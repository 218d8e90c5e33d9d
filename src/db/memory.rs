// src/db/memory.rs
//
// Backend em memória: mesmo contrato dos repositórios Postgres, sem banco.
// Usado em desenvolvimento local e nos testes.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{CNPJ_DUPLICADO, CPF_DUPLICADO, IDENTIFICADOR_DUPLICADO, USUARIO_DUPLICADO},
        error::AppError,
        query::FindOptions,
    },
    db::repository::{
        ClienteRepository, FabricanteRepository, ProdutoRepository, Repositories, Repository,
        UserRepository, VendaRepository,
    },
    models::{
        auth::User,
        pessoa::{Pessoa, Tipo},
        produto::Produto,
        relatorio::{agrupar_por_cliente, agrupar_por_mes, ResumoCliente, ResumoMensal},
        venda::Venda,
    },
};

// Vec mantém a ordem de inserção, que é a ordem padrão das listagens
#[derive(Debug, Default)]
pub struct MemoryState {
    pessoas: Vec<Pessoa>,
    produtos: Vec<Produto>,
    vendas: Vec<Venda>,
    users: Vec<User>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            clientes: Arc::new(MemoryPessoaRepository::clientes(self.clone())),
            fabricantes: Arc::new(MemoryPessoaRepository::fabricantes(self.clone())),
            produtos: Arc::new(MemoryProdutoRepository { store: self.clone() }),
            vendas: Arc::new(MemoryVendaRepository { store: self.clone() }),
            users: Arc::new(MemoryUserRepository { store: self.clone() }),
        }
    }
}

// --- ORDENAÇÃO E PAGINAÇÃO ---

trait Sortable {
    fn compare_by(&self, other: &Self, field: &str) -> Ordering;
}

impl Sortable for Pessoa {
    fn compare_by(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "nome" => self.nome.cmp(&other.nome),
            "email" => self.email.cmp(&other.email),
            "endereco" => self.endereco.cmp(&other.endereco),
            "updated_at" => self.updated_at.cmp(&other.updated_at),
            _ => self.created_at.cmp(&other.created_at),
        }
    }
}

impl Sortable for Produto {
    fn compare_by(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "nome" => self.nome.cmp(&other.nome),
            "categoria" => self.categoria.cmp(&other.categoria),
            "valor_custo" => self.valor_custo.cmp(&other.valor_custo),
            "valor_venda" => self.valor_venda.cmp(&other.valor_venda),
            "updated_at" => self.updated_at.cmp(&other.updated_at),
            _ => self.created_at.cmp(&other.created_at),
        }
    }
}

impl Sortable for Venda {
    fn compare_by(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "identificador" => self.identificador.cmp(&other.identificador),
            "ano" => self.ano.cmp(&other.ano),
            "mes" => self.mes.cmp(&other.mes),
            "dia" => self.dia.cmp(&other.dia),
            "valor_total" => self.valor_total.cmp(&other.valor_total),
            "updated_at" => self.updated_at.cmp(&other.updated_at),
            _ => self.created_at.cmp(&other.created_at),
        }
    }
}

fn paginate<'a, T>(items: impl Iterator<Item = &'a T>, options: &FindOptions) -> Vec<T>
where
    T: Sortable + Clone + 'a,
{
    let mut items: Vec<T> = items.cloned().collect();

    // sort_by é estável: empates ficam na ordem de criação
    if let Some(sort) = options.sort {
        items.sort_by(|a, b| {
            let ord = a.compare_by(b, sort.field);
            if sort.descending { ord.reverse() } else { ord }
        });
    }

    let skip = options.skip.unwrap_or(0).max(0) as usize;
    let limit = options.limit.map_or(usize::MAX, |l| l.max(0) as usize);
    items.into_iter().skip(skip).take(limit).collect()
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// --- PESSOAS ---

pub struct MemoryPessoaRepository {
    store: MemoryStore,
    tipo: Tipo,
}

impl MemoryPessoaRepository {
    pub fn clientes(store: MemoryStore) -> Self {
        Self { store, tipo: Tipo::Cliente }
    }

    pub fn fabricantes(store: MemoryStore) -> Self {
        Self { store, tipo: Tipo::Fabricante }
    }

    fn check_tipo(&self, pessoa: &Pessoa) -> Result<(), AppError> {
        if pessoa.kind() != self.tipo {
            return Err(AppError::BadRequest(format!("Registro não é um {}", self.tipo.as_str())));
        }
        Ok(())
    }

    fn matches(&self, pessoa: &Pessoa) -> bool {
        pessoa.kind() == self.tipo
    }

    fn search_matches(&self, pessoa: &Pessoa, term: &str) -> bool {
        if contains_ci(&pessoa.nome, term) {
            return true;
        }
        if let Some(c) = pessoa.as_cliente() {
            return contains_ci(&c.cpf, term);
        }
        if let Some(f) = pessoa.as_fabricante() {
            return contains_ci(&f.razao_social, term) || contains_ci(&f.cnpj, term);
        }
        false
    }
}

// cpf e cnpj são únicos na tabela inteira, como as constraints do Postgres
fn pessoa_conflict(state: &MemoryState, pessoa: &Pessoa) -> Option<AppError> {
    let outros = state.pessoas.iter().filter(|p| p.id != pessoa.id);

    for outro in outros {
        if let (Some(a), Some(b)) = (outro.as_cliente(), pessoa.as_cliente()) {
            if a.cpf == b.cpf {
                return Some(AppError::Duplicate(CPF_DUPLICADO.into()));
            }
        }
        if let (Some(a), Some(b)) = (outro.as_fabricante(), pessoa.as_fabricante()) {
            if a.cnpj == b.cnpj {
                return Some(AppError::Duplicate(CNPJ_DUPLICADO.into()));
            }
        }
    }
    None
}

#[async_trait]
impl Repository<Pessoa> for MemoryPessoaRepository {
    async fn create(&self, pessoa: &Pessoa) -> Result<Pessoa, AppError> {
        self.check_tipo(pessoa)?;
        let mut state = self.store.state.write().await;

        if state.pessoas.iter().any(|p| p.id == pessoa.id) {
            return Err(AppError::Duplicate("Registro duplicado".into()));
        }
        if let Some(err) = pessoa_conflict(&state, pessoa) {
            return Err(err);
        }

        state.pessoas.push(pessoa.clone());
        Ok(pessoa.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pessoa>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.pessoas.iter().find(|p| p.id == id && self.matches(p)).cloned())
    }

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Pessoa>, AppError> {
        let state = self.store.state.read().await;
        Ok(paginate(state.pessoas.iter().filter(|p| self.matches(p)), options))
    }

    async fn update_by_id(&self, id: Uuid, pessoa: &Pessoa) -> Result<Option<Pessoa>, AppError> {
        self.check_tipo(pessoa)?;
        let mut state = self.store.state.write().await;

        let Some(index) = state.pessoas.iter().position(|p| p.id == id && p.kind() == self.tipo) else {
            return Ok(None);
        };

        let updated = Pessoa { id, created_at: state.pessoas[index].created_at, ..pessoa.clone() };
        if let Some(err) = pessoa_conflict(&state, &updated) {
            return Err(err);
        }

        state.pessoas[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.store.state.write().await;
        let before = state.pessoas.len();
        state.pessoas.retain(|p| !(p.id == id && p.kind() == self.tipo));
        Ok(state.pessoas.len() < before)
    }

    async fn count(&self) -> Result<u64, AppError> {
        let state = self.store.state.read().await;
        Ok(state.pessoas.iter().filter(|p| self.matches(p)).count() as u64)
    }

    async fn search(&self, term: &str) -> Result<Vec<Pessoa>, AppError> {
        let term = term.to_lowercase();
        let state = self.store.state.read().await;
        Ok(state
            .pessoas
            .iter()
            .filter(|p| self.matches(p) && self.search_matches(p, &term))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ClienteRepository for MemoryPessoaRepository {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Pessoa>, AppError> {
        let state = self.store.state.read().await;
        Ok(state
            .pessoas
            .iter()
            .find(|p| p.as_cliente().is_some_and(|c| c.cpf == cpf))
            .cloned())
    }
}

#[async_trait]
impl FabricanteRepository for MemoryPessoaRepository {
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Pessoa>, AppError> {
        let state = self.store.state.read().await;
        Ok(state
            .pessoas
            .iter()
            .find(|p| p.as_fabricante().is_some_and(|f| f.cnpj == cnpj))
            .cloned())
    }
}

// --- PRODUTOS ---

pub struct MemoryProdutoRepository {
    store: MemoryStore,
}

#[async_trait]
impl Repository<Produto> for MemoryProdutoRepository {
    async fn create(&self, produto: &Produto) -> Result<Produto, AppError> {
        let mut state = self.store.state.write().await;
        if state.produtos.iter().any(|p| p.id == produto.id) {
            return Err(AppError::Duplicate("Registro duplicado".into()));
        }
        state.produtos.push(produto.clone());
        Ok(produto.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Produto>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.produtos.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Produto>, AppError> {
        let state = self.store.state.read().await;
        Ok(paginate(state.produtos.iter(), options))
    }

    async fn update_by_id(&self, id: Uuid, produto: &Produto) -> Result<Option<Produto>, AppError> {
        let mut state = self.store.state.write().await;
        let Some(slot) = state.produtos.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let updated = Produto { id, created_at: slot.created_at, ..produto.clone() };
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.store.state.write().await;
        let before = state.produtos.len();
        state.produtos.retain(|p| p.id != id);
        Ok(state.produtos.len() < before)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.store.state.read().await.produtos.len() as u64)
    }

    async fn search(&self, term: &str) -> Result<Vec<Produto>, AppError> {
        let term = term.to_lowercase();
        let state = self.store.state.read().await;
        Ok(state
            .produtos
            .iter()
            .filter(|p| contains_ci(&p.nome, &term) || contains_ci(&p.categoria, &term))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProdutoRepository for MemoryProdutoRepository {
    async fn find_by_categoria(&self, categoria: &str) -> Result<Vec<Produto>, AppError> {
        let categoria = categoria.to_lowercase();
        let state = self.store.state.read().await;
        Ok(state
            .produtos
            .iter()
            .filter(|p| p.categoria.to_lowercase() == categoria)
            .cloned()
            .collect())
    }

    async fn find_by_fabricante(&self, fabricante_id: Uuid) -> Result<Vec<Produto>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.produtos.iter().filter(|p| p.fabr == fabricante_id).cloned().collect())
    }

    async fn exists_for_fabricante(&self, fabricante_id: Uuid) -> Result<bool, AppError> {
        let state = self.store.state.read().await;
        Ok(state.produtos.iter().any(|p| p.fabr == fabricante_id))
    }
}

// --- VENDAS ---

pub struct MemoryVendaRepository {
    store: MemoryStore,
}

fn venda_conflict(state: &MemoryState, venda: &Venda) -> Option<AppError> {
    state
        .vendas
        .iter()
        .any(|v| v.id != venda.id && v.identificador == venda.identificador)
        .then(|| AppError::Duplicate(IDENTIFICADOR_DUPLICADO.into()))
}

#[async_trait]
impl Repository<Venda> for MemoryVendaRepository {
    async fn create(&self, venda: &Venda) -> Result<Venda, AppError> {
        let mut state = self.store.state.write().await;
        if state.vendas.iter().any(|v| v.id == venda.id) {
            return Err(AppError::Duplicate("Registro duplicado".into()));
        }
        if let Some(err) = venda_conflict(&state, venda) {
            return Err(err);
        }
        state.vendas.push(venda.clone());
        Ok(venda.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Venda>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.vendas.iter().find(|v| v.id == id).cloned())
    }

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Venda>, AppError> {
        let state = self.store.state.read().await;
        Ok(paginate(state.vendas.iter(), options))
    }

    async fn update_by_id(&self, id: Uuid, venda: &Venda) -> Result<Option<Venda>, AppError> {
        let mut state = self.store.state.write().await;

        let Some(index) = state.vendas.iter().position(|v| v.id == id) else {
            return Ok(None);
        };

        let updated = Venda { id, created_at: state.vendas[index].created_at, ..venda.clone() };
        if let Some(err) = venda_conflict(&state, &updated) {
            return Err(err);
        }

        state.vendas[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.store.state.write().await;
        let before = state.vendas.len();
        state.vendas.retain(|v| v.id != id);
        Ok(state.vendas.len() < before)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.store.state.read().await.vendas.len() as u64)
    }

    async fn search(&self, term: &str) -> Result<Vec<Venda>, AppError> {
        let term = term.to_lowercase();
        let state = self.store.state.read().await;
        Ok(state
            .vendas
            .iter()
            .filter(|v| contains_ci(&v.identificador, &term))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VendaRepository for MemoryVendaRepository {
    async fn find_by_identificador(&self, identificador: &str) -> Result<Option<Venda>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.vendas.iter().find(|v| v.identificador == identificador).cloned())
    }

    async fn find_by_cliente(&self, cliente_id: Uuid) -> Result<Vec<Venda>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.vendas.iter().filter(|v| v.clnt == cliente_id).cloned().collect())
    }

    async fn find_by_periodo(&self, inicio: NaiveDate, fim: NaiveDate) -> Result<Vec<Venda>, AppError> {
        let state = self.store.state.read().await;
        let mut vendas: Vec<Venda> = state
            .vendas
            .iter()
            .filter(|v| v.data().is_some_and(|d| d >= inicio && d <= fim))
            .cloned()
            .collect();
        vendas.sort_by_key(|v| (v.ano, v.mes, v.dia));
        Ok(vendas)
    }

    async fn exists_for_cliente(&self, cliente_id: Uuid) -> Result<bool, AppError> {
        let state = self.store.state.read().await;
        Ok(state.vendas.iter().any(|v| v.clnt == cliente_id))
    }

    async fn exists_for_produto(&self, produto_id: Uuid) -> Result<bool, AppError> {
        let state = self.store.state.read().await;
        Ok(state.vendas.iter().any(|v| v.prod == produto_id))
    }

    async fn summary_by_month(&self, ano: i32) -> Result<Vec<ResumoMensal>, AppError> {
        let state = self.store.state.read().await;
        Ok(agrupar_por_mes(&state.vendas, ano))
    }

    async fn summary_by_cliente(&self) -> Result<Vec<ResumoCliente>, AppError> {
        let state = self.store.state.read().await;
        let nomes: HashMap<Uuid, String> = state
            .pessoas
            .iter()
            .filter(|p| p.kind() == Tipo::Cliente)
            .map(|p| (p.id, p.nome.clone()))
            .collect();
        Ok(agrupar_por_cliente(&state.vendas, &nomes))
    }
}

// --- USUÁRIOS ---

pub struct MemoryUserRepository {
    store: MemoryStore,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut state = self.store.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.id == user.id || u.email == user.email || u.username == user.username)
        {
            return Err(AppError::Duplicate(USUARIO_DUPLICADO.into()));
        }
        state.users.push(user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.store.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.store.state.read().await.users.len() as u64)
    }
}
