// src/db/pessoa_repo.rs
//
// Clientes e Fabricantes dividem a tabela `pessoas`; o repositório fica preso a um `tipo`.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{like_pattern, map_unique_violation, order_clause},
        error::AppError,
        query::FindOptions,
    },
    db::repository::{ClienteRepository, FabricanteRepository, Repository},
    models::pessoa::{DadosCliente, DadosFabricante, FormaPagamento, Pessoa, Tipo, TipoPessoa},
};

const COLUNAS: &str = "id, tipo, nome, telefone, endereco, email, \
    cpf, forma_pagamento, rg, razao_social, cnpj, contato, created_at, updated_at";

fn decode_error(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode { index: column.to_string(), source: message.into() }
}

fn required(row: &PgRow, column: &str) -> Result<String, sqlx::Error> {
    let value: Option<String> = row.try_get(column)?;
    value.ok_or_else(|| decode_error(column, format!("coluna '{}' nula para este tipo", column)))
}

impl<'r> FromRow<'r, PgRow> for Pessoa {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let tipo: String = row.try_get("tipo")?;

        let tipo = match tipo.as_str() {
            "Cliente" => {
                let forma: String = required(row, "forma_pagamento")?;
                let forma_pagamento: FormaPagamento =
                    forma.parse().map_err(|e| decode_error("forma_pagamento", e))?;
                TipoPessoa::Cliente(DadosCliente {
                    cpf: required(row, "cpf")?,
                    forma_pagamento,
                    rg: required(row, "rg")?,
                })
            }
            "Fabricante" => TipoPessoa::Fabricante(DadosFabricante {
                razao_social: required(row, "razao_social")?,
                cnpj: required(row, "cnpj")?,
                contato: required(row, "contato")?,
            }),
            other => return Err(decode_error("tipo", format!("tipo desconhecido: '{}'", other))),
        };

        Ok(Pessoa {
            id: row.try_get("id")?,
            nome: row.try_get("nome")?,
            telefone: row.try_get("telefone")?,
            endereco: row.try_get("endereco")?,
            email: row.try_get("email")?,
            tipo,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// Colunas de variante na ordem de COLUNAS: cpf, forma_pagamento, rg, razao_social, cnpj, contato
fn variant_columns(tipo: &TipoPessoa) -> [Option<&str>; 6] {
    match tipo {
        TipoPessoa::Cliente(c) => [
            Some(c.cpf.as_str()),
            Some(c.forma_pagamento.as_str()),
            Some(c.rg.as_str()),
            None,
            None,
            None,
        ],
        TipoPessoa::Fabricante(f) => [
            None,
            None,
            None,
            Some(f.razao_social.as_str()),
            Some(f.cnpj.as_str()),
            Some(f.contato.as_str()),
        ],
    }
}

#[derive(Clone)]
pub struct PgPessoaRepository {
    pool: PgPool,
    tipo: Tipo,
}

impl PgPessoaRepository {
    pub fn clientes(pool: PgPool) -> Self {
        Self { pool, tipo: Tipo::Cliente }
    }

    pub fn fabricantes(pool: PgPool) -> Self {
        Self { pool, tipo: Tipo::Fabricante }
    }

    fn check_tipo(&self, pessoa: &Pessoa) -> Result<(), AppError> {
        if pessoa.kind() != self.tipo {
            return Err(AppError::BadRequest(format!("Registro não é um {}", self.tipo.as_str())));
        }
        Ok(())
    }

    fn search_clause(&self) -> &'static str {
        match self.tipo {
            Tipo::Cliente => "(nome ILIKE $2 OR cpf ILIKE $2)",
            Tipo::Fabricante => "(nome ILIKE $2 OR razao_social ILIKE $2 OR cnpj ILIKE $2)",
        }
    }

    async fn find_by_column(&self, column: &'static str, value: &str) -> Result<Option<Pessoa>, AppError> {
        let sql = format!("SELECT {} FROM pessoas WHERE tipo = $1 AND {} = $2", COLUNAS, column);
        let pessoa = sqlx::query_as::<_, Pessoa>(&sql)
            .bind(self.tipo.as_str())
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pessoa)
    }
}

#[async_trait]
impl Repository<Pessoa> for PgPessoaRepository {
    async fn create(&self, pessoa: &Pessoa) -> Result<Pessoa, AppError> {
        self.check_tipo(pessoa)?;
        let [cpf, forma, rg, razao, cnpj, contato] = variant_columns(&pessoa.tipo);

        let sql = format!(
            "INSERT INTO pessoas ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {}",
            COLUNAS, COLUNAS
        );

        let created = sqlx::query_as::<_, Pessoa>(&sql)
            .bind(pessoa.id)
            .bind(self.tipo.as_str())
            .bind(&pessoa.nome)
            .bind(&pessoa.telefone)
            .bind(&pessoa.endereco)
            .bind(&pessoa.email)
            .bind(cpf)
            .bind(forma)
            .bind(rg)
            .bind(razao)
            .bind(cnpj)
            .bind(contato)
            .bind(pessoa.created_at)
            .bind(pessoa.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pessoa>, AppError> {
        let sql = format!("SELECT {} FROM pessoas WHERE tipo = $1 AND id = $2", COLUNAS);
        let pessoa = sqlx::query_as::<_, Pessoa>(&sql)
            .bind(self.tipo.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pessoa)
    }

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Pessoa>, AppError> {
        let sql = format!(
            "SELECT {} FROM pessoas WHERE tipo = $1 {} LIMIT $2 OFFSET $3",
            COLUNAS,
            order_clause(options.sort)
        );
        let pessoas = sqlx::query_as::<_, Pessoa>(&sql)
            .bind(self.tipo.as_str())
            .bind(options.limit)
            .bind(options.skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(pessoas)
    }

    async fn update_by_id(&self, id: Uuid, pessoa: &Pessoa) -> Result<Option<Pessoa>, AppError> {
        self.check_tipo(pessoa)?;
        let [cpf, forma, rg, razao, cnpj, contato] = variant_columns(&pessoa.tipo);

        let sql = format!(
            "UPDATE pessoas SET \
                nome = $3, telefone = $4, endereco = $5, email = $6, \
                cpf = $7, forma_pagamento = $8, rg = $9, \
                razao_social = $10, cnpj = $11, contato = $12, updated_at = $13 \
             WHERE tipo = $1 AND id = $2 \
             RETURNING {}",
            COLUNAS
        );

        let updated = sqlx::query_as::<_, Pessoa>(&sql)
            .bind(self.tipo.as_str())
            .bind(id)
            .bind(&pessoa.nome)
            .bind(&pessoa.telefone)
            .bind(&pessoa.endereco)
            .bind(&pessoa.email)
            .bind(cpf)
            .bind(forma)
            .bind(rg)
            .bind(razao)
            .bind(cnpj)
            .bind(contato)
            .bind(pessoa.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM pessoas WHERE tipo = $1 AND id = $2")
            .bind(self.tipo.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pessoas WHERE tipo = $1")
            .bind(self.tipo.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn search(&self, term: &str) -> Result<Vec<Pessoa>, AppError> {
        let sql = format!(
            "SELECT {} FROM pessoas WHERE tipo = $1 AND {} {}",
            COLUNAS,
            self.search_clause(),
            order_clause(None)
        );
        let pessoas = sqlx::query_as::<_, Pessoa>(&sql)
            .bind(self.tipo.as_str())
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(pessoas)
    }
}

#[async_trait]
impl ClienteRepository for PgPessoaRepository {
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Pessoa>, AppError> {
        self.find_by_column("cpf", cpf).await
    }
}

#[async_trait]
impl FabricanteRepository for PgPessoaRepository {
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Pessoa>, AppError> {
        self.find_by_column("cnpj", cnpj).await
    }
}
