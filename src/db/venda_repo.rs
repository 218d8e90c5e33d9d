// src/db/venda_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{like_pattern, map_unique_violation, order_clause},
        error::AppError,
        query::FindOptions,
    },
    db::repository::{Repository, VendaRepository},
    models::{
        relatorio::{ResumoCliente, ResumoMensal},
        venda::Venda,
    },
};

const COLUNAS: &str = "id, identificador, dia, mes, ano, valor_total, clnt, prod, created_at, updated_at";

#[derive(Clone)]
pub struct PgVendaRepository {
    pool: PgPool,
}

impl PgVendaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists_where(&self, column: &'static str, id: Uuid) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM vendas WHERE {} = $1)", column);
        let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(exists)
    }
}

#[async_trait]
impl Repository<Venda> for PgVendaRepository {
    async fn create(&self, venda: &Venda) -> Result<Venda, AppError> {
        let sql = format!(
            "INSERT INTO vendas ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            COLUNAS, COLUNAS
        );
        let created = sqlx::query_as::<_, Venda>(&sql)
            .bind(venda.id)
            .bind(&venda.identificador)
            .bind(venda.dia)
            .bind(venda.mes)
            .bind(venda.ano)
            .bind(venda.valor_total)
            .bind(venda.clnt)
            .bind(venda.prod)
            .bind(venda.created_at)
            .bind(venda.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Venda>, AppError> {
        let sql = format!("SELECT {} FROM vendas WHERE id = $1", COLUNAS);
        let venda = sqlx::query_as::<_, Venda>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(venda)
    }

    async fn find_all(&self, options: &FindOptions) -> Result<Vec<Venda>, AppError> {
        let sql = format!(
            "SELECT {} FROM vendas {} LIMIT $1 OFFSET $2",
            COLUNAS,
            order_clause(options.sort)
        );
        let vendas = sqlx::query_as::<_, Venda>(&sql)
            .bind(options.limit)
            .bind(options.skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(vendas)
    }

    async fn update_by_id(&self, id: Uuid, venda: &Venda) -> Result<Option<Venda>, AppError> {
        let sql = format!(
            "UPDATE vendas SET identificador = $2, dia = $3, mes = $4, ano = $5, \
             valor_total = $6, clnt = $7, prod = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {}",
            COLUNAS
        );
        let updated = sqlx::query_as::<_, Venda>(&sql)
            .bind(id)
            .bind(&venda.identificador)
            .bind(venda.dia)
            .bind(venda.mes)
            .bind(venda.ano)
            .bind(venda.valor_total)
            .bind(venda.clnt)
            .bind(venda.prod)
            .bind(venda.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vendas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vendas")
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn search(&self, term: &str) -> Result<Vec<Venda>, AppError> {
        let sql = format!(
            "SELECT {} FROM vendas WHERE identificador ILIKE $1 {}",
            COLUNAS,
            order_clause(None)
        );
        let vendas = sqlx::query_as::<_, Venda>(&sql)
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(vendas)
    }
}

#[async_trait]
impl VendaRepository for PgVendaRepository {
    async fn find_by_identificador(&self, identificador: &str) -> Result<Option<Venda>, AppError> {
        let sql = format!("SELECT {} FROM vendas WHERE identificador = $1", COLUNAS);
        let venda = sqlx::query_as::<_, Venda>(&sql)
            .bind(identificador)
            .fetch_optional(&self.pool)
            .await?;
        Ok(venda)
    }

    async fn find_by_cliente(&self, cliente_id: Uuid) -> Result<Vec<Venda>, AppError> {
        let sql = format!("SELECT {} FROM vendas WHERE clnt = $1 {}", COLUNAS, order_clause(None));
        let vendas = sqlx::query_as::<_, Venda>(&sql)
            .bind(cliente_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(vendas)
    }

    async fn find_by_periodo(&self, inicio: NaiveDate, fim: NaiveDate) -> Result<Vec<Venda>, AppError> {
        // Toda venda gravada passou pela validação de calendário, então make_date não falha
        let sql = format!(
            "SELECT {} FROM vendas WHERE make_date(ano, mes, dia) BETWEEN $1 AND $2 \
             ORDER BY ano, mes, dia, created_at",
            COLUNAS
        );
        let vendas = sqlx::query_as::<_, Venda>(&sql)
            .bind(inicio)
            .bind(fim)
            .fetch_all(&self.pool)
            .await?;
        Ok(vendas)
    }

    async fn exists_for_cliente(&self, cliente_id: Uuid) -> Result<bool, AppError> {
        self.exists_where("clnt", cliente_id).await
    }

    async fn exists_for_produto(&self, produto_id: Uuid) -> Result<bool, AppError> {
        self.exists_where("prod", produto_id).await
    }

    async fn summary_by_month(&self, ano: i32) -> Result<Vec<ResumoMensal>, AppError> {
        let resumo = sqlx::query_as::<_, ResumoMensal>(
            r#"
            SELECT mes AS month, SUM(valor_total) AS total_value, COUNT(*) AS count
            FROM vendas
            WHERE ano = $1
            GROUP BY mes
            ORDER BY mes ASC
            "#,
        )
        .bind(ano)
        .fetch_all(&self.pool)
        .await?;
        Ok(resumo)
    }

    async fn summary_by_cliente(&self) -> Result<Vec<ResumoCliente>, AppError> {
        let resumo = sqlx::query_as::<_, ResumoCliente>(
            r#"
            SELECT v.clnt AS client_id, p.nome AS client_name,
                   SUM(v.valor_total) AS total_value, COUNT(*) AS count
            FROM vendas v
            JOIN pessoas p ON p.id = v.clnt AND p.tipo = 'Cliente'
            GROUP BY v.clnt, p.nome
            ORDER BY total_value DESC, client_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(resumo)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        db::pessoa_repo::PgPessoaRepository,
        models::{pessoa::ClientePayload, venda::VendaPayload},
    };

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL apontando para um Postgres de teste");
        let pool = PgPool::connect(&url).await.unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    // Roda com `cargo test -- --ignored` e um banco disponível.
    // O ano aleatório isola as vendas de outras execuções.
    #[tokio::test]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn summaries_and_period_queries_run_on_postgres() {
        let pool = pool().await;
        let clientes = PgPessoaRepository::clientes(pool.clone());
        let vendas = PgVendaRepository::new(pool);

        let marca = Uuid::new_v4().simple().to_string();
        let ano = 2100 + (Uuid::new_v4().as_u128() % 5000) as i32;

        let cliente = ClientePayload {
            nome: format!("Cliente {}", &marca[..8]),
            telefone: "(61) 99999-9999".into(),
            endereco: "Rua Teste, 123".into(),
            email: format!("{}@email.com", marca),
            cpf: marca[..14].to_string(),
            forma_pagamento: "Pix".into(),
            rg: "1234567".into(),
        }
        .into_pessoa(Utc::now())
        .unwrap();
        let cliente = clientes.create(&cliente).await.unwrap();
        let prod = Uuid::new_v4();

        let mut criadas = Vec::new();
        for (n, (dia, mes, centavos)) in [(10, 6, 200_000), (20, 6, 150_050), (5, 7, 80_000)].into_iter().enumerate() {
            let venda = VendaPayload {
                identificador: format!("{}-{}", marca, n),
                dia,
                mes,
                ano,
                valor_total: Decimal::new(centavos, 2),
                clnt: cliente.id,
                prod,
            }
            .into_venda(Utc::now());
            criadas.push(vendas.create(&venda).await.unwrap());
        }

        let mensal = vendas.summary_by_month(ano).await.unwrap();
        assert_eq!(mensal.len(), 2);
        assert_eq!((mensal[0].month, mensal[0].count), (6, 2));
        assert_eq!(mensal[0].total_value, Decimal::new(350_050, 2));
        assert_eq!((mensal[1].month, mensal[1].count), (7, 1));
        assert_eq!(mensal[1].total_value, Decimal::new(80_000, 2));

        let por_cliente = vendas.summary_by_cliente().await.unwrap();
        let resumo = por_cliente.iter().find(|r| r.client_id == cliente.id).unwrap();
        assert_eq!(resumo.client_name, cliente.nome);
        assert_eq!(resumo.count, 3);
        assert_eq!(resumo.total_value, Decimal::new(430_050, 2));

        let inicio = NaiveDate::from_ymd_opt(ano, 6, 15).unwrap();
        let fim = NaiveDate::from_ymd_opt(ano, 7, 5).unwrap();
        let ids: Vec<Uuid> = vendas
            .find_by_periodo(inicio, fim)
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![criadas[1].id, criadas[2].id]);

        for venda in &criadas {
            assert!(vendas.delete_by_id(venda.id).await.unwrap());
        }
        assert!(clientes.delete_by_id(cliente.id).await.unwrap());
    }
}
