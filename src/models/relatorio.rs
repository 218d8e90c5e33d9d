// src/models/relatorio.rs

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::venda::Venda;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoMensal {
    #[schema(example = 6)]
    pub month: i32,
    #[schema(value_type = f64, example = 7000.0)]
    pub total_value: Decimal,
    #[schema(example = 2)]
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoCliente {
    pub client_id: Uuid,
    #[schema(example = "Maria Silva")]
    pub client_name: String,
    #[schema(value_type = f64, example = 7000.0)]
    pub total_value: Decimal,
    #[schema(example = 2)]
    pub count: i64,
}

/// Agrupa as vendas do `ano` por mês, em ordem crescente de mês.
pub fn agrupar_por_mes<'a>(vendas: impl IntoIterator<Item = &'a Venda>, ano: i32) -> Vec<ResumoMensal> {
    let mut meses: BTreeMap<i32, (Decimal, i64)> = BTreeMap::new();

    for venda in vendas.into_iter().filter(|v| v.ano == ano) {
        let entry = meses.entry(venda.mes).or_insert((Decimal::ZERO, 0));
        entry.0 += venda.valor_total;
        entry.1 += 1;
    }

    meses
        .into_iter()
        .map(|(month, (total_value, count))| ResumoMensal { month, total_value, count })
        .collect()
}

/// Agrupa por cliente, do maior total para o menor. Vendas de clientes que
/// não estão em `nomes` ficam de fora.
pub fn agrupar_por_cliente<'a>(
    vendas: impl IntoIterator<Item = &'a Venda>,
    nomes: &HashMap<Uuid, String>,
) -> Vec<ResumoCliente> {
    let mut grupos: HashMap<Uuid, (Decimal, i64)> = HashMap::new();

    for venda in vendas {
        if !nomes.contains_key(&venda.clnt) {
            continue;
        }
        let entry = grupos.entry(venda.clnt).or_insert((Decimal::ZERO, 0));
        entry.0 += venda.valor_total;
        entry.1 += 1;
    }

    let mut resumo: Vec<ResumoCliente> = grupos
        .into_iter()
        .filter_map(|(client_id, (total_value, count))| {
            nomes.get(&client_id).map(|nome| ResumoCliente {
                client_id,
                client_name: nome.clone(),
                total_value,
                count,
            })
        })
        .collect();

    resumo.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.client_id.cmp(&b.client_id))
    });
    resumo
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn venda(mes: i32, ano: i32, total: i64, clnt: Uuid) -> Venda {
        Venda {
            id: Uuid::new_v4(),
            identificador: Uuid::new_v4().to_string(),
            dia: 1,
            mes,
            ano,
            valor_total: Decimal::new(total, 0),
            clnt,
            prod: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn groups_sales_by_month_of_the_year() {
        let c = Uuid::new_v4();
        let vendas = vec![
            venda(7, 2025, 100, c),
            venda(6, 2025, 300, c),
            venda(6, 2025, 200, c),
            venda(6, 2024, 999, c),
        ];

        let resumo = agrupar_por_mes(&vendas, 2025);

        assert_eq!(
            resumo,
            vec![
                ResumoMensal { month: 6, total_value: Decimal::new(500, 0), count: 2 },
                ResumoMensal { month: 7, total_value: Decimal::new(100, 0), count: 1 },
            ]
        );
        assert!(agrupar_por_mes(&vendas, 2030).is_empty());
    }

    #[test]
    fn groups_sales_by_client_ordered_by_total() {
        let maria = Uuid::new_v4();
        let joao = Uuid::new_v4();
        let removido = Uuid::new_v4();
        let nomes = HashMap::from([(maria, "Maria".to_string()), (joao, "João".to_string())]);

        let vendas = vec![
            venda(1, 2025, 100, maria),
            venda(2, 2025, 500, joao),
            venda(3, 2025, 50, maria),
            venda(3, 2025, 10_000, removido),
        ];

        let resumo = agrupar_por_cliente(&vendas, &nomes);

        assert_eq!(resumo.len(), 2);
        assert_eq!(resumo[0].client_name, "João");
        assert_eq!(resumo[0].total_value, Decimal::new(500, 0));
        assert_eq!(resumo[1].client_id, maria);
        assert_eq!(resumo[1].count, 2);
        assert_eq!(resumo[1].total_value, Decimal::new(150, 0));
    }

    #[test]
    fn ties_are_ordered_by_client_id() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let nomes = HashMap::from([(a, "A".to_string()), (b, "B".to_string())]);
        let vendas = vec![venda(1, 2025, 100, b), venda(1, 2025, 100, a)];

        let resumo = agrupar_por_cliente(&vendas, &nomes);
        assert_eq!(resumo[0].client_id, a);
        assert_eq!(resumo[1].client_id, b);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ResumoMensal {
            month: 6,
            total_value: Decimal::new(500, 0),
            count: 2,
        })
        .unwrap();
        assert_eq!(json["totalValue"], 500.0);
        assert_eq!(json["count"], 2);
    }
}
