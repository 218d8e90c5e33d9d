// src/models/produto.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::validation::rules::{field_error, validate_money};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
pub struct Produto {
    pub id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Nome deve ter entre 2 e 100 caracteres"))]
    #[schema(example = "Notebook Pro")]
    pub nome: String,

    #[validate(custom(function = "validate_money"))]
    #[schema(value_type = f64, example = 2500.0)]
    pub valor_custo: Decimal,

    #[validate(custom(function = "validate_money"))]
    #[schema(value_type = f64, example = 3500.0)]
    pub valor_venda: Decimal,

    #[validate(length(min = 1, message = "Categoria é obrigatória"))]
    #[schema(example = "Eletrônicos")]
    pub categoria: String,

    /// Id do Fabricante.
    pub fabr: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Produto {
    pub const SORTABLE_FIELDS: &'static [&'static str] = &[
        "nome",
        "categoria",
        "valor_custo",
        "valor_venda",
        "created_at",
        "updated_at",
    ];

    /// Regras de campo e a margem (`valor_venda > valor_custo`).
    pub fn check(&self) -> Result<(), ValidationErrors> {
        self.validate()?;

        if self.valor_venda <= self.valor_custo {
            return Err(field_error(
                "valor_venda",
                "margin",
                "Valor de venda deve ser maior que o valor de custo",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProdutoPayload {
    #[schema(example = "Notebook Pro")]
    pub nome: String,
    #[schema(value_type = f64, example = 2500.0)]
    pub valor_custo: Decimal,
    #[schema(value_type = f64, example = 3500.0)]
    pub valor_venda: Decimal,
    #[schema(example = "Eletrônicos")]
    pub categoria: String,
    pub fabr: Uuid,
}

impl ProdutoPayload {
    pub fn into_produto(self, now: DateTime<Utc>) -> Produto {
        Produto {
            id: Uuid::new_v4(),
            nome: self.nome.trim().to_string(),
            valor_custo: self.valor_custo,
            valor_venda: self.valor_venda,
            categoria: self.categoria.trim().to_string(),
            fabr: self.fabr,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProdutoPatch {
    pub nome: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub valor_custo: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub valor_venda: Option<Decimal>,
    pub categoria: Option<String>,
    pub fabr: Option<Uuid>,
}

impl ProdutoPatch {
    pub fn apply(self, produto: &mut Produto) {
        if let Some(nome) = self.nome {
            produto.nome = nome.trim().to_string();
        }
        if let Some(categoria) = self.categoria {
            produto.categoria = categoria.trim().to_string();
        }
        if let Some(v) = self.valor_custo {
            produto.valor_custo = v;
        }
        if let Some(v) = self.valor_venda {
            produto.valor_venda = v;
        }
        if let Some(fabr) = self.fabr {
            produto.fabr = fabr;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn produto(custo: Decimal, venda: Decimal) -> Produto {
        ProdutoPayload {
            nome: "Notebook".into(),
            valor_custo: custo,
            valor_venda: venda,
            categoria: " Eletrônicos ".into(),
            fabr: Uuid::new_v4(),
        }
        .into_produto(Utc::now())
    }

    #[test]
    fn sale_value_must_exceed_cost() {
        let custo = Decimal::new(10000, 2);

        let igual = produto(custo, custo).check().unwrap_err();
        assert!(igual.field_errors().contains_key("valor_venda"));

        let menor = produto(custo, Decimal::new(9999, 2)).check().unwrap_err();
        assert!(menor.field_errors().contains_key("valor_venda"));

        let um_centavo = custo + Decimal::new(1, 2);
        assert!(produto(custo, um_centavo).check().is_ok());
    }

    #[test]
    fn negative_cost_is_rejected() {
        let errors = produto(Decimal::new(-1, 0), Decimal::new(10, 0)).check().unwrap_err();
        assert!(errors.field_errors().contains_key("valor_custo"));
    }

    #[test]
    fn values_must_fit_the_money_column() {
        // 100.004 > 100.001, mas os dois arredondam para 100.00
        let errors = produto(Decimal::new(100_001, 3), Decimal::new(100_004, 3)).check().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("valor_custo"));
        assert!(fields.contains_key("valor_venda"));

        let errors = produto(Decimal::new(100, 0), Decimal::new(1_000_000_000_000, 0)).check().unwrap_err();
        assert!(errors.field_errors().contains_key("valor_venda"));
    }

    #[test]
    fn patch_is_checked_after_merge() {
        let mut p = produto(Decimal::new(100, 0), Decimal::new(150, 0));
        assert_eq!(p.categoria, "Eletrônicos");

        ProdutoPatch { valor_custo: Some(Decimal::new(200, 0)), ..Default::default() }.apply(&mut p);
        assert!(p.check().is_err());

        ProdutoPatch { valor_venda: Some(Decimal::new(250, 0)), ..Default::default() }.apply(&mut p);
        assert!(p.check().is_ok());
    }
}
