// src/models/venda.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::validation::rules::{field_error, validate_calendar_date, validate_money};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
pub struct Venda {
    pub id: Uuid,

    #[validate(length(min = 1, message = "Identificador é obrigatório"))]
    #[schema(example = "V001")]
    pub identificador: String,

    #[validate(range(min = 1, max = 31, message = "Dia deve estar entre 1 e 31"))]
    pub dia: i32,

    #[validate(range(min = 1, max = 12, message = "Mês deve estar entre 1 e 12"))]
    pub mes: i32,

    #[validate(range(min = 2000, message = "Ano deve ser maior ou igual a 2000"))]
    pub ano: i32,

    #[validate(custom(function = "validate_money"))]
    #[schema(value_type = f64, example = 3500.0)]
    pub valor_total: Decimal,

    /// Id do Cliente.
    pub clnt: Uuid,

    /// Id do Produto.
    pub prod: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Venda {
    pub const SORTABLE_FIELDS: &'static [&'static str] =
        &["identificador", "ano", "mes", "dia", "valor_total", "created_at", "updated_at"];

    pub fn data(&self) -> Option<NaiveDate> {
        let mes = u32::try_from(self.mes).ok()?;
        let dia = u32::try_from(self.dia).ok()?;
        NaiveDate::from_ymd_opt(self.ano, mes, dia)
    }

    /// Regras de campo e, se passarem, a data de calendário.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        self.validate()?;

        if let Err(err) = validate_calendar_date(self.dia, self.mes, self.ano) {
            let message = err.message.map(|m| m.to_string()).unwrap_or_default();
            return Err(field_error("dia", "invalid_date", message));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendaPayload {
    #[schema(example = "V001")]
    pub identificador: String,
    #[schema(example = 15)]
    pub dia: i32,
    #[schema(example = 6)]
    pub mes: i32,
    #[schema(example = 2025)]
    pub ano: i32,
    #[schema(value_type = f64, example = 3500.0)]
    pub valor_total: Decimal,
    pub clnt: Uuid,
    pub prod: Uuid,
}

impl VendaPayload {
    pub fn into_venda(self, now: DateTime<Utc>) -> Venda {
        Venda {
            id: Uuid::new_v4(),
            identificador: self.identificador.trim().to_string(),
            dia: self.dia,
            mes: self.mes,
            ano: self.ano,
            valor_total: self.valor_total,
            clnt: self.clnt,
            prod: self.prod,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VendaPatch {
    pub identificador: Option<String>,
    pub dia: Option<i32>,
    pub mes: Option<i32>,
    pub ano: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub valor_total: Option<Decimal>,
    pub clnt: Option<Uuid>,
    pub prod: Option<Uuid>,
}

impl VendaPatch {
    pub fn apply(self, venda: &mut Venda) {
        if let Some(identificador) = self.identificador {
            venda.identificador = identificador.trim().to_string();
        }
        venda.dia = self.dia.unwrap_or(venda.dia);
        venda.mes = self.mes.unwrap_or(venda.mes);
        venda.ano = self.ano.unwrap_or(venda.ano);
        venda.valor_total = self.valor_total.unwrap_or(venda.valor_total);
        venda.clnt = self.clnt.unwrap_or(venda.clnt);
        venda.prod = self.prod.unwrap_or(venda.prod);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venda(dia: i32, mes: i32, ano: i32) -> Venda {
        VendaPayload {
            identificador: " V001 ".into(),
            dia,
            mes,
            ano,
            valor_total: Decimal::new(350000, 2),
            clnt: Uuid::new_v4(),
            prod: Uuid::new_v4(),
        }
        .into_venda(Utc::now())
    }

    #[test]
    fn rejects_dates_missing_from_the_calendar() {
        let errors = venda(31, 4, 2024).check().unwrap_err();
        assert!(errors.field_errors().contains_key("dia"));

        assert!(venda(30, 4, 2024).check().is_ok());
        assert!(venda(29, 2, 2024).check().is_ok());
        assert!(venda(29, 2, 2025).check().is_err());
    }

    #[test]
    fn field_ranges_are_enforced() {
        let errors = venda(32, 13, 1999).check().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("dia"));
        assert!(fields.contains_key("mes"));
        assert!(fields.contains_key("ano"));
    }

    #[test]
    fn exposes_the_calendar_date() {
        let v = venda(15, 6, 2025);
        assert_eq!(v.identificador, "V001");
        assert_eq!(v.data(), NaiveDate::from_ymd_opt(2025, 6, 15));
        assert_eq!(venda(31, 4, 2024).data(), None);
    }

    #[test]
    fn valor_total_must_fit_the_money_column() {
        let mut v = venda(1, 1, 2025);
        VendaPatch { valor_total: Some(Decimal::new(3_500_005, 3)), ..Default::default() }.apply(&mut v);
        assert!(v.check().unwrap_err().field_errors().contains_key("valor_total"));

        VendaPatch { valor_total: Some(Decimal::new(1_000_000_000_000, 0)), ..Default::default() }.apply(&mut v);
        assert!(v.check().unwrap_err().field_errors().contains_key("valor_total"));

        VendaPatch { valor_total: Some(Decimal::new(99_999_999_999_999, 2)), ..Default::default() }.apply(&mut v);
        assert!(v.check().is_ok());
    }

    #[test]
    fn blank_identificador_is_rejected() {
        let mut v = venda(1, 1, 2025);
        VendaPatch { identificador: Some("   ".into()), ..Default::default() }.apply(&mut v);

        let errors = v.check().unwrap_err();
        assert!(errors.field_errors().contains_key("identificador"));
    }
}
