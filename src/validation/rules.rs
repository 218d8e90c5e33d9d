// src/validation/rules.rs
//
// Funções usadas pelos `#[validate(custom(...))]` dos models.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use super::documents::is_valid_cnpj;

// Aceita (XX) XXXXX-XXXX, (XX)XXXX-XXXX ou só os dígitos
pub static TELEFONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\(\d{2}\)\s?)?\d{4,5}-?\d{4}$").expect("regex de telefone válida")
});

// Colunas de dinheiro são NUMERIC(14, 2): 12 dígitos inteiros e 2 casas.
const CASAS_DECIMAIS: u32 = 2;
const LIMITE_INTEIRO: i64 = 1_000_000_000_000;

/// Valor monetário que cabe na coluna sem arredondar: não negativo,
/// no máximo 2 casas decimais e abaixo de 10^12.
pub fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if val.normalize().scale() > CASAS_DECIMAIS {
        let mut err = ValidationError::new("scale");
        err.add_param("max_scale".into(), &CASAS_DECIMAIS);
        err.message = Some("O valor deve ter no máximo 2 casas decimais.".into());
        return Err(err);
    }
    if *val >= Decimal::new(LIMITE_INTEIRO, 0) {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor excede o limite permitido.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_cnpj(val: &str) -> Result<(), ValidationError> {
    if !is_valid_cnpj(val) {
        let mut err = ValidationError::new("invalid_cnpj");
        err.message = Some(format!("{} não é um CNPJ válido!", val).into());
        return Err(err);
    }
    Ok(())
}

/// O trio (dia, mês, ano) precisa existir no calendário (31/04 não existe, 29/02 só em ano bissexto).
pub fn validate_calendar_date(dia: i32, mes: i32, ano: i32) -> Result<(), ValidationError> {
    let valid = u32::try_from(mes)
        .ok()
        .zip(u32::try_from(dia).ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(ano, m, d))
        .is_some();

    if !valid {
        let mut err = ValidationError::new("invalid_date");
        err.message = Some("Data inválida".into());
        return Err(err);
    }
    Ok(())
}

/// Monta um `ValidationErrors` com um único campo, mantendo o formato padrão de resposta.
pub fn field_error(field: &'static str, code: &'static str, message: impl Into<String>) -> ValidationErrors {
    let message: String = message.into();
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());

    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    errors
}
