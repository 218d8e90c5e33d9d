// src/common/db_utils.rs

use crate::common::{error::AppError, query::SortSpec};

pub const CPF_DUPLICADO: &str = "Cliente com este CPF já existe";
pub const CNPJ_DUPLICADO: &str = "Fabricante com este CNPJ já existe";
pub const IDENTIFICADOR_DUPLICADO: &str = "Venda com este identificador já existe";
pub const USUARIO_DUPLICADO: &str = "Usuário já existe com este email ou nome de usuário";

/// Mensagem para cada chave única criada na migration.
pub fn duplicate_message(constraint: &str) -> &'static str {
    match constraint {
        "pessoas_cpf_key" => CPF_DUPLICADO,
        "pessoas_cnpj_key" => CNPJ_DUPLICADO,
        "vendas_identificador_key" => IDENTIFICADOR_DUPLICADO,
        "users_email_key" | "users_username_key" => USUARIO_DUPLICADO,
        _ => "Registro duplicado",
    }
}

/// Troca a violação de chave única do Postgres por `AppError::Duplicate`.
pub fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            return AppError::Duplicate(duplicate_message(constraint).to_string());
        }
    }
    e.into()
}

/// `ORDER BY` a partir de um campo já validado pela whitelist da entidade.
pub fn order_clause(sort: Option<SortSpec>) -> String {
    match sort {
        Some(SortSpec { field, descending }) => format!(
            "ORDER BY {} {}, created_at ASC, id ASC",
            field,
            if descending { "DESC" } else { "ASC" }
        ),
        None => "ORDER BY created_at ASC, id ASC".to_string(),
    }
}

/// Padrão para `ILIKE`, escapando os curingas digitados pelo usuário.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_order_clause() {
        assert_eq!(order_clause(None), "ORDER BY created_at ASC, id ASC");
        assert_eq!(
            order_clause(Some(SortSpec { field: "nome", descending: true })),
            "ORDER BY nome DESC, created_at ASC, id ASC"
        );
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(like_pattern("ana"), "%ana%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn maps_known_constraints() {
        assert_eq!(duplicate_message("pessoas_cpf_key"), CPF_DUPLICADO);
        assert_eq!(duplicate_message("users_username_key"), USUARIO_DUPLICADO);
        assert_eq!(duplicate_message("outra"), "Registro duplicado");
    }
}
