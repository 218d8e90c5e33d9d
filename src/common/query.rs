// src/common/query.rs
//
// Parâmetros de listagem (`?sort=-nome&limit=10&skip=20&search=ana`) e filtros.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub descending: bool,
}

/// Opções de `find_all`. Sem `sort`, a ordem é a de criação.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<SortSpec>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Campo de ordenação; prefixo `-` para ordem decrescente.
    #[param(example = "-created_at")]
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    /// Busca sem diferenciar maiúsculas.
    pub search: Option<String>,
}

impl ListQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Valida o `sort` contra os campos permitidos da entidade.
    pub fn find_options(&self, allowed: &'static [&'static str]) -> Result<FindOptions, AppError> {
        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => {
                let (name, descending) = match raw.strip_prefix('-') {
                    Some(rest) => (rest, true),
                    None => (raw, false),
                };
                let field = allowed
                    .iter()
                    .copied()
                    .find(|f| *f == name)
                    .ok_or_else(|| AppError::BadRequest(format!("Campo de ordenação inválido: '{}'", name)))?;
                Some(SortSpec { field, descending })
            }
        };

        if self.limit.is_some_and(|l| l < 0) || self.skip.is_some_and(|s| s < 0) {
            return Err(AppError::BadRequest("limit e skip não podem ser negativos".into()));
        }

        Ok(FindOptions { sort, limit: self.limit, skip: self.skip })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProdutoFilter {
    pub categoria: Option<String>,
    /// Id do Fabricante.
    pub fabricante: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct VendaFilter {
    /// Id do Cliente.
    pub cliente: Option<String>,
    /// Data inicial (`YYYY-MM-DD`), usada junto com `dataFim`.
    #[param(example = "2025-01-01")]
    pub data_inicio: Option<String>,
    #[param(example = "2025-12-31")]
    pub data_fim: Option<String>,
}

impl VendaFilter {
    /// O período só vale com as duas pontas informadas.
    pub fn periodo(&self) -> Result<Option<(NaiveDate, NaiveDate)>, AppError> {
        match (self.data_inicio.as_deref(), self.data_fim.as_deref()) {
            (Some(inicio), Some(fim)) => Ok(Some((parse_date(inicio)?, parse_date(fim)?))),
            _ => Ok(None),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Formato de data inválido".into()))
}

/// Ids chegam como texto no path/query; um id malformado é erro do cliente.
pub fn parse_id(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim()).map_err(|_| AppError::BadRequest(format!("ID inválido: '{}'", value)))
}
