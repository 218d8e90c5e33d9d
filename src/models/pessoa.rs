// src/models/pessoa.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::validation::{
    documents::{canonical_cnpj, canonical_cpf, check_cpf, CpfPolicy},
    rules::{field_error, validate_cnpj, TELEFONE},
};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FormaPagamento {
    Dinheiro,
    #[serde(rename = "Cartão de Crédito")]
    CartaoCredito,
    #[serde(rename = "Cartão de Débito")]
    CartaoDebito,
    Pix,
    Boleto,
}

impl FormaPagamento {
    pub const ALL: [FormaPagamento; 5] = [
        FormaPagamento::Dinheiro,
        FormaPagamento::CartaoCredito,
        FormaPagamento::CartaoDebito,
        FormaPagamento::Pix,
        FormaPagamento::Boleto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormaPagamento::Dinheiro => "Dinheiro",
            FormaPagamento::CartaoCredito => "Cartão de Crédito",
            FormaPagamento::CartaoDebito => "Cartão de Débito",
            FormaPagamento::Pix => "Pix",
            FormaPagamento::Boleto => "Boleto",
        }
    }
}

impl FromStr for FormaPagamento {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormaPagamento::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| format!("{} não é uma forma de pagamento válida!", s))
    }
}

/// O discriminador gravado na coluna `tipo` da tabela `pessoas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tipo {
    Cliente,
    Fabricante,
}

impl Tipo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tipo::Cliente => "Cliente",
            Tipo::Fabricante => "Fabricante",
        }
    }
}

// --- DADOS DE CADA VARIANTE ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct DadosCliente {
    // Conferido em `Pessoa::check`, pois depende da política configurada
    #[schema(example = "529.982.247-25")]
    pub cpf: String,

    pub forma_pagamento: FormaPagamento,

    #[validate(length(min = 1, message = "RG é obrigatório"))]
    #[schema(example = "1234567")]
    pub rg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct DadosFabricante {
    #[validate(length(min = 3, max = 150, message = "Razão social deve ter entre 3 e 150 caracteres"))]
    #[schema(example = "Tech Brasil Ltda")]
    pub razao_social: String,

    #[validate(custom(function = "validate_cnpj"))]
    #[schema(example = "11.222.333/0001-81")]
    pub cnpj: String,

    #[validate(length(min = 1, message = "Nome do contato é obrigatório"))]
    #[schema(example = "Carlos Souza")]
    pub contato: String,
}

/// Cliente e Fabricante compartilham a base de Pessoa; o `tipo` escolhe a extensão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "tipo")]
pub enum TipoPessoa {
    Cliente(DadosCliente),
    Fabricante(DadosFabricante),
}

impl TipoPessoa {
    pub fn kind(&self) -> Tipo {
        match self {
            TipoPessoa::Cliente(_) => Tipo::Cliente,
            TipoPessoa::Fabricante(_) => Tipo::Fabricante,
        }
    }
}

// --- A ENTIDADE ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Pessoa {
    pub id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Nome deve ter entre 2 e 100 caracteres"))]
    #[schema(example = "Maria Silva")]
    pub nome: String,

    #[validate(regex(path = *TELEFONE, message = "Telefone inválido"))]
    #[schema(example = "(61) 99999-9999")]
    pub telefone: String,

    #[validate(length(min = 5, max = 200, message = "Endereço deve ter entre 5 e 200 caracteres"))]
    #[schema(example = "Rua das Flores, 123, Brasília-DF")]
    pub endereco: String,

    #[validate(email(message = "Email inválido"))]
    #[schema(example = "maria.silva@email.com")]
    pub email: String,

    #[serde(flatten)]
    pub tipo: TipoPessoa,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pessoa {
    pub const SORTABLE_FIELDS: &'static [&'static str] =
        &["nome", "email", "endereco", "created_at", "updated_at"];

    pub fn kind(&self) -> Tipo {
        self.tipo.kind()
    }

    pub fn as_cliente(&self) -> Option<&DadosCliente> {
        match &self.tipo {
            TipoPessoa::Cliente(dados) => Some(dados),
            TipoPessoa::Fabricante(_) => None,
        }
    }

    pub fn as_fabricante(&self) -> Option<&DadosFabricante> {
        match &self.tipo {
            TipoPessoa::Fabricante(dados) => Some(dados),
            TipoPessoa::Cliente(_) => None,
        }
    }

    /// Valida a base e depois a variante. Para no primeiro grupo com erro.
    pub fn check(&self, cpf_policy: CpfPolicy) -> Result<(), ValidationErrors> {
        self.validate()?;

        match &self.tipo {
            TipoPessoa::Cliente(dados) => {
                dados.validate()?;
                if !check_cpf(&dados.cpf, cpf_policy) {
                    return Err(field_error(
                        "cpf",
                        "invalid_cpf",
                        format!("{} não é um CPF válido!", dados.cpf),
                    ));
                }
            }
            TipoPessoa::Fabricante(dados) => dados.validate()?,
        }

        Ok(())
    }
}

// --- PAYLOADS ---

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Documentos são gravados sempre na máscara, para que "52998224725" e
// "529.982.247-25" caiam na mesma chave única. O que não normaliza segue
// como veio e é rejeitado no `check`.
fn normalize_cpf(value: &str) -> String {
    let value = value.trim();
    canonical_cpf(value).unwrap_or_else(|| value.to_string())
}

fn normalize_cnpj(value: &str) -> String {
    let value = value.trim();
    canonical_cnpj(value).unwrap_or_else(|| value.to_string())
}

fn parse_forma_pagamento(value: &str) -> Result<FormaPagamento, ValidationErrors> {
    value
        .parse()
        .map_err(|msg: String| field_error("forma_pagamento", "invalid_payment", msg))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientePayload {
    #[schema(example = "Maria Silva")]
    pub nome: String,
    #[schema(example = "(61) 99999-9999")]
    pub telefone: String,
    #[schema(example = "Rua das Flores, 123, Brasília-DF")]
    pub endereco: String,
    #[schema(example = "maria.silva@email.com")]
    pub email: String,
    #[schema(example = "529.982.247-25")]
    pub cpf: String,
    #[schema(example = "Pix")]
    pub forma_pagamento: String,
    #[schema(example = "1234567")]
    pub rg: String,
}

impl ClientePayload {
    pub fn into_pessoa(self, now: DateTime<Utc>) -> Result<Pessoa, ValidationErrors> {
        let forma_pagamento = parse_forma_pagamento(&self.forma_pagamento)?;

        Ok(Pessoa {
            id: Uuid::new_v4(),
            nome: self.nome.trim().to_string(),
            telefone: self.telefone.trim().to_string(),
            endereco: self.endereco.trim().to_string(),
            email: normalize_email(&self.email),
            tipo: TipoPessoa::Cliente(DadosCliente {
                cpf: normalize_cpf(&self.cpf),
                forma_pagamento,
                rg: self.rg.trim().to_string(),
            }),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FabricantePayload {
    #[schema(example = "Tech Brasil")]
    pub nome: String,
    #[schema(example = "(11) 3333-4444")]
    pub telefone: String,
    #[schema(example = "Av. Paulista, 1000, São Paulo-SP")]
    pub endereco: String,
    #[schema(example = "contato@techbrasil.com.br")]
    pub email: String,
    #[schema(example = "Tech Brasil Ltda")]
    pub razao_social: String,
    #[schema(example = "11.222.333/0001-81")]
    pub cnpj: String,
    #[schema(example = "Carlos Souza")]
    pub contato: String,
}

impl FabricantePayload {
    pub fn into_pessoa(self, now: DateTime<Utc>) -> Pessoa {
        Pessoa {
            id: Uuid::new_v4(),
            nome: self.nome.trim().to_string(),
            telefone: self.telefone.trim().to_string(),
            endereco: self.endereco.trim().to_string(),
            email: normalize_email(&self.email),
            tipo: TipoPessoa::Fabricante(DadosFabricante {
                razao_social: self.razao_social.trim().to_string(),
                cnpj: normalize_cnpj(&self.cnpj),
                contato: self.contato.trim().to_string(),
            }),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Atualização parcial: só os campos presentes são aplicados.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PessoaPatch {
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub email: Option<String>,

    // Cliente
    pub cpf: Option<String>,
    pub forma_pagamento: Option<String>,
    pub rg: Option<String>,

    // Fabricante
    pub razao_social: Option<String>,
    pub cnpj: Option<String>,
    pub contato: Option<String>,
}

fn set_trimmed(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v.trim().to_string();
    }
}

impl PessoaPatch {
    /// Aplica o patch. Campos da outra variante são ignorados.
    pub fn apply(self, pessoa: &mut Pessoa) -> Result<(), ValidationErrors> {
        set_trimmed(&mut pessoa.nome, self.nome);
        set_trimmed(&mut pessoa.telefone, self.telefone);
        set_trimmed(&mut pessoa.endereco, self.endereco);
        if let Some(email) = self.email {
            pessoa.email = normalize_email(&email);
        }

        match &mut pessoa.tipo {
            TipoPessoa::Cliente(dados) => {
                if let Some(cpf) = self.cpf {
                    dados.cpf = normalize_cpf(&cpf);
                }
                set_trimmed(&mut dados.rg, self.rg);
                if let Some(forma) = self.forma_pagamento {
                    dados.forma_pagamento = parse_forma_pagamento(&forma)?;
                }
            }
            TipoPessoa::Fabricante(dados) => {
                set_trimmed(&mut dados.razao_social, self.razao_social);
                if let Some(cnpj) = self.cnpj {
                    dados.cnpj = normalize_cnpj(&cnpj);
                }
                set_trimmed(&mut dados.contato, self.contato);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cliente_payload() -> ClientePayload {
        ClientePayload {
            nome: "  Maria Silva ".into(),
            telefone: "(61) 99999-9999".into(),
            endereco: "Rua Teste, 123, Brasília-DF".into(),
            email: "Maria.Silva@Email.com".into(),
            cpf: "529.982.247-25".into(),
            forma_pagamento: "Cartão de Crédito".into(),
            rg: "1234567".into(),
        }
    }

    #[test]
    fn builds_a_valid_cliente() {
        let pessoa = cliente_payload().into_pessoa(Utc::now()).unwrap();

        assert_eq!(pessoa.nome, "Maria Silva");
        assert_eq!(pessoa.email, "maria.silva@email.com");
        assert_eq!(pessoa.kind(), Tipo::Cliente);
        assert_eq!(pessoa.as_cliente().unwrap().forma_pagamento, FormaPagamento::CartaoCredito);
        assert!(pessoa.check(CpfPolicy::Strict).is_ok());
    }

    #[test]
    fn rejects_unknown_payment_method() {
        let mut payload = cliente_payload();
        payload.forma_pagamento = "Método Inválido".into();

        let errors = payload.into_pessoa(Utc::now()).unwrap_err();
        assert!(errors.field_errors().contains_key("forma_pagamento"));
    }

    #[test]
    fn cpf_checksum_depends_on_policy() {
        let mut payload = cliente_payload();
        payload.cpf = "123.456.789-00".into();
        let pessoa = payload.into_pessoa(Utc::now()).unwrap();

        let errors = pessoa.check(CpfPolicy::Strict).unwrap_err();
        assert!(errors.field_errors().contains_key("cpf"));
        assert!(pessoa.check(CpfPolicy::FormatOnly).is_ok());
    }

    #[test]
    fn base_fields_are_validated() {
        let mut pessoa = cliente_payload().into_pessoa(Utc::now()).unwrap();
        pessoa.telefone = "123".into();
        pessoa.endereco = "Rua".into();

        let errors = pessoa.check(CpfPolicy::Strict).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("telefone"));
        assert!(fields.contains_key("endereco"));
    }

    #[test]
    fn fabricante_requires_valid_cnpj_and_razao_social() {
        let mut pessoa = FabricantePayload {
            nome: "Tech Brasil".into(),
            telefone: "(11) 3333-4444".into(),
            endereco: "Av. Paulista, 1000".into(),
            email: "contato@tech.com.br".into(),
            razao_social: "Tech Brasil Ltda".into(),
            cnpj: "11.222.333/0001-81".into(),
            contato: "Carlos".into(),
        }
        .into_pessoa(Utc::now());
        assert!(pessoa.check(CpfPolicy::Strict).is_ok());

        PessoaPatch {
            cnpj: Some("11.111.111/1111-11".into()),
            razao_social: Some("AB".into()),
            ..Default::default()
        }
        .apply(&mut pessoa)
        .unwrap();

        let errors = pessoa.check(CpfPolicy::Strict).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("cnpj"));
        assert!(fields.contains_key("razao_social"));
    }

    #[test]
    fn documents_are_stored_in_the_masked_form() {
        let mut payload = cliente_payload();
        payload.cpf = " 52998224725 ".into();
        let mut pessoa = payload.into_pessoa(Utc::now()).unwrap();
        assert_eq!(pessoa.as_cliente().unwrap().cpf, "529.982.247-25");

        PessoaPatch { cpf: Some("CPF 529-982-247/25 !!".into()), ..Default::default() }
            .apply(&mut pessoa)
            .unwrap();
        assert_eq!(pessoa.as_cliente().unwrap().cpf, "CPF 529-982-247/25 !!");
        let errors = pessoa.check(CpfPolicy::Strict).unwrap_err();
        assert!(errors.field_errors().contains_key("cpf"));
        let errors = pessoa.check(CpfPolicy::FormatOnly).unwrap_err();
        assert!(errors.field_errors().contains_key("cpf"));

        let fabricante = FabricantePayload {
            nome: "Tech Brasil".into(),
            telefone: "(11) 3333-4444".into(),
            endereco: "Av. Paulista, 1000".into(),
            email: "contato@tech.com.br".into(),
            razao_social: "Tech Brasil Ltda".into(),
            cnpj: "11222333000181".into(),
            contato: "Carlos".into(),
        }
        .into_pessoa(Utc::now());
        assert_eq!(fabricante.as_fabricante().unwrap().cnpj, "11.222.333/0001-81");
    }

    #[test]
    fn serializes_flat_with_tipo_tag() {
        let pessoa = cliente_payload().into_pessoa(Utc::now()).unwrap();
        let json = serde_json::to_value(&pessoa).unwrap();

        assert_eq!(json["tipo"], "Cliente");
        assert_eq!(json["cpf"], "529.982.247-25");
        assert_eq!(json["forma_pagamento"], "Cartão de Crédito");
        assert_eq!(json["nome"], "Maria Silva");
    }

    #[test]
    fn patch_ignores_fields_of_the_other_variant() {
        let mut pessoa = cliente_payload().into_pessoa(Utc::now()).unwrap();
        PessoaPatch {
            nome: Some("Maria Souza".into()),
            cnpj: Some("11.222.333/0001-81".into()),
            ..Default::default()
        }
        .apply(&mut pessoa)
        .unwrap();

        assert_eq!(pessoa.nome, "Maria Souza");
        assert!(pessoa.as_fabricante().is_none());
    }
}
