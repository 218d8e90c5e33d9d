// src/validation/documents.rs

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

// CPF no formato XXX.XXX.XXX-XX
static CPF_FORMATADO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").expect("regex de CPF válida"));

/// Como o CPF é conferido na escrita de um Cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CpfPolicy {
    /// Dígitos verificadores conferidos (módulo 11).
    #[default]
    Strict,
    /// Só o formato `XXX.XXX.XXX-XX` é conferido. Útil com dados fictícios.
    FormatOnly,
}

impl FromStr for CpfPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "checksum" => Ok(CpfPolicy::Strict),
            "format" | "format-only" => Ok(CpfPolicy::FormatOnly),
            other => Err(format!("modo de validação de CPF desconhecido: '{}'", other)),
        }
    }
}

/// Extrai apenas os dígitos de um documento formatado ("529.982.247-25" -> [5,2,9,...]).
fn digits(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

// Além dos dígitos, só a pontuação das máscaras de CPF e CNPJ.
fn only_document_chars(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '/'))
}

fn document_digits(value: &str, len: usize) -> Option<String> {
    if !only_document_chars(value) {
        return None;
    }
    let d: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    (d.len() == len).then_some(d)
}

/// Reescreve o CPF na máscara `XXX.XXX.XXX-XX`.
/// `None` quando há caracteres estranhos ou a contagem de dígitos não é 11.
pub fn canonical_cpf(value: &str) -> Option<String> {
    let d = document_digits(value, 11)?;
    Some(format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..]))
}

/// Reescreve o CNPJ na máscara `XX.XXX.XXX/XXXX-XX`.
pub fn canonical_cnpj(value: &str) -> Option<String> {
    let d = document_digits(value, 14)?;
    Some(format!("{}.{}.{}/{}-{}", &d[..2], &d[2..5], &d[5..8], &d[8..12], &d[12..]))
}

fn all_equal(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Dígito verificador do CPF sobre `prefix`, com pesos decrescentes a partir de `prefix.len() + 1`.
fn cpf_check_digit(prefix: &[u32]) -> u32 {
    let first_weight = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (first_weight - i as u32))
        .sum();

    let dv = 11 - (sum % 11);
    if dv > 9 { 0 } else { dv }
}

/// Validação completa do CPF (11 dígitos + 2 dígitos verificadores).
pub fn is_valid_cpf(value: &str) -> bool {
    if !only_document_chars(value) {
        return false;
    }
    let d = digits(value);

    if d.len() != 11 || all_equal(&d) {
        return false;
    }

    cpf_check_digit(&d[..9]) == d[9] && cpf_check_digit(&d[..10]) == d[10]
}

/// Confere apenas a máscara do CPF, sem olhar os dígitos verificadores.
pub fn is_formatted_cpf(value: &str) -> bool {
    CPF_FORMATADO.is_match(value)
}

/// Aplica a política configurada.
pub fn check_cpf(value: &str, policy: CpfPolicy) -> bool {
    match policy {
        CpfPolicy::Strict => is_valid_cpf(value),
        CpfPolicy::FormatOnly => is_formatted_cpf(value),
    }
}

/// Dígito verificador do CNPJ: pesos 2..9 aplicados da direita para a esquerda, em ciclo.
fn cnpj_check_digit(prefix: &[u32]) -> u32 {
    let sum: u32 = prefix
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| d * (2 + (i as u32 % 8)))
        .sum();

    let rest = sum % 11;
    if rest < 2 { 0 } else { 11 - rest }
}

/// Validação completa do CNPJ (14 dígitos + 2 dígitos verificadores).
pub fn is_valid_cnpj(value: &str) -> bool {
    if !only_document_chars(value) {
        return false;
    }
    let d = digits(value);

    if d.len() != 14 || all_equal(&d) {
        return false;
    }

    cnpj_check_digit(&d[..12]) == d[12] && cnpj_check_digit(&d[..13]) == d[13]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_valid_cpfs() {
        for cpf in ["529.982.247-25", "123.456.789-09", "11144477735", "935.411.347-80"] {
            assert!(is_valid_cpf(cpf), "{} deveria ser válido", cpf);
        }
    }

    #[test]
    fn flipping_a_check_digit_rejects_the_cpf() {
        assert!(!is_valid_cpf("529.982.247-26"));
        assert!(!is_valid_cpf("529.982.247-15"));
        assert!(!is_valid_cpf("123.456.789-00"));
    }

    #[test]
    fn rejects_repeated_digits_and_wrong_length() {
        for d in 0..=9 {
            let cpf = d.to_string().repeat(11);
            assert!(!is_valid_cpf(&cpf));
            let cnpj = d.to_string().repeat(14);
            assert!(!is_valid_cnpj(&cnpj));
        }
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf("529.982.247-2"));
        assert!(!is_valid_cpf("529.982.247-251"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn format_only_policy_ignores_check_digits() {
        assert!(check_cpf("123.456.789-00", CpfPolicy::FormatOnly));
        assert!(!check_cpf("12345678900", CpfPolicy::FormatOnly));
        assert!(!check_cpf("123.456.789-00", CpfPolicy::Strict));
    }

    #[test]
    fn validates_cnpj_check_digits() {
        for cnpj in ["11.222.333/0001-81", "45.723.174/0001-10", "12345678000195"] {
            assert!(is_valid_cnpj(cnpj), "{} deveria ser válido", cnpj);
        }
        assert!(!is_valid_cnpj("11.222.333/0001-82"));
        assert!(!is_valid_cnpj("11.222.333/0001-91"));
        assert!(!is_valid_cnpj("11.222.333/0001"));
    }

    #[test]
    fn punctuation_outside_the_mask_is_rejected() {
        assert!(!is_valid_cpf("CPF 529-982-247/25 !!"));
        assert!(!is_valid_cpf("529 982 247 25"));
        assert!(!is_valid_cnpj("CNPJ: 11.222.333/0001-81"));
        assert!(is_valid_cpf("529-982-247/25"));
    }

    #[test]
    fn canonical_form_uses_the_standard_mask() {
        assert_eq!(canonical_cpf("52998224725").as_deref(), Some("529.982.247-25"));
        assert_eq!(canonical_cpf("529.982.247-25").as_deref(), Some("529.982.247-25"));
        assert_eq!(canonical_cpf("529-982-247/25").as_deref(), Some("529.982.247-25"));
        assert_eq!(canonical_cpf("CPF 529.982.247-25"), None);
        assert_eq!(canonical_cpf("5299822472"), None);

        assert_eq!(canonical_cnpj("11222333000181").as_deref(), Some("11.222.333/0001-81"));
        assert_eq!(canonical_cnpj("11.222.333/0001-81").as_deref(), Some("11.222.333/0001-81"));
        assert_eq!(canonical_cnpj("11.222.333/0001"), None);
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("strict".parse::<CpfPolicy>(), Ok(CpfPolicy::Strict));
        assert_eq!("FORMAT".parse::<CpfPolicy>(), Ok(CpfPolicy::FormatOnly));
        assert!("lenient".parse::<CpfPolicy>().is_err());
    }
}
