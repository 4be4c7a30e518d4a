// src/common/identity.rs
//
// Forma canônica de telefone e e-mail. Toda comparação e toda escrita
// de telefone/e-mail passa por aqui.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::common::error::AppError;

const PHONE_DIGITS: usize = 10;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex de e-mail válida"));

fn last_ten_digits(raw: &str) -> Option<String> {
    let digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < PHONE_DIGITS {
        return None;
    }
    Some(digits[digits.len() - PHONE_DIGITS..].iter().collect())
}

/// Versão leniente, usada em comparações: string vazia quando há menos de 10 dígitos.
pub fn normalize_phone(raw: &str) -> String {
    last_ten_digits(raw).unwrap_or_default()
}

/// Versão estrita, usada antes de persistir.
pub fn phone_for_storage(raw: &str) -> Option<String> {
    last_ten_digits(raw)
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn email_for_storage(raw: &str) -> Option<String> {
    let email = normalize_email(raw);
    if email.is_empty() || !EMAIL_RE.is_match(&email) {
        return None;
    }
    Some(email)
}

/// Telefone/e-mail vindo explicitamente do cliente HTTP: vazio conta como
/// ausente, inválido vira 400.
pub fn explicit_phone(raw: Option<&str>) -> Result<Option<String>, AppError> {
    explicit(raw, phone_for_storage, "Invalid phone number. Use at least 10 digits.")
}

pub fn explicit_email(raw: Option<&str>) -> Result<Option<String>, AppError> {
    explicit(raw, email_for_storage, "Invalid email address.")
}

fn explicit(
    raw: Option<&str>,
    normalize: fn(&str) -> Option<String>,
    message: &'static str,
) -> Result<Option<String>, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => normalize(value).map(Some).ok_or_else(|| AppError::invalid(message)),
    }
}

/// Identidade canônica (derivada, nunca persistida como tal).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(phone: Option<&str>, email: Option<&str>) -> Self {
        Self {
            phone: phone.and_then(phone_for_storage),
            email: email.and_then(email_for_storage),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none()
    }

    /// Mesmas regras do Recipient Resolver, aplicadas a um único registro:
    /// telefone exato ou sufixo, e-mail sem diferenciar maiúsculas.
    pub fn matches(&self, recipient_phone: Option<&str>, recipient_email: Option<&str>) -> bool {
        let phone_hit = match (self.phone.as_deref(), recipient_phone) {
            (Some(mine), Some(stored)) => phone_matches(stored, mine),
            _ => false,
        };
        let email_hit = match (self.email.as_deref(), recipient_email) {
            (Some(mine), Some(stored)) => normalize_email(stored) == mine,
            _ => false,
        };
        phone_hit || email_hit
    }
}

/// `stored` pode ser um formato legado mais longo (ex: com DDI): os dois lados
/// passam pelo normalizador leniente, que fica com os últimos 10 dígitos.
pub fn phone_matches(stored: &str, canonical: &str) -> bool {
    let wanted = normalize_phone(canonical);
    !wanted.is_empty() && normalize_phone(stored) == wanted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("+91 98765-43210", Some("9876543210"))]
    #[case("9876543210", Some("9876543210"))]
    #[case("(987) 654-3210", Some("9876543210"))]
    #[case("0091 9876543210", Some("9876543210"))]
    #[case("12345", None)]
    #[case("", None)]
    #[case("phone: n/a", None)]
    fn phone_for_storage_keeps_last_ten_digits(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(phone_for_storage(raw).as_deref(), expected);
    }

    #[rstest]
    #[case("+91-98765 43210", "9876543210")]
    #[case("123", "")]
    fn normalize_phone_is_lenient(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_phone(raw), expected);
    }

    #[test]
    fn normalized_phones_are_digits_only() {
        for raw in ["+1 (555) 010-9999 ext 12", "98-76-54-32-10", "abc9876543210xyz"] {
            let phone = normalize_phone(raw);
            assert_eq!(phone.len(), 10);
            assert!(phone.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[rstest]
    #[case(" User@Example.COM ", Some("user@example.com"))]
    #[case("a@b.co", Some("a@b.co"))]
    #[case("not-an-email", None)]
    #[case("missing@tld", None)]
    #[case("two words@example.com", None)]
    #[case("   ", None)]
    fn email_for_storage_validates(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(email_for_storage(raw).as_deref(), expected);
    }

    #[test]
    fn normalize_email_of_blank_is_empty() {
        assert_eq!(normalize_email("  "), "");
    }

    #[test]
    fn identity_matches_exact_suffix_and_email() {
        let me = Identity::new(Some("+91 98765 43210"), Some("Me@Mail.com"));

        assert!(me.matches(Some("9876543210"), None));
        assert!(me.matches(Some("919876543210"), None));
        assert!(me.matches(None, Some("ME@mail.com")));
        assert!(!me.matches(Some("9876543211"), Some("other@mail.com")));
        assert!(!me.matches(None, None));
    }

    #[test]
    fn empty_identity_matches_nothing() {
        let nobody = Identity::default();
        assert!(nobody.is_empty());
        assert!(!nobody.matches(Some("9876543210"), Some("a@b.co")));
    }

    #[rstest]
    #[case("919876543210", "9876543210", true)]
    #[case("+91 98765-43210", "98765 43210", true)]
    #[case("76543210", "9876543210", false)]
    #[case("9876543210", "", false)]
    #[case("", "", false)]
    fn phone_matches_compares_normalized_forms(#[case] stored: &str, #[case] canonical: &str, #[case] expected: bool) {
        assert_eq!(phone_matches(stored, canonical), expected);
    }

    #[test]
    fn matching_is_symmetric_under_normalization() {
        let stored = phone_for_storage("+91-98765 43210").unwrap();
        let caller = Identity::new(Some("98765 43210"), None);
        assert!(caller.matches(Some(&stored), None));
    }

    #[test]
    fn explicit_values_blank_is_absent_invalid_is_error() {
        assert_eq!(explicit_phone(Some("   ")).unwrap(), None);
        assert_eq!(explicit_phone(None).unwrap(), None);
        assert_eq!(explicit_phone(Some("+91 98765 43210")).unwrap().as_deref(), Some("9876543210"));
        assert!(matches!(explicit_phone(Some("12")), Err(AppError::InvalidInput(_))));
        assert!(matches!(explicit_email(Some("nope")), Err(AppError::InvalidInput(_))));
    }
}
