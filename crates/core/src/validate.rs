//! Field validation helpers.
//!
//! All helpers take the field name first so error messages point at the
//! offending request field. Values are expected to be trimmed by the caller
//! (see [`trimmed`]).

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};
use crate::limits;

const SPANISH_LETTERS: &str = "ñÑáéíóúÁÉÍÓÚüÜ";

/// Trim a required field and reject it when empty.
pub fn trimmed(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

/// Trim an optional field; blank strings collapse to `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Length check in characters (not bytes).
pub fn length(field: &str, value: &str, min: usize, max: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(DomainError::validation(format!(
            "{field} must be between {min} and {max} characters (got {len})"
        )));
    }
    Ok(())
}

fn charset(field: &str, value: &str, allowed: impl Fn(char) -> bool) -> DomainResult<()> {
    match value.chars().find(|c| !allowed(*c)) {
        Some(c) => Err(DomainError::validation(format!(
            "{field} contains an invalid character '{c}'"
        ))),
        None => Ok(()),
    }
}

fn is_spanish_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || SPANISH_LETTERS.contains(c)
}

/// Login name: `[a-zA-Z0-9_.-]`, 8 to 32 characters.
pub fn username(value: &str) -> DomainResult<()> {
    length(
        "username",
        value,
        limits::USERNAME_MIN_LEN,
        limits::USERNAME_MAX_LEN,
    )?;
    charset("username", value, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
    })
}

/// First/last names: letters (including Spanish accents), apostrophes and spaces.
pub fn person_name(field: &str, value: &str) -> DomainResult<()> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    charset(field, value, |c| is_spanish_letter(c) || matches!(c, '\'' | ' '))
}

pub fn store_name(value: &str) -> DomainResult<()> {
    length("name", value, limits::NAME_MIN_LEN, limits::NAME_MAX_LEN)?;
    charset("name", value, |c| {
        is_spanish_letter(c) || c.is_ascii_digit() || matches!(c, '$' | '\'' | ' ')
    })
}

pub fn product_name(value: &str) -> DomainResult<()> {
    length("name", value, limits::NAME_MIN_LEN, limits::NAME_MAX_LEN)?;
    charset("name", value, |c| {
        is_spanish_letter(c) || c.is_ascii_digit() || matches!(c, '\'' | ' ' | '-')
    })
}

/// Coupon codes are typed by shoppers, so keep them to plain ASCII.
pub fn coupon_name(value: &str) -> DomainResult<()> {
    length("name", value, limits::NAME_MIN_LEN, limits::NAME_MAX_LEN)?;
    charset("name", value, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
    })
}

pub fn email(value: &str) -> DomainResult<()> {
    let invalid = || DomainError::validation(format!("email '{value}' is not a valid address"));

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || local
            .chars()
            .any(|c| c.is_whitespace() || "<>()[]\\,;:@\"".contains(c))
    {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid());
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    if !labels_ok || !tld_ok {
        return Err(invalid());
    }
    Ok(())
}

/// Chilean tax identifier: digits, a dash, then a digit or `k`.
pub fn rut(value: &str) -> DomainResult<()> {
    let invalid = || DomainError::validation(format!("rut '{value}' is not a valid RUT"));

    let mut parts = value.splitn(2, ['-', '‐']);
    let body = parts.next().unwrap_or_default();
    let check = parts.next().ok_or_else(invalid)?;

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let mut check_chars = check.chars();
    match (check_chars.next(), check_chars.next()) {
        (Some(c), None) if c.is_ascii_digit() || c == 'k' || c == 'K' => Ok(()),
        _ => Err(invalid()),
    }
}

pub fn http_url(field: &str, value: &str) -> DomainResult<()> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') && !rest.contains(char::is_whitespace) => Ok(()),
        _ => Err(DomainError::validation(format!(
            "{field} must be an http(s) URL"
        ))),
    }
}

/// Inclusive decimal range check.
pub fn decimal_range(field: &str, value: Decimal, min: Decimal, max: Decimal) -> DomainResult<()> {
    if value < min || value > max {
        return Err(DomainError::validation(format!(
            "{field} must be between {min} and {max} (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_rejects_blank() {
        assert!(trimmed("name", "   ").is_err());
        assert_eq!(trimmed("name", "  Shop ").unwrap(), "Shop");
    }

    #[test]
    fn optional_collapses_blank_to_none() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(Some(" x ")), Some("x".to_string()));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn username_rules() {
        assert!(username("john.doe_99").is_ok());
        assert!(username("short").is_err());
        assert!(username("has spaces in it").is_err());
    }

    #[test]
    fn person_names_accept_accents() {
        assert!(person_name("fname", "José María").is_ok());
        assert!(person_name("lname", "O'Higgins").is_ok());
        assert!(person_name("fname", "R2D2").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(email("ana@example.cl").is_ok());
        assert!(email("ana.perez+shop@mail.example.com").is_ok());
        assert!(email("ana@localhost").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("ana example@x.com").is_err());
        assert!(email("ana@example.c0m").is_err());
    }

    #[test]
    fn rut_rules() {
        assert!(rut("12345678-9").is_ok());
        assert!(rut("7654321-k").is_ok());
        assert!(rut("7654321-K").is_ok());
        assert!(rut("7654321").is_err());
        assert!(rut("76543x1-1").is_err());
        assert!(rut("7654321-12").is_err());
    }

    #[test]
    fn url_rules() {
        assert!(http_url("image_url", "https://cdn.example.com/a.png").is_ok());
        assert!(http_url("image_url", "ftp://cdn.example.com/a.png").is_err());
        assert!(http_url("image_url", "https://").is_err());
    }

    #[test]
    fn name_charsets() {
        assert!(store_name("Tienda $1 Don José").is_ok());
        assert!(product_name("Mesa de roble - 2m").is_ok());
        assert!(product_name("Mesa!").is_err());
        assert!(coupon_name("SUMMER-20").is_ok());
        assert!(coupon_name("SUMMER 20").is_err());
    }

    #[test]
    fn decimal_range_is_inclusive() {
        let min = Decimal::ZERO;
        let max = Decimal::from(100);
        assert!(decimal_range("discount", Decimal::from(100), min, max).is_ok());
        assert!(decimal_range("discount", Decimal::from(101), min, max).is_err());
    }
}
