use bigdecimal::rounding::RoundingMode;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::fmt;

use crate::currency;
use crate::fees::MONEY_SCALE;

pub const RECIPIENT_MIN_LEN: usize = 2;
pub const RECIPIENT_MAX_LEN: usize = 255;
pub const CURRENCY_MIN_LEN: usize = 2;
pub const CURRENCY_MAX_LEN: usize = 10;
pub const SEARCH_MIN_LEN: usize = 2;
pub const SEARCH_MAX_LEN: usize = 120;
pub const IDEMPOTENCY_KEY_MIN_LEN: usize = 8;
pub const IDEMPOTENCY_KEY_MAX_LEN: usize = 128;
pub const MAX_TRANSFER_AMOUNT: u64 = 10_000_000;
pub const MAX_DATE_RANGE_DAYS: i64 = 366;

pub const TRANSACTION_STATUSES: &[&str] = &["pending", "processing", "success", "failed"];

/// Punctuation allowed in recipient identifiers and search terms, alongside
/// unicode letters, digits and spaces. Covers phone numbers, card references
/// and person names.
const IDENTIFIER_PUNCTUATION: &[char] = &['@', '+', '_', '.', '-', '(', ')', ':', '#'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_len(
    field: &'static str,
    value: &str,
    min_len: usize,
    max_len: usize,
) -> ValidationResult {
    let len = value.chars().count();
    if len < min_len || len > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {} characters", min_len, max_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == ' ' || IDENTIFIER_PUNCTUATION.contains(&ch)
}

/// Validates and sanitizes a transfer recipient (phone number, card
/// reference or name). Returns the cleaned value.
pub fn validate_recipient_identifier(value: &str) -> Result<String, ValidationError> {
    let recipient = sanitize_string(value);
    validate_required("recipient_identifier", &recipient)?;
    validate_len(
        "recipient_identifier",
        &recipient,
        RECIPIENT_MIN_LEN,
        RECIPIENT_MAX_LEN,
    )?;

    if !recipient.chars().all(is_identifier_char) {
        return Err(ValidationError::new(
            "recipient_identifier",
            "contains invalid characters",
        ));
    }

    Ok(recipient)
}

/// Validates a currency code and returns it normalized. Unknown currencies
/// are a hard error rather than silently falling back to a fee class.
pub fn validate_currency_code(value: &str) -> Result<String, ValidationError> {
    let code = currency::normalize(value);
    validate_required("currency", &code)?;
    validate_len("currency", &code, CURRENCY_MIN_LEN, CURRENCY_MAX_LEN)?;

    if !code.chars().all(|ch| ch.is_ascii_uppercase()) {
        return Err(ValidationError::new("currency", "must contain only letters"));
    }

    if !currency::is_supported(&code) {
        return Err(ValidationError::new(
            "currency",
            format!("unsupported currency: {}", code),
        ));
    }

    Ok(code)
}

pub fn validate_amount(amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    if amount > &BigDecimal::from(MAX_TRANSFER_AMOUNT) {
        return Err(ValidationError::new(
            "amount",
            format!("must not exceed {}", MAX_TRANSFER_AMOUNT),
        ));
    }

    // Anything finer than the ledger's precision cannot be stored exactly.
    if &amount.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp) != amount {
        return Err(ValidationError::new(
            "amount",
            format!("must have at most {} decimal places", MONEY_SCALE),
        ));
    }

    Ok(())
}

pub fn validate_idempotency_key(value: &str) -> ValidationResult {
    if value.len() < IDEMPOTENCY_KEY_MIN_LEN || value.len() > IDEMPOTENCY_KEY_MAX_LEN {
        return Err(ValidationError::new(
            "idempotency_key",
            format!(
                "must be between {} and {} characters",
                IDEMPOTENCY_KEY_MIN_LEN, IDEMPOTENCY_KEY_MAX_LEN
            ),
        ));
    }

    if !value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | ':' | '-'))
    {
        return Err(ValidationError::new(
            "idempotency_key",
            "contains invalid characters",
        ));
    }

    Ok(())
}

pub fn validate_transaction_status(value: &str) -> ValidationResult {
    validate_enum("status", value, TRANSACTION_STATUSES)
}

pub fn validate_search_term(value: &str) -> Result<String, ValidationError> {
    let term = sanitize_string(value);
    validate_len("search", &term, SEARCH_MIN_LEN, SEARCH_MAX_LEN)?;

    if !term.chars().all(is_identifier_char) {
        return Err(ValidationError::new("search", "contains invalid characters"));
    }

    Ok(term)
}

pub fn parse_date_ymd(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::new(field, "must be a YYYY-MM-DD date"))
}

pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> ValidationResult {
    if from > to {
        return Err(ValidationError::new(
            "from",
            "must be earlier than or equal to 'to'",
        ));
    }

    if (to - from).num_days() > MAX_DATE_RANGE_DAYS {
        return Err(ValidationError::new("to", "date range is too large"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_length_bounds() {
        assert!(validate_len("field", "abc", 2, 3).is_ok());
        assert!(validate_len("field", "a", 2, 3).is_err());
        assert!(validate_len("field", "abcd", 2, 3).is_err());
    }

    #[test]
    fn validates_recipient_identifiers() {
        assert_eq!(
            validate_recipient_identifier("+998901234567").unwrap(),
            "+998901234567"
        );
        assert_eq!(
            validate_recipient_identifier("  Ali Valiyev ").unwrap(),
            "Ali Valiyev"
        );
        assert!(validate_recipient_identifier("card:8600-1234").is_ok());
        assert!(validate_recipient_identifier("x").is_err());
        assert!(validate_recipient_identifier("bad;recipient").is_err());
        assert!(validate_recipient_identifier(&"a".repeat(256)).is_err());
    }

    #[test]
    fn validates_currency_codes() {
        assert_eq!(validate_currency_code(" usd ").unwrap(), "USD");
        assert_eq!(validate_currency_code("btc").unwrap(), "BTC");
        assert!(validate_currency_code("DOGE").is_err());
        assert!(validate_currency_code("U").is_err());
        assert!(validate_currency_code("US1").is_err());
    }

    #[test]
    fn validates_amounts() {
        let ok = BigDecimal::from_str("100.50").unwrap();
        let zero = BigDecimal::from(0);
        let negative = BigDecimal::from(-5);
        let too_big = BigDecimal::from(10_000_001u64);
        let too_precise = BigDecimal::from_str("0.000000001").unwrap();

        assert!(validate_amount(&ok).is_ok());
        assert!(validate_amount(&zero).is_err());
        assert!(validate_amount(&negative).is_err());
        assert!(validate_amount(&too_big).is_err());
        assert!(validate_amount(&too_precise).is_err());
    }

    #[test]
    fn validates_idempotency_keys() {
        assert!(validate_idempotency_key("abc12345").is_ok());
        assert!(validate_idempotency_key("order:2026-02-20_retry.1").is_ok());
        assert!(validate_idempotency_key("short").is_err());
        assert!(validate_idempotency_key(&"k".repeat(129)).is_err());
        assert!(validate_idempotency_key("has spaces!").is_err());
    }

    #[test]
    fn validates_transaction_statuses() {
        assert!(validate_transaction_status("success").is_ok());
        assert!(validate_transaction_status("pending").is_ok());
        assert!(validate_transaction_status("unknown").is_err());
    }

    #[test]
    fn validates_search_terms() {
        assert_eq!(validate_search_term(" Ali ").unwrap(), "Ali");
        assert!(validate_search_term("a").is_err());
        assert!(validate_search_term("bad%term").is_err());
    }

    #[test]
    fn parses_and_validates_date_ranges() {
        let from = parse_date_ymd("from", "2026-02-01").unwrap();
        let to = parse_date_ymd("to", "2026-02-20").unwrap();

        assert!(validate_date_range(from, to).is_ok());
        assert!(validate_date_range(to, from).is_err());
        assert!(parse_date_ymd("from", "02/01/2026").is_err());

        let far = parse_date_ymd("to", "2027-03-01").unwrap();
        assert!(validate_date_range(from, far).is_err());
    }
}
