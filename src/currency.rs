//! Currency classification and fee rates.
//! Pure lookups over the fixed currency sets the platform custodies.

use bigdecimal::BigDecimal;

pub const FIAT_CURRENCIES: &[&str] = &["USD", "UZS", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF"];
pub const CRYPTO_CURRENCIES: &[&str] = &["USDT", "BTC", "ETH"];

/// Currencies every user gets a zero-balance wallet for at registration.
pub const DEFAULT_WALLET_CURRENCIES: &[&str] = &["USD", "UZS", "USDT", "BTC"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyClass {
    Fiat,
    Crypto,
}

impl CurrencyClass {
    /// Platform fee rate: 0.5% for fiat, 1.0% for crypto.
    pub fn fee_rate(self) -> BigDecimal {
        match self {
            CurrencyClass::Fiat => BigDecimal::new(5.into(), 3),
            CurrencyClass::Crypto => BigDecimal::new(1.into(), 2),
        }
    }
}

pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Classifies a currency code. Unknown codes are not defaulted to a class;
/// callers reject them before any money math happens.
pub fn classify(code: &str) -> Option<CurrencyClass> {
    let normalized = normalize(code);
    if FIAT_CURRENCIES.contains(&normalized.as_str()) {
        Some(CurrencyClass::Fiat)
    } else if CRYPTO_CURRENCIES.contains(&normalized.as_str()) {
        Some(CurrencyClass::Crypto)
    } else {
        None
    }
}

pub fn is_supported(code: &str) -> bool {
    classify(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn classifies_fiat_currencies() {
        assert_eq!(classify("USD"), Some(CurrencyClass::Fiat));
        assert_eq!(classify("UZS"), Some(CurrencyClass::Fiat));
        assert_eq!(classify("CHF"), Some(CurrencyClass::Fiat));
    }

    #[test]
    fn classifies_crypto_currencies() {
        assert_eq!(classify("BTC"), Some(CurrencyClass::Crypto));
        assert_eq!(classify("USDT"), Some(CurrencyClass::Crypto));
        assert_eq!(classify("ETH"), Some(CurrencyClass::Crypto));
    }

    #[test]
    fn normalizes_before_classifying() {
        assert_eq!(classify("  usd "), Some(CurrencyClass::Fiat));
        assert_eq!(classify("btc"), Some(CurrencyClass::Crypto));
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(classify("DOGE"), None);
        assert_eq!(classify(""), None);
        assert!(!is_supported("XYZ"));
    }

    #[test]
    fn fee_rates_match_currency_class() {
        let half_percent = BigDecimal::from_str("0.005").expect("valid decimal");
        let one_percent = BigDecimal::from_str("0.01").expect("valid decimal");

        assert_eq!(CurrencyClass::Fiat.fee_rate(), half_percent);
        assert_eq!(CurrencyClass::Crypto.fee_rate(), one_percent);
    }
}
