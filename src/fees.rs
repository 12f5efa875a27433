//! Fee computation for transfers.
//!
//! All arithmetic is fixed-point `BigDecimal`. The fee is rounded to 8
//! fractional digits; the net is the exact remainder, so fee + net always
//! equals the gross amount at stored precision.

use bigdecimal::rounding::RoundingMode;
use bigdecimal::BigDecimal;

use crate::currency::CurrencyClass;
use crate::error::AppError;

/// Fractional digits carried by every monetary column.
pub const MONEY_SCALE: i64 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct FeeBreakdown {
    pub fee: BigDecimal,
    pub net: BigDecimal,
}

/// Splits a gross amount into platform fee and net.
/// Fails with `InvalidAmount` when the fee would consume the whole transfer,
/// which rejects amounts below the ledger's precision.
pub fn compute_fee(gross: &BigDecimal, class: CurrencyClass) -> Result<FeeBreakdown, AppError> {
    let fee = (gross * class.fee_rate()).with_scale_round(MONEY_SCALE, RoundingMode::HalfUp);
    // For inputs within the ledger's precision the subtraction is exact and
    // this rounding is a no-op; it only bites for sub-precision amounts,
    // which must not survive as a positive net.
    let net = (gross - &fee).with_scale_round(MONEY_SCALE, RoundingMode::HalfUp);

    if net <= BigDecimal::from(0) {
        return Err(AppError::InvalidAmount);
    }

    Ok(FeeBreakdown { fee, net })
}
