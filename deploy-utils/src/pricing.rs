//! Sale price computation

use alloy::primitives::U256;

use crate::errors::UtilsError;

/// The number of basis points in one whole
pub const BASIS_POINTS: u64 = 10_000;

/// The fixed-point scale of USD amounts & token rates (18 decimals)
pub const DECIMALS_18: u64 = 1_000_000_000_000_000_000;

/// The price of a `size`x`size` quad, with a premium in basis points on top
pub fn quad_price(size: u64, price_per_land: U256, premium_bps: u64) -> Result<U256, UtilsError> {
    let lands = U256::from(size) * U256::from(size);
    let base = price_per_land
        .checked_mul(lands)
        .ok_or(UtilsError::ArithmeticOverflow("quad price"))?;
    let premium = base
        .checked_mul(U256::from(premium_bps))
        .ok_or(UtilsError::ArithmeticOverflow("quad premium"))?
        / U256::from(BASIS_POINTS);

    base.checked_add(premium).ok_or(UtilsError::ArithmeticOverflow("quad price"))
}

/// Convert a USD amount to a token amount at the given rate, both expressed
/// with 18 decimals; `token_usd_rate` is the USD price of one whole token
pub fn usd_to_token(usd_amount: U256, token_usd_rate: U256) -> Result<U256, UtilsError> {
    if token_usd_rate.is_zero() {
        return Err(UtilsError::ZeroRate);
    }

    let scaled = usd_amount
        .checked_mul(U256::from(DECIMALS_18))
        .ok_or(UtilsError::ArithmeticOverflow("token amount"))?;
    Ok(scaled / token_usd_rate)
}
