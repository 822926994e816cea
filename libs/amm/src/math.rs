//! Overflow-checked integer arithmetic primitives.
//!
//! All pool and staking math funnels through these helpers: products are
//! widened to u128 before dividing, every narrowing is checked, and the
//! rounding direction is chosen by the caller per operation so truncation
//! always favors the pool or ledger over the counterparty.

use thiserror::Error;

/// Basis-point denominator for fee math (30 = 0.30%).
pub const FEE_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivideByZero,

    #[error("fee of {0} bps exceeds the {FEE_DENOMINATOR} bps denominator")]
    FeeOutOfRange(u16),
}

/// `a * b / d` with a u128-widened product, truncating toward zero.
pub fn mul_div_floor(a: u64, b: u64, d: u64) -> Result<u64, MathError> {
    if d == 0 {
        return Err(MathError::DivideByZero);
    }
    let wide = (a as u128) * (b as u128) / (d as u128);
    u64::try_from(wide).map_err(|_| MathError::Overflow)
}

/// `a * b / d` with a u128-widened product, rounding away from zero.
pub fn mul_div_ceil(a: u64, b: u64, d: u64) -> Result<u64, MathError> {
    if d == 0 {
        return Err(MathError::DivideByZero);
    }
    let product = (a as u128) * (b as u128);
    let wide = product.div_ceil(d as u128);
    u64::try_from(wide).map_err(|_| MathError::Overflow)
}

/// `a * b / d` over u128 operands with checked intermediates, truncating.
///
/// Used by the 1e18-scaled reward accumulator, where operands already carry
/// the precision factor.
pub fn mul_div_u128(a: u128, b: u128, d: u128) -> Result<u128, MathError> {
    if d == 0 {
        return Err(MathError::DivideByZero);
    }
    a.checked_mul(b).map(|p| p / d).ok_or(MathError::Overflow)
}

/// Deduct `fee_bps` basis points from `amount`, truncating toward zero so the
/// retained fee rounds in the pool's favor.
pub fn apply_fee(amount: u64, fee_bps: u16) -> Result<u64, MathError> {
    let fee_bps = fee_bps as u64;
    if fee_bps >= FEE_DENOMINATOR {
        return Err(MathError::FeeOutOfRange(fee_bps as u16));
    }
    mul_div_floor(amount, FEE_DENOMINATOR - fee_bps, FEE_DENOMINATOR)
}

/// Integer square root via the Babylonian method, truncating.
///
/// The root of any u128 fits in u64, so the narrowing cannot fail. Only used
/// for the bootstrap share mint, where the geometric mean of two u64 deposits
/// is taken.
pub fn integer_sqrt(value: u128) -> u64 {
    if value <= 1 {
        return value as u64;
    }
    let mut x0 = value / 2;
    let mut x1 = (x0 + value / x0) / 2;
    while x1 < x0 {
        x0 = x1;
        x1 = (x0 + value / x0) / 2;
    }
    x0 as u64
}
