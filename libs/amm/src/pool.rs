//! Constant-product liquidity pool with LP-share accounting.
//!
//! The pool owns one token pair's reserves and the proportional claims on
//! them. Invariants maintained across every operation:
//!
//! - `reserve_a * reserve_b` is non-decreasing across swaps (fee-adjusted)
//! - reserves are simultaneously zero or simultaneously non-zero
//! - the sum of all share balances equals `total_shares`
//!
//! The pool never touches token custody; it reports the amounts the caller
//! must move. A pool is created on the first deposit for a fresh pair and is
//! never destroyed; burning every share returns it to the all-zero state,
//! ready for a new bootstrap.

use crate::math::{self, MathError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};
use types::{AccountId, Event, PairId, PoolHandle, TokenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient shares: requested {requested}, available {available}")]
    InsufficientShares { requested: u64, available: u64 },

    #[error("swap output {amount_out} below minimum {min_amount_out}")]
    SlippageExceeded { amount_out: u64, min_amount_out: u64 },

    #[error("pool has no liquidity")]
    NoLiquidity,

    #[error("token {0} does not belong to this pool")]
    UnknownToken(TokenId),

    #[error(transparent)]
    Math(#[from] MathError),
}

/// One token pair's reserves and share ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    handle: PoolHandle,
    pair: PairId,
    fee_bps: u16,
    reserve_a: u64,
    reserve_b: u64,
    total_shares: u64,
    shares: HashMap<AccountId, u64>,
}

impl Pool {
    pub fn new(handle: PoolHandle, pair: PairId, fee_bps: u16) -> Self {
        Self {
            handle,
            pair,
            fee_bps,
            reserve_a: 0,
            reserve_b: 0,
            total_shares: 0,
            shares: HashMap::new(),
        }
    }

    pub fn handle(&self) -> PoolHandle {
        self.handle
    }

    pub fn pair(&self) -> PairId {
        self.pair
    }

    pub fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    /// Reserves in canonical order `(reserve_a, reserve_b)`.
    pub fn get_reserves(&self) -> (u64, u64) {
        (self.reserve_a, self.reserve_b)
    }

    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    pub fn shares_of(&self, account: AccountId) -> u64 {
        self.shares.get(&account).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    /// Spot price of `token_a` denominated in `token_b`, for display and
    /// seeding hints only; swap pricing never reads this.
    pub fn spot_price(&self) -> Option<rust_decimal::Decimal> {
        if self.reserve_a == 0 {
            return None;
        }
        Some(rust_decimal::Decimal::from(self.reserve_b) / rust_decimal::Decimal::from(self.reserve_a))
    }

    /// The matching deposit for `amount` of `token` at the current ratio.
    ///
    /// Fails with [`PoolError::NoLiquidity`] on an empty pool, where the
    /// depositor defines the ratio instead.
    pub fn quote_pair_amount(&self, token: TokenId, amount: u64) -> Result<u64, PoolError> {
        if self.is_empty() {
            return Err(PoolError::NoLiquidity);
        }
        let (reserve_in, reserve_out) = self.oriented_reserves(token)?;
        Ok(math::mul_div_floor(amount, reserve_out, reserve_in)?)
    }

    /// Deposit `amount_a`/`amount_b` (canonical order) for `provider`.
    ///
    /// The bootstrap deposit defines the price ratio and mints
    /// `floor(sqrt(amount_a * amount_b))` shares. Later deposits mint the
    /// smaller of the two proportional entitlements, so a deposit off the
    /// current ratio can only under-credit the depositor, never dilute
    /// existing holders.
    pub fn add_liquidity(
        &mut self,
        provider: AccountId,
        amount_a: u64,
        amount_b: u64,
    ) -> Result<Event, PoolError> {
        if amount_a == 0 || amount_b == 0 {
            return Err(PoolError::InvalidAmount);
        }

        let minted = if self.total_shares == 0 {
            math::integer_sqrt(u128::from(amount_a) * u128::from(amount_b))
        } else {
            let by_a = math::mul_div_floor(self.total_shares, amount_a, self.reserve_a)?;
            let by_b = math::mul_div_floor(self.total_shares, amount_b, self.reserve_b)?;
            by_a.min(by_b)
        };
        if minted == 0 {
            // Deposit too small to represent as a share.
            return Err(PoolError::InvalidAmount);
        }

        let reserve_a = self
            .reserve_a
            .checked_add(amount_a)
            .ok_or(MathError::Overflow)?;
        let reserve_b = self
            .reserve_b
            .checked_add(amount_b)
            .ok_or(MathError::Overflow)?;
        let total_shares = self
            .total_shares
            .checked_add(minted)
            .ok_or(MathError::Overflow)?;
        let provider_shares = self
            .shares_of(provider)
            .checked_add(minted)
            .ok_or(MathError::Overflow)?;

        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        self.total_shares = total_shares;
        self.shares.insert(provider, provider_shares);

        info!(
            pool = %self.handle,
            %provider,
            amount_a,
            amount_b,
            minted,
            total_shares = self.total_shares,
            "liquidity added"
        );

        Ok(Event::LiquidityAdded {
            pool: self.handle,
            provider,
            amount_a,
            amount_b,
            shares_minted: minted,
        })
    }

    /// Burn `shares` of `provider`'s claim, releasing the proportional
    /// reserves. Burning the entire supply zeroes the pool exactly:
    /// `reserve * total / total == reserve` leaves no dust.
    pub fn remove_liquidity(
        &mut self,
        provider: AccountId,
        shares: u64,
    ) -> Result<Event, PoolError> {
        if shares == 0 {
            return Err(PoolError::InvalidAmount);
        }
        let held = self.shares_of(provider);
        if shares > held {
            return Err(PoolError::InsufficientShares {
                requested: shares,
                available: held,
            });
        }

        let amount_a = math::mul_div_floor(self.reserve_a, shares, self.total_shares)?;
        let amount_b = math::mul_div_floor(self.reserve_b, shares, self.total_shares)?;

        self.reserve_a -= amount_a;
        self.reserve_b -= amount_b;
        self.total_shares -= shares;
        if held == shares {
            self.shares.remove(&provider);
        } else {
            self.shares.insert(provider, held - shares);
        }

        info!(
            pool = %self.handle,
            %provider,
            amount_a,
            amount_b,
            burned = shares,
            total_shares = self.total_shares,
            "liquidity removed"
        );

        Ok(Event::LiquidityRemoved {
            pool: self.handle,
            provider,
            amount_a,
            amount_b,
            shares_burned: shares,
        })
    }

    /// Read-only swap preview: the output for `amount_in` of `token_in`.
    pub fn quote(&self, token_in: TokenId, amount_in: u64) -> Result<u64, PoolError> {
        if amount_in == 0 {
            return Err(PoolError::InvalidAmount);
        }
        if self.reserve_a == 0 || self.reserve_b == 0 {
            return Err(PoolError::NoLiquidity);
        }
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in)?;
        Self::output_amount(reserve_in, reserve_out, amount_in, self.fee_bps)
    }

    /// Swap `amount_in` of `token_in` against the pool.
    ///
    /// The fee is charged on the input; the output is derived from x*y=k with
    /// the post-swap opposing reserve rounded up, so the reserve product
    /// never decreases. Rejects with [`PoolError::SlippageExceeded`] when the
    /// output lands below the caller's floor, leaving state untouched.
    pub fn swap(
        &mut self,
        trader: AccountId,
        token_in: TokenId,
        amount_in: u64,
        min_amount_out: u64,
    ) -> Result<Event, PoolError> {
        if amount_in == 0 {
            return Err(PoolError::InvalidAmount);
        }
        if self.reserve_a == 0 || self.reserve_b == 0 {
            return Err(PoolError::NoLiquidity);
        }
        let token_out = self
            .pair
            .other(token_in)
            .ok_or(PoolError::UnknownToken(token_in))?;
        let (reserve_in, reserve_out) = self.oriented_reserves(token_in)?;

        let amount_out = Self::output_amount(reserve_in, reserve_out, amount_in, self.fee_bps)?;
        if amount_out < min_amount_out {
            debug!(
                pool = %self.handle,
                amount_in,
                amount_out,
                min_amount_out,
                "swap rejected: slippage floor"
            );
            return Err(PoolError::SlippageExceeded {
                amount_out,
                min_amount_out,
            });
        }

        let new_reserve_in = reserve_in.checked_add(amount_in).ok_or(MathError::Overflow)?;
        let new_reserve_out = reserve_out - amount_out;
        if token_in == self.pair.token_a() {
            self.reserve_a = new_reserve_in;
            self.reserve_b = new_reserve_out;
        } else {
            self.reserve_a = new_reserve_out;
            self.reserve_b = new_reserve_in;
        }
        debug_assert!(
            u128::from(self.reserve_a) * u128::from(self.reserve_b)
                >= u128::from(reserve_in) * u128::from(reserve_out)
        );

        info!(
            pool = %self.handle,
            %trader,
            %token_in,
            amount_in,
            amount_out,
            reserve_a = self.reserve_a,
            reserve_b = self.reserve_b,
            "swap executed"
        );

        Ok(Event::SwapExecuted {
            pool: self.handle,
            trader,
            token_in,
            token_out,
            amount_in,
            amount_out,
        })
    }

    /// Constant-product output: `reserve_out - ceil(k / (reserve_in + in_after_fee))`.
    ///
    /// Rounding the surviving reserve up (and the fee deduction down) keeps
    /// `reserve_in' * reserve_out' >= reserve_in * reserve_out` even for
    /// repeated one-unit swaps.
    fn output_amount(
        reserve_in: u64,
        reserve_out: u64,
        amount_in: u64,
        fee_bps: u16,
    ) -> Result<u64, PoolError> {
        let amount_in_after_fee = math::apply_fee(amount_in, fee_bps)?;
        let denominator = reserve_in
            .checked_add(amount_in_after_fee)
            .ok_or(MathError::Overflow)?;
        let surviving = math::mul_div_ceil(reserve_in, reserve_out, denominator)?;
        // surviving <= reserve_out because denominator >= reserve_in.
        Ok(reserve_out - surviving)
    }

    /// Reserves oriented as `(reserve_in, reserve_out)` for `token_in`.
    fn oriented_reserves(&self, token_in: TokenId) -> Result<(u64, u64), PoolError> {
        if token_in == self.pair.token_a() {
            Ok((self.reserve_a, self.reserve_b))
        } else if token_in == self.pair.token_b() {
            Ok((self.reserve_b, self.reserve_a))
        } else {
            Err(PoolError::UnknownToken(token_in))
        }
    }
}
