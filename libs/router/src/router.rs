//! The router engine.
//!
//! Request pipeline, in order: deadline check, pair canonicalization, pool
//! resolution (creating fresh pairs), caller balance/allowance verification,
//! reentrancy lock, pool-state mutation, token movement. The pool engine's
//! own state is fully committed before any token transfer happens, so a
//! hostile token collaborator re-invoking the router can never observe
//! half-updated reserves, and the lock rejects the re-entry outright.

use crate::config::ProtocolConfig;
use crate::price_feed::{PriceFeed, PriceSample};
use amm::math::MathError;
use amm::{Pool, PoolError, PoolRegistry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};
use types::{AccountId, Clock, Event, PairId, TokenError, TokenId, TokenLedger};

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("transaction expired: deadline {deadline}, now {now}")]
    Expired { deadline: u64, now: u64 },

    #[error("reentrant call rejected")]
    ReentrantCall,

    #[error("a pool requires two distinct tokens")]
    IdenticalTokens,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("pool for {pair} already holds liquidity")]
    PoolNotEmpty { pair: PairId },

    #[error("no price feed registered for {token}")]
    NoPriceFeed { token: TokenId },

    #[error("price feed for {token} returned non-positive value {value}")]
    InvalidPrice { token: TokenId, value: i64 },

    #[error("price feed for {token} is stale: sample is {age_secs}s old")]
    StalePrice { token: TokenId, age_secs: u64 },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Caller-facing façade over the pool registry.
///
/// Holds no economic state of its own: pools live in the registry, funds live
/// with the token collaborator under per-pool custody accounts, and the only
/// router-local state is the price-feed table and the reentrancy flag.
pub struct DexRouter<C: Clock> {
    /// The router's own account: callers approve it, it spends on their behalf.
    id: AccountId,
    registry: PoolRegistry,
    feeds: HashMap<TokenId, Box<dyn PriceFeed>>,
    config: ProtocolConfig,
    clock: C,
    entered: bool,
}

impl<C: Clock> DexRouter<C> {
    pub fn new(id: AccountId, config: ProtocolConfig, clock: C) -> Self {
        let registry = PoolRegistry::new(config.swap_fee_bps);
        Self {
            id,
            registry,
            feeds: HashMap::new(),
            config,
            clock,
            entered: false,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// The resolved pool for a token pair, if it exists.
    pub fn pool(&self, token_x: TokenId, token_y: TokenId) -> Option<&Pool> {
        let pair = PairId::new_checked(token_x, token_y)?;
        self.registry.pool(self.registry.lookup(pair)?)
    }

    /// Read-only swap preview through the resolved pool.
    pub fn quote(
        &self,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: u64,
    ) -> Result<u64, RouterError> {
        let pool = self
            .pool(token_in, token_out)
            .ok_or(PoolError::NoLiquidity)?;
        Ok(pool.quote(token_in, amount_in)?)
    }

    /// Deposit `amount_x` of `token_x` and `amount_y` of `token_y` into the
    /// pair's pool, creating the pool for a fresh pair.
    pub fn add_liquidity(
        &mut self,
        bank: &mut impl TokenLedger,
        caller: AccountId,
        token_x: TokenId,
        token_y: TokenId,
        amount_x: u64,
        amount_y: u64,
        deadline: u64,
    ) -> Result<Event, RouterError> {
        self.check_deadline(deadline)?;
        self.with_lock(|router| {
            let pair = PairId::new_checked(token_x, token_y)
                .ok_or(RouterError::IdenticalTokens)?;
            if amount_x == 0 || amount_y == 0 {
                return Err(RouterError::InvalidAmount);
            }
            router.ensure_caller_funds(bank, token_x, caller, amount_x)?;
            router.ensure_caller_funds(bank, token_y, caller, amount_y)?;

            let handle = router.registry.get_or_create(pair);
            let custody = PoolRegistry::custody_account(handle);
            let (amount_a, amount_b) = if token_x == pair.token_a() {
                (amount_x, amount_y)
            } else {
                (amount_y, amount_x)
            };

            let pool = router.registry.pool_mut(handle).ok_or(PoolError::NoLiquidity)?;
            let event = pool.add_liquidity(caller, amount_a, amount_b)?;

            bank.transfer_from(token_x, router.id, caller, custody, amount_x)?;
            bank.transfer_from(token_y, router.id, caller, custody, amount_y)?;

            info!(pool = %handle, %caller, amount_x, amount_y, "liquidity routed in");
            Ok(event)
        })
    }

    /// Burn `shares` of the caller's claim on the pair's pool and return the
    /// proportional reserves.
    pub fn remove_liquidity(
        &mut self,
        bank: &mut impl TokenLedger,
        caller: AccountId,
        token_x: TokenId,
        token_y: TokenId,
        shares: u64,
        deadline: u64,
    ) -> Result<Event, RouterError> {
        self.check_deadline(deadline)?;
        self.with_lock(|router| {
            let pair = PairId::new_checked(token_x, token_y)
                .ok_or(RouterError::IdenticalTokens)?;
            // A pair nobody has deposited into has no pool to burn against;
            // rejecting must not register one.
            let handle = router.registry.lookup(pair).ok_or(PoolError::NoLiquidity)?;
            let custody = PoolRegistry::custody_account(handle);

            let pool = router.registry.pool_mut(handle).ok_or(PoolError::NoLiquidity)?;
            let event = pool.remove_liquidity(caller, shares)?;
            let (amount_a, amount_b) = match event {
                Event::LiquidityRemoved {
                    amount_a, amount_b, ..
                } => (amount_a, amount_b),
                // remove_liquidity only ever reports LiquidityRemoved.
                _ => unreachable!("pool returned a foreign event"),
            };

            bank.transfer(pair.token_a(), custody, caller, amount_a)?;
            bank.transfer(pair.token_b(), custody, caller, amount_b)?;

            info!(pool = %handle, %caller, amount_a, amount_b, "liquidity routed out");
            Ok(event)
        })
    }

    /// Swap an exact `amount_in` of `token_in` for at least `min_amount_out`
    /// of `token_out`.
    pub fn swap_exact_input_single(
        &mut self,
        bank: &mut impl TokenLedger,
        caller: AccountId,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: u64,
        min_amount_out: u64,
        deadline: u64,
    ) -> Result<Event, RouterError> {
        self.check_deadline(deadline)?;
        self.with_lock(|router| {
            let pair = PairId::new_checked(token_in, token_out)
                .ok_or(RouterError::IdenticalTokens)?;
            if amount_in == 0 {
                return Err(RouterError::InvalidAmount);
            }
            router.ensure_caller_funds(bank, token_in, caller, amount_in)?;

            let handle = router.registry.lookup(pair).ok_or(PoolError::NoLiquidity)?;
            let custody = PoolRegistry::custody_account(handle);

            let pool = router.registry.pool_mut(handle).ok_or(PoolError::NoLiquidity)?;
            let event = pool.swap(caller, token_in, amount_in, min_amount_out)?;
            let amount_out = match event {
                Event::SwapExecuted { amount_out, .. } => amount_out,
                _ => unreachable!("pool returned a foreign event"),
            };

            bank.transfer_from(token_in, router.id, caller, custody, amount_in)?;
            bank.transfer(token_out, custody, caller, amount_out)?;

            info!(pool = %handle, %caller, amount_in, amount_out, "swap routed");
            Ok(event)
        })
    }

    /// Register (or replace) the price feed for `token`.
    pub fn set_price_feed(&mut self, token: TokenId, feed: Box<dyn PriceFeed>) {
        debug!(%token, "price feed registered");
        self.feeds.insert(token, feed);
    }

    /// Latest validated sample for `token`.
    pub fn get_latest_price(&self, token: TokenId) -> Result<PriceSample, RouterError> {
        let feed = self
            .feeds
            .get(&token)
            .ok_or(RouterError::NoPriceFeed { token })?;
        let sample = feed.latest_price();
        if sample.value <= 0 {
            return Err(RouterError::InvalidPrice {
                token,
                value: sample.value,
            });
        }
        let age_secs = self.clock.now().saturating_sub(sample.updated_at);
        if age_secs > self.config.max_price_age_secs {
            return Err(RouterError::StalePrice { token, age_secs });
        }
        Ok(sample)
    }

    /// Seed an empty pool at the ratio implied by the two tokens' oracle
    /// prices: a bootstrap hint only, never a swap-pricing input. The paired
    /// amount is `amount_x * price_x / price_y`, truncated.
    pub fn initialize_pool_with_oracle(
        &mut self,
        bank: &mut impl TokenLedger,
        caller: AccountId,
        token_x: TokenId,
        token_y: TokenId,
        amount_x: u64,
        deadline: u64,
    ) -> Result<Event, RouterError> {
        self.check_deadline(deadline)?;
        let pair = PairId::new_checked(token_x, token_y)
            .ok_or(RouterError::IdenticalTokens)?;
        if let Some(pool) = self.registry.lookup(pair).and_then(|h| self.registry.pool(h)) {
            if !pool.is_empty() {
                return Err(RouterError::PoolNotEmpty { pair });
            }
        }
        let price_x = self.get_latest_price(token_x)?;
        let price_y = self.get_latest_price(token_y)?;

        let paired = Decimal::from(amount_x)
            .checked_mul(Decimal::from(price_x.value))
            .and_then(|value| value.checked_div(Decimal::from(price_y.value)))
            .ok_or(MathError::Overflow)?;
        let amount_y = paired.trunc().to_u64().ok_or(MathError::Overflow)?;
        if amount_y == 0 {
            return Err(RouterError::InvalidAmount);
        }

        info!(%pair, amount_x, amount_y, "seeding pool from oracle ratio");
        self.add_liquidity(bank, caller, token_x, token_y, amount_x, amount_y, deadline)
    }

    fn check_deadline(&self, deadline: u64) -> Result<(), RouterError> {
        let now = self.clock.now();
        if now > deadline {
            debug!(deadline, now, "request rejected: deadline passed");
            return Err(RouterError::Expired { deadline, now });
        }
        Ok(())
    }

    /// Verify the caller can actually fund the operation before any state
    /// moves, so the later transfers cannot fail halfway.
    fn ensure_caller_funds(
        &self,
        bank: &impl TokenLedger,
        token: TokenId,
        caller: AccountId,
        amount: u64,
    ) -> Result<(), RouterError> {
        let available = bank.balance_of(token, caller);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                token,
                account: caller,
                needed: amount,
                available,
            }
            .into());
        }
        let allowed = bank.allowance(token, caller, self.id);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                token,
                owner: caller,
                spender: self.id,
                needed: amount,
                available: allowed,
            }
            .into());
        }
        Ok(())
    }

    /// Explicit reentrancy lock: taken at operation entry, released on every
    /// exit path.
    fn with_lock<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, RouterError>,
    ) -> Result<R, RouterError> {
        if self.entered {
            return Err(RouterError::ReentrantCall);
        }
        self.entered = true;
        let result = f(self);
        self.entered = false;
        result
    }
}
