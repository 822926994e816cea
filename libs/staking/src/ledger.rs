//! The staking ledger engine.
//!
//! Every mutating operation follows the same three-step sequence:
//!
//! 1. roll `reward_per_token_stored` forward to now (guarding the
//!    zero-total-staked window),
//! 2. settle the caller's pending reward from the accumulator delta since its
//!    last snapshot,
//! 3. apply the requested mutation and snapshot the accumulator.
//!
//! Steps are computed into locals and committed only after any external token
//! movement succeeds, so a rejected operation leaves no partial mutation.

use amm::math::{self, MathError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};
use types::{AccountId, Clock, Event, TokenError, TokenId, TokenLedger};

/// Scale factor of the reward-per-token accumulator.
pub const REWARD_PRECISION: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: u64, staked: u64 },

    #[error("caller {caller} is not the operator")]
    Unauthorized { caller: AccountId },

    #[error("compounding requires the reward token to be the staking token")]
    CompoundUnsupported,

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StakingAccount {
    staked: u64,
    reward_per_token_paid: u128,
    rewards_accrued: u64,
}

/// Staking engine: global accumulator state plus per-account records.
///
/// The ledger's own custody account (`vault`) holds staked principal and the
/// reward pot; callers fund the pot by transferring reward tokens to it.
#[derive(Debug)]
pub struct StakingLedger<C: Clock> {
    staking_token: TokenId,
    reward_token: TokenId,
    vault: AccountId,
    operator: AccountId,
    clock: C,

    reward_rate: u64,
    reward_per_token_stored: u128,
    last_update_time: u64,
    total_staked: u64,
    accounts: HashMap<AccountId, StakingAccount>,
}

impl<C: Clock> StakingLedger<C> {
    pub fn new(
        staking_token: TokenId,
        reward_token: TokenId,
        vault: AccountId,
        operator: AccountId,
        reward_rate: u64,
        clock: C,
    ) -> Self {
        let last_update_time = clock.now();
        Self {
            staking_token,
            reward_token,
            vault,
            operator,
            clock,
            reward_rate,
            reward_per_token_stored: 0,
            last_update_time,
            total_staked: 0,
            accounts: HashMap::new(),
        }
    }

    pub fn total_staked(&self) -> u64 {
        self.total_staked
    }

    pub fn staked_of(&self, account: AccountId) -> u64 {
        self.accounts.get(&account).map_or(0, |a| a.staked)
    }

    pub fn reward_rate(&self) -> u64 {
        self.reward_rate
    }

    pub fn vault(&self) -> AccountId {
        self.vault
    }

    /// Current accumulator value, including unsettled time.
    pub fn reward_per_token(&self) -> Result<u128, StakingError> {
        Ok(self.reward_per_token_at(self.clock.now())?)
    }

    /// Reward owed to `account` right now, settled or not.
    pub fn earned(&self, account: AccountId) -> Result<u64, StakingError> {
        let rpt = self.reward_per_token_at(self.clock.now())?;
        let acct = self.accounts.get(&account).copied().unwrap_or_default();
        Self::settle_account(acct, rpt).map(|a| a.rewards_accrued)
    }

    /// Move `amount` of the staking token from `account` into the vault and
    /// credit it as stake.
    pub fn stake(
        &mut self,
        bank: &mut impl TokenLedger,
        account: AccountId,
        amount: u64,
    ) -> Result<Event, StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount);
        }
        let now = self.clock.now();
        let rpt = self.reward_per_token_at(now)?;
        let mut acct = Self::settle_account(self.account(account), rpt)?;
        acct.staked = acct.staked.checked_add(amount).ok_or(MathError::Overflow)?;
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;

        // The ledger spends the caller's prior approval to itself.
        bank.transfer_from(self.staking_token, self.vault, account, self.vault, amount)?;

        self.commit(now, rpt, account, acct);
        self.total_staked = total_staked;

        info!(%account, amount, total_staked, "stake committed");
        Ok(Event::Staked {
            account,
            amount,
            timestamp: now,
        })
    }

    /// Return `amount` of staked principal from the vault to `account`.
    pub fn withdraw(
        &mut self,
        bank: &mut impl TokenLedger,
        account: AccountId,
        amount: u64,
    ) -> Result<Event, StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidAmount);
        }
        let now = self.clock.now();
        let rpt = self.reward_per_token_at(now)?;
        let mut acct = Self::settle_account(self.account(account), rpt)?;
        if amount > acct.staked {
            return Err(StakingError::InsufficientStake {
                requested: amount,
                staked: acct.staked,
            });
        }
        acct.staked -= amount;

        bank.transfer(self.staking_token, self.vault, account, amount)?;

        self.commit(now, rpt, account, acct);
        self.total_staked -= amount;

        info!(%account, amount, total_staked = self.total_staked, "withdraw committed");
        Ok(Event::Withdrawn {
            account,
            amount,
            timestamp: now,
        })
    }

    /// Pay out `account`'s pending reward. Zero owed is a quiet no-op; the
    /// settle still commits so the snapshot stays current.
    pub fn get_reward(
        &mut self,
        bank: &mut impl TokenLedger,
        account: AccountId,
    ) -> Result<Option<Event>, StakingError> {
        let now = self.clock.now();
        let rpt = self.reward_per_token_at(now)?;
        let mut acct = Self::settle_account(self.account(account), rpt)?;
        let payout = acct.rewards_accrued;
        if payout == 0 {
            self.commit(now, rpt, account, acct);
            return Ok(None);
        }
        acct.rewards_accrued = 0;

        bank.transfer(self.reward_token, self.vault, account, payout)?;

        self.commit(now, rpt, account, acct);

        info!(%account, payout, "reward paid");
        Ok(Some(Event::RewardPaid {
            account,
            amount: payout,
            timestamp: now,
        }))
    }

    /// Re-stake `account`'s pending reward instead of paying it out.
    ///
    /// Only supported when the reward token is the staking token; the reward
    /// pot already sits in the vault, so no external transfer happens; the
    /// settled amount just moves from pending into staked principal.
    pub fn compound_rewards(&mut self, account: AccountId) -> Result<Option<Event>, StakingError> {
        if self.staking_token != self.reward_token {
            return Err(StakingError::CompoundUnsupported);
        }
        let now = self.clock.now();
        let rpt = self.reward_per_token_at(now)?;
        let mut acct = Self::settle_account(self.account(account), rpt)?;
        let reward = acct.rewards_accrued;
        if reward == 0 {
            self.commit(now, rpt, account, acct);
            return Ok(None);
        }
        acct.rewards_accrued = 0;
        acct.staked = acct.staked.checked_add(reward).ok_or(MathError::Overflow)?;
        let total_staked = self
            .total_staked
            .checked_add(reward)
            .ok_or(MathError::Overflow)?;

        self.commit(now, rpt, account, acct);
        self.total_staked = total_staked;

        info!(%account, reward, total_staked, "reward compounded");
        Ok(Some(Event::Staked {
            account,
            amount: reward,
            timestamp: now,
        }))
    }

    /// Operator-only rate change. The accumulator is rolled forward at the
    /// old rate first, so accrual already earned is preserved exactly.
    pub fn set_reward_rate(
        &mut self,
        caller: AccountId,
        new_rate: u64,
    ) -> Result<(), StakingError> {
        if caller != self.operator {
            debug!(%caller, "reward rate change rejected: not operator");
            return Err(StakingError::Unauthorized { caller });
        }
        let now = self.clock.now();
        self.reward_per_token_stored = self.reward_per_token_at(now)?;
        self.last_update_time = now;
        let old_rate = self.reward_rate;
        self.reward_rate = new_rate;
        info!(old_rate, new_rate, "reward rate changed");
        Ok(())
    }

    fn account(&self, account: AccountId) -> StakingAccount {
        self.accounts.get(&account).copied().unwrap_or_default()
    }

    /// Accumulator value at `now`. While `total_staked` is zero no rewards
    /// accrue and the stored value is returned untouched.
    fn reward_per_token_at(&self, now: u64) -> Result<u128, MathError> {
        if self.total_staked == 0 {
            return Ok(self.reward_per_token_stored);
        }
        let elapsed = now.saturating_sub(self.last_update_time);
        let accrued = math::mul_div_u128(
            u128::from(self.reward_rate) * u128::from(elapsed),
            REWARD_PRECISION,
            u128::from(self.total_staked),
        )?;
        self.reward_per_token_stored
            .checked_add(accrued)
            .ok_or(MathError::Overflow)
    }

    /// Fold the accumulator delta since the account's snapshot into its
    /// pending reward and advance the snapshot.
    fn settle_account(mut acct: StakingAccount, rpt: u128) -> Result<StakingAccount, StakingError> {
        // The accumulator is monotone, so the delta is non-negative.
        let delta = math::mul_div_u128(
            u128::from(acct.staked),
            rpt.saturating_sub(acct.reward_per_token_paid),
            REWARD_PRECISION,
        )?;
        let delta = u64::try_from(delta).map_err(|_| MathError::Overflow)?;
        acct.rewards_accrued = acct
            .rewards_accrued
            .checked_add(delta)
            .ok_or(MathError::Overflow)?;
        acct.reward_per_token_paid = rpt;
        Ok(acct)
    }

    fn commit(&mut self, now: u64, rpt: u128, account: AccountId, acct: StakingAccount) {
        self.reward_per_token_stored = rpt;
        self.last_update_time = now;
        if acct == StakingAccount::default() {
            self.accounts.remove(&account);
        } else {
            self.accounts.insert(account, acct);
        }
    }
}
