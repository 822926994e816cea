//! Token collaborator seam.
//!
//! The engines never custody tokens themselves; they call out to an
//! ERC-20-style ledger keyed by [`TokenId`]. The trait mirrors the ERC-20
//! surface (`transfer`, `transferFrom`, `approve`, `allowance`, `balanceOf`)
//! with failures mapped to typed errors instead of boolean returns.
//!
//! [`InMemoryBank`] is the reference implementation used by tests and local
//! runs.

use crate::identifiers::{AccountId, TokenId};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("insufficient balance of {token} for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        token: TokenId,
        account: AccountId,
        needed: u64,
        available: u64,
    },

    #[error(
        "insufficient allowance of {token} from {owner} to {spender}: need {needed}, have {available}"
    )]
    InsufficientAllowance {
        token: TokenId,
        owner: AccountId,
        spender: AccountId,
        needed: u64,
        available: u64,
    },

    #[error("balance of {token} for {account} would overflow")]
    BalanceOverflow { token: TokenId, account: AccountId },
}

/// ERC-20-style external ledger the engines move funds through.
pub trait TokenLedger {
    fn balance_of(&self, token: TokenId, account: AccountId) -> u64;

    fn allowance(&self, token: TokenId, owner: AccountId, spender: AccountId) -> u64;

    /// Set `spender`'s allowance over `owner`'s balance of `token`.
    fn approve(&mut self, token: TokenId, owner: AccountId, spender: AccountId, amount: u64);

    /// Move `amount` of `token` directly from `from` to `to`.
    fn transfer(
        &mut self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), TokenError>;

    /// Move `amount` of `token` from `from` to `to` on behalf of `spender`,
    /// consuming allowance.
    fn transfer_from(
        &mut self,
        token: TokenId,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), TokenError>;
}

/// In-memory token ledger with mint support, for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBank {
    balances: HashMap<(TokenId, AccountId), u64>,
    allowances: HashMap<(TokenId, AccountId, AccountId), u64>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `account` out of thin air.
    pub fn mint(&mut self, token: TokenId, account: AccountId, amount: u64) {
        let balance = self.balances.entry((token, account)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    fn debit(
        &mut self,
        token: TokenId,
        account: AccountId,
        amount: u64,
    ) -> Result<(), TokenError> {
        let balance = self.balances.entry((token, account)).or_insert(0);
        if *balance < amount {
            return Err(TokenError::InsufficientBalance {
                token,
                account,
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn credit(
        &mut self,
        token: TokenId,
        account: AccountId,
        amount: u64,
    ) -> Result<(), TokenError> {
        let balance = self.balances.entry((token, account)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow { token, account })?;
        Ok(())
    }
}

impl TokenLedger for InMemoryBank {
    fn balance_of(&self, token: TokenId, account: AccountId) -> u64 {
        self.balances.get(&(token, account)).copied().unwrap_or(0)
    }

    fn allowance(&self, token: TokenId, owner: AccountId, spender: AccountId) -> u64 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, token: TokenId, owner: AccountId, spender: AccountId, amount: u64) {
        self.allowances.insert((token, owner, spender), amount);
    }

    fn transfer(
        &mut self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), TokenError> {
        // Debit first so an overflowing credit cannot strand a half-applied move.
        self.debit(token, from, amount)?;
        if let Err(err) = self.credit(token, to, amount) {
            // Roll the debit back; entry is known to exist.
            if let Some(balance) = self.balances.get_mut(&(token, from)) {
                *balance += amount;
            }
            return Err(err);
        }
        Ok(())
    }

    fn transfer_from(
        &mut self,
        token: TokenId,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(token, from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                token,
                owner: from,
                spender,
                needed: amount,
                available: allowed,
            });
        }
        self.transfer(token, from, to, amount)?;
        self.allowances.insert((token, from, spender), allowed - amount);
        Ok(())
    }
}
