//! Identifier newtypes for tokens, accounts and pools.
//!
//! Tokens and accounts are opaque 20-byte addresses. A [`PairId`] is the
//! canonical (ordered) identity of a two-token pool, so `(A, B)` and `(B, A)`
//! resolve to the same pool. A [`PoolHandle`] is a stable arena index handed
//! out by the pool registry; handles are never invalidated because pools are
//! never destroyed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque 20-byte token identifier (an ERC-20-style contract address).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TokenId(pub [u8; 20]);

impl TokenId {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Opaque 20-byte account identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Canonical identity of a token pair: `token_a < token_b` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairId {
    token_a: TokenId,
    token_b: TokenId,
}

impl PairId {
    /// Build the canonical pair for two tokens, whatever order they arrive in.
    ///
    /// Returns `None` when both sides are the same token; a pool against
    /// itself has no meaningful price.
    pub fn new_checked(x: TokenId, y: TokenId) -> Option<Self> {
        if x == y {
            return None;
        }
        let (token_a, token_b) = if x < y { (x, y) } else { (y, x) };
        Some(Self { token_a, token_b })
    }

    /// Canonicalizing constructor for contexts where `x != y` is already
    /// established. Panics in debug builds otherwise.
    pub fn new(x: TokenId, y: TokenId) -> Self {
        debug_assert_ne!(x, y, "pair requires two distinct tokens");
        Self::new_checked(x, y).unwrap_or(Self {
            token_a: x,
            token_b: y,
        })
    }

    pub const fn token_a(&self) -> TokenId {
        self.token_a
    }

    pub const fn token_b(&self) -> TokenId {
        self.token_b
    }

    /// Whether `token` is one of the pair's two sides.
    pub fn contains(&self, token: TokenId) -> bool {
        self.token_a == token || self.token_b == token
    }

    /// The opposite side of `token`, if `token` belongs to the pair.
    pub fn other(&self, token: TokenId) -> Option<TokenId> {
        if token == self.token_a {
            Some(self.token_b)
        } else if token == self.token_b {
            Some(self.token_a)
        } else {
            None
        }
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token_a, self.token_b)
    }
}

/// Stable index of a pool inside the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolHandle(pub u32);

impl PoolHandle {
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}
