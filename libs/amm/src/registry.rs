//! Pool arena keyed by canonical pair identity.
//!
//! The registry is the factory of the system: the first request for a fresh
//! pair creates its pool and every later request resolves to the same stable
//! [`PoolHandle`]. Handles index into an append-only arena, so they are never
//! invalidated; a drained pool stays registered and is reused on the next
//! bootstrap deposit.

use crate::pool::Pool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use types::{AccountId, PairId, PoolHandle};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
    by_pair: HashMap<PairId, PoolHandle>,
    fee_bps: u16,
}

impl PoolRegistry {
    /// Registry whose pools all charge `fee_bps` on swap input.
    pub fn new(fee_bps: u16) -> Self {
        Self {
            pools: Vec::new(),
            by_pair: HashMap::new(),
            fee_bps,
        }
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Resolve `pair`, creating its pool on first sight.
    pub fn get_or_create(&mut self, pair: PairId) -> PoolHandle {
        if let Some(handle) = self.by_pair.get(&pair) {
            return *handle;
        }
        let handle = PoolHandle(self.pools.len() as u32);
        self.pools.push(Pool::new(handle, pair, self.fee_bps));
        self.by_pair.insert(pair, handle);
        info!(pool = %handle, %pair, fee_bps = self.fee_bps, "pool created");
        handle
    }

    pub fn lookup(&self, pair: PairId) -> Option<PoolHandle> {
        self.by_pair.get(&pair).copied()
    }

    pub fn pool(&self, handle: PoolHandle) -> Option<&Pool> {
        self.pools.get(handle.index())
    }

    pub fn pool_mut(&mut self, handle: PoolHandle) -> Option<&mut Pool> {
        self.pools.get_mut(handle.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        self.pools.iter()
    }

    /// Deterministic custody account for a pool's reserves: a fixed tag plus
    /// the handle, so every pool holds funds under its own address.
    pub fn custody_account(handle: PoolHandle) -> AccountId {
        let mut bytes = [0u8; 20];
        bytes[..4].copy_from_slice(b"POOL");
        bytes[16..].copy_from_slice(&handle.0.to_be_bytes());
        AccountId::new(bytes)
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        // 0.30%, the standard pool fee.
        Self::new(30)
    }
}
