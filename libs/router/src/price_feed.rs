//! Price-feed collaborator seam.
//!
//! Feeds follow the Chainlink aggregator convention: a signed value scaled by
//! 1e8 plus the timestamp of its last update. The router rejects non-positive
//! values and samples older than the configured staleness bound; a valid
//! sample is only ever used as a bootstrap hint for seeding an empty pool.

use serde::{Deserialize, Serialize};

/// Decimal places of the reported price value.
pub const PRICE_DECIMALS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Price scaled by 1e8; non-positive values are a feed malfunction.
    pub value: i64,
    /// Unix timestamp of the feed's last update.
    pub updated_at: u64,
}

pub trait PriceFeed {
    fn latest_price(&self) -> PriceSample;
}

/// Feed returning a constant sample, the test double for a live aggregator.
#[derive(Debug, Clone, Copy)]
pub struct FixedPriceFeed {
    pub value: i64,
    pub updated_at: u64,
}

impl FixedPriceFeed {
    pub fn new(value: i64, updated_at: u64) -> Self {
        Self { value, updated_at }
    }
}

impl PriceFeed for FixedPriceFeed {
    fn latest_price(&self) -> PriceSample {
        PriceSample {
            value: self.value,
            updated_at: self.updated_at,
        }
    }
}
