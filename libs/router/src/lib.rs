//! # Reservoir Router Library - Pool Resolution and Request Validation
//!
//! ## Purpose
//!
//! The caller-facing façade over the pool engine. The router itself holds no
//! economic state beyond per-token price-feed registrations: it validates
//! deadlines, resolves token pairs to canonical pools (creating them for
//! fresh pairs), verifies the caller's balance and allowance against the
//! token collaborator, moves funds against pool custody, and passes the pool
//! engine's events through.
//!
//! ## Integration Points
//!
//! - **Input Sources**: deposit/withdraw/swap requests, price-feed handles
//! - **Output Destinations**: the pool engine, the token ledger, events for
//!   the indexer
//! - **Oracle Seam**: registered feeds are a bootstrap hint for seeding an
//!   empty pool's ratio only; swap pricing never consults them

pub mod config;
pub mod price_feed;
pub mod router;

pub use config::{ConfigError, ProtocolConfig};
pub use price_feed::{FixedPriceFeed, PriceFeed, PriceSample};
pub use router::{DexRouter, RouterError};
