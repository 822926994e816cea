//! # Reservoir Staking Library - Time-Based Reward Accrual
//!
//! ## Purpose
//!
//! Staking ledger distributing `reward_rate` units per second across stakers
//! in proportion to their share of the total stake. Per-account accounting is
//! O(1) through a lazily updated reward-per-token accumulator: each mutating
//! call first rolls the global accumulator forward, settles the caller's
//! pending reward against its last-seen snapshot, and only then applies the
//! requested mutation. That ordering is load-bearing and must not change.
//!
//! ## Integration Points
//!
//! - **Input Sources**: stake/withdraw/claim/compound requests from callers,
//!   the operator's reward-rate updates
//! - **Output Destinations**: token movements through the [`types::TokenLedger`]
//!   collaborator, committed-transition events for the indexer
//! - **Precision**: the accumulator is u128 scaled by 1e18 so per-token
//!   deltas survive integer division

pub mod ledger;

pub use ledger::{StakingError, StakingLedger, REWARD_PRECISION};
