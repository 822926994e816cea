//! # Reservoir AMM Library - Constant-Product Pool Engine
//!
//! ## Purpose
//!
//! Integer-exact mathematics and state management for constant-product
//! (x*y=k) liquidity pools: swap pricing with fee-favoring rounding,
//! LP-share accounting with a conservative mint rule, and a registry that
//! resolves canonical token pairs to stable pool handles.
//!
//! ## Integration Points
//!
//! - **Input Sources**: deposit/withdraw/swap requests forwarded by the router
//! - **Output Destinations**: committed-transition events for the indexer,
//!   token-movement amounts for the custody layer
//! - **Precision**: u64 atomic amounts, u128 intermediates, zero floating point
//!
//! ## Architecture Role
//!
//! The pool engine owns reserves and share balances and nothing else; token
//! custody and caller preconditions live with the router. Every operation
//! either fully commits or returns a typed error with no state change, and
//! rounding always favors the pool so the product of reserves never decreases
//! across a swap.

pub mod math;
pub mod pool;
pub mod registry;

pub use math::{FEE_DENOMINATOR, MathError};
pub use pool::{Pool, PoolError};
pub use registry::PoolRegistry;
