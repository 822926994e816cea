//! # Reservoir Shared Types
//!
//! Unified type system for the Reservoir economic core: identifiers, emitted
//! events, and the external-collaborator traits the engines depend on.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: all financial values are scaled unsigned integers
//! - **Type Safety**: distinct newtypes prevent mixing tokens, accounts and
//!   pool handles
//! - **Explicit Collaborators**: token custody and wall-clock time enter the
//!   engines only through the [`TokenLedger`] and [`Clock`] seams, so every
//!   engine is deterministic under test
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{AccountId, PairId, TokenId};
//!
//! let weth = TokenId::new([0x11; 20]);
//! let usdc = TokenId::new([0x22; 20]);
//!
//! // Pair identity is canonical regardless of argument order
//! assert_eq!(PairId::new(weth, usdc), PairId::new(usdc, weth));
//! ```

pub mod clock;
pub mod events;
pub mod identifiers;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::Event;
pub use identifiers::{AccountId, PairId, PoolHandle, TokenId};
pub use token::{InMemoryBank, TokenError, TokenLedger};
