//! Shared fixtures for the cross-engine test suites.
//!
//! One funded world per test: a token bank, a manual clock, a router and a
//! staking ledger all wired to the same collaborators, so each case starts
//! from an identical deployment.

use router::{DexRouter, ProtocolConfig};
use staking::StakingLedger;
use types::{AccountId, Clock, InMemoryBank, ManualClock, TokenId, TokenLedger};

pub const TOKEN_A: TokenId = TokenId::new([0x01; 20]);
pub const TOKEN_B: TokenId = TokenId::new([0x02; 20]);
pub const TOKEN_C: TokenId = TokenId::new([0x03; 20]);

pub const ROUTER_ID: AccountId = AccountId::new([0xdd; 20]);
pub const STAKING_VAULT: AccountId = AccountId::new([0xee; 20]);
pub const OPERATOR: AccountId = AccountId::new([0x0f; 20]);
pub const ALICE: AccountId = AccountId::new([0xa1; 20]);
pub const BOB: AccountId = AccountId::new([0xb0; 20]);
pub const CAROL: AccountId = AccountId::new([0xc0; 20]);

pub const USER_FUNDS: u64 = 1_000_000;
pub const FAR_DEADLINE: u64 = u64::MAX;

pub struct World {
    pub bank: InMemoryBank,
    pub clock: ManualClock,
    pub router: DexRouter<ManualClock>,
    /// Same-asset deployment: TOKEN_A is both staked and paid as reward.
    pub staking: StakingLedger<ManualClock>,
}

impl World {
    /// Fresh world at t=1_000_000 with every user funded and approved for
    /// the router and the staking vault, at reward rate 1/sec.
    pub fn new() -> Self {
        let clock = ManualClock::new(1_000_000);
        // Rate 1/sec keeps accrual arithmetic readable in the assertions.
        let config = ProtocolConfig {
            default_reward_rate: 1,
            ..ProtocolConfig::default()
        };
        let staking = StakingLedger::new(
            TOKEN_A,
            TOKEN_A,
            STAKING_VAULT,
            OPERATOR,
            config.default_reward_rate,
            clock.clone(),
        );
        let router = DexRouter::new(ROUTER_ID, config, clock.clone());
        let mut bank = InMemoryBank::new();
        for user in [ALICE, BOB, CAROL] {
            for token in [TOKEN_A, TOKEN_B, TOKEN_C] {
                bank.mint(token, user, USER_FUNDS);
                bank.approve(token, user, ROUTER_ID, USER_FUNDS);
                bank.approve(token, user, STAKING_VAULT, USER_FUNDS);
            }
        }
        Self {
            bank,
            clock,
            router,
            staking,
        }
    }

    pub fn deadline_in(&self, secs: u64) -> u64 {
        self.clock.now() + secs
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
