//! Property suites for the invariants that must hold over arbitrary
//! operation sequences, regardless of specific amounts or ordering.

use amm::{Pool, PoolError};
use proptest::prelude::*;
use types::{AccountId, PairId, PoolHandle, TokenId};

const TOKEN_A: TokenId = TokenId::new([0x01; 20]);
const TOKEN_B: TokenId = TokenId::new([0x02; 20]);

#[derive(Debug, Clone)]
enum PoolOp {
    Add { user: u8, amount_a: u64, amount_b: u64 },
    Remove { user: u8, shares: u64 },
    Swap { user: u8, a_in: bool, amount: u64 },
}

fn account(user: u8) -> AccountId {
    AccountId::new([user; 20])
}

prop_compose! {
    fn deposit_amount()(amount in 1u64..1_000_000_000) -> u64 {
        amount
    }
}

fn pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        (0u8..4, deposit_amount(), deposit_amount())
            .prop_map(|(user, amount_a, amount_b)| PoolOp::Add { user, amount_a, amount_b }),
        (0u8..4, any::<u64>()).prop_map(|(user, shares)| PoolOp::Remove { user, shares }),
        (0u8..4, any::<bool>(), deposit_amount())
            .prop_map(|(user, a_in, amount)| PoolOp::Swap { user, a_in, amount }),
    ]
}

/// Drive a pool through `ops`, ignoring rejected operations; rejections must
/// not mutate state, so the invariants are checked after every step.
fn run_ops(pool: &mut Pool, ops: &[PoolOp]) {
    for op in ops {
        let k_before = {
            let (ra, rb) = pool.get_reserves();
            u128::from(ra) * u128::from(rb)
        };
        let swapped = matches!(op, PoolOp::Swap { .. });
        let result = match *op {
            PoolOp::Add { user, amount_a, amount_b } => {
                pool.add_liquidity(account(user), amount_a, amount_b).map(|_| ())
            }
            PoolOp::Remove { user, shares } => {
                // Bound the request to something the user might hold.
                let held = pool.shares_of(account(user));
                let request = if held == 0 { shares } else { shares % (held * 2) };
                match request {
                    0 => Ok(()),
                    r => pool.remove_liquidity(account(user), r).map(|_| ()),
                }
            }
            PoolOp::Swap { user, a_in, amount } => {
                let token = if a_in { TOKEN_A } else { TOKEN_B };
                pool.swap(account(user), token, amount, 0).map(|_| ())
            }
        };

        match result {
            Ok(()) => {
                if swapped {
                    let (ra, rb) = pool.get_reserves();
                    assert!(u128::from(ra) * u128::from(rb) >= k_before);
                }
            }
            Err(
                PoolError::InvalidAmount
                | PoolError::InsufficientShares { .. }
                | PoolError::NoLiquidity
                | PoolError::SlippageExceeded { .. }
                | PoolError::Math(_),
            ) => {}
            Err(other) => panic!("unexpected pool error: {other}"),
        }

        // Conservation and the zero-coupling of reserves hold after every op.
        let held: u64 = (0u8..4).map(|u| pool.shares_of(account(u))).sum();
        assert_eq!(held, pool.total_shares());
        let (ra, rb) = pool.get_reserves();
        assert_eq!(ra == 0, rb == 0);
        assert_eq!(pool.total_shares() == 0, ra == 0);
    }
}

proptest! {
    #[test]
    fn invariants_hold_over_arbitrary_operation_sequences(
        ops in proptest::collection::vec(pool_op(), 1..40)
    ) {
        let mut pool = Pool::new(PoolHandle(0), PairId::new(TOKEN_A, TOKEN_B), 30);
        run_ops(&mut pool, &ops);
    }

    #[test]
    fn swaps_never_shrink_the_reserve_product(
        reserve_a in 1_000u64..1_000_000_000,
        reserve_b in 1_000u64..1_000_000_000,
        amount_in in 1u64..10_000_000,
        a_in in any::<bool>(),
    ) {
        let mut pool = Pool::new(PoolHandle(0), PairId::new(TOKEN_A, TOKEN_B), 30);
        pool.add_liquidity(account(0), reserve_a, reserve_b).unwrap();

        let (ra, rb) = pool.get_reserves();
        let k_before = u128::from(ra) * u128::from(rb);
        let token = if a_in { TOKEN_A } else { TOKEN_B };
        if pool.swap(account(1), token, amount_in, 0).is_ok() {
            let (ra, rb) = pool.get_reserves();
            prop_assert!(u128::from(ra) * u128::from(rb) >= k_before);
        }
    }

    #[test]
    fn immediate_round_trip_never_profits(
        reserve_a in 1_000u64..100_000_000,
        reserve_b in 1_000u64..100_000_000,
        deposit_a in 1u64..1_000_000,
        deposit_b in 1u64..1_000_000,
    ) {
        let mut pool = Pool::new(PoolHandle(0), PairId::new(TOKEN_A, TOKEN_B), 30);
        pool.add_liquidity(account(0), reserve_a, reserve_b).unwrap();

        let depositor = account(1);
        if pool.add_liquidity(depositor, deposit_a, deposit_b).is_ok() {
            let shares = pool.shares_of(depositor);
            let event = pool.remove_liquidity(depositor, shares).unwrap();
            match event {
                types::Event::LiquidityRemoved { amount_a, amount_b, .. } => {
                    prop_assert!(amount_a <= deposit_a);
                    prop_assert!(amount_b <= deposit_b);
                }
                other => prop_assert!(false, "unexpected event {other:?}"),
            }
        }
    }
}
