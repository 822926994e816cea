//! End-to-end DEX flows through the router: deposit, withdraw, swap,
//! factory-style pool creation, oracle seeding, and the rejection paths.

use amm::PoolError;
use e2e::*;
use router::{FixedPriceFeed, RouterError};
use types::{Clock, Event, TokenError, TokenLedger};

#[test]
fn deposit_then_full_withdraw_round_trips_funds() {
    let mut w = World::new();
    let deadline = w.deadline_in(60);

    w.router
        .add_liquidity(
            &mut w.bank,
            ALICE,
            TOKEN_A,
            TOKEN_B,
            100_000,
            100_000,
            deadline,
        )
        .unwrap();
    let pool = w.router.pool(TOKEN_A, TOKEN_B).unwrap();
    assert_eq!(pool.get_reserves(), (100_000, 100_000));

    let shares = pool.shares_of(ALICE);
    w.router
        .remove_liquidity(&mut w.bank, ALICE, TOKEN_A, TOKEN_B, shares, deadline)
        .unwrap();

    let pool = w.router.pool(TOKEN_A, TOKEN_B).unwrap();
    assert_eq!(pool.get_reserves(), (0, 0));
    assert_eq!(pool.total_shares(), 0);
    // No fee and no intervening swap: the round trip is exact.
    assert_eq!(w.bank.balance_of(TOKEN_A, ALICE), USER_FUNDS);
    assert_eq!(w.bank.balance_of(TOKEN_B, ALICE), USER_FUNDS);
}

#[test]
fn round_trip_after_a_swap_never_returns_more_than_deposited() {
    let mut w = World::new();
    w.router
        .add_liquidity(
            &mut w.bank,
            ALICE,
            TOKEN_A,
            TOKEN_B,
            100_000,
            100_000,
            FAR_DEADLINE,
        )
        .unwrap();
    w.router
        .swap_exact_input_single(&mut w.bank, BOB, TOKEN_A, TOKEN_B, 10_000, 0, FAR_DEADLINE)
        .unwrap();
    // Bob deposits and immediately exits; the pool cannot pay him more than
    // his entitlement at either reserve.
    let (ra, rb) = w.router.pool(TOKEN_A, TOKEN_B).unwrap().get_reserves();
    let deposit_a = 5_000;
    let deposit_b = amm::math::mul_div_floor(deposit_a, rb, ra).unwrap();
    w.router
        .add_liquidity(
            &mut w.bank,
            BOB,
            TOKEN_A,
            TOKEN_B,
            deposit_a,
            deposit_b,
            FAR_DEADLINE,
        )
        .unwrap();
    let shares = w.router.pool(TOKEN_A, TOKEN_B).unwrap().shares_of(BOB);
    let a_before = w.bank.balance_of(TOKEN_A, BOB);
    let b_before = w.bank.balance_of(TOKEN_B, BOB);

    w.router
        .remove_liquidity(&mut w.bank, BOB, TOKEN_A, TOKEN_B, shares, FAR_DEADLINE)
        .unwrap();

    assert!(w.bank.balance_of(TOKEN_A, BOB) - a_before <= deposit_a);
    assert!(w.bank.balance_of(TOKEN_B, BOB) - b_before <= deposit_b);
}

#[test]
fn swap_updates_reserves_in_both_directions() {
    let mut w = World::new();
    w.router
        .add_liquidity(
            &mut w.bank,
            ALICE,
            TOKEN_A,
            TOKEN_B,
            100_000,
            200_000,
            FAR_DEADLINE,
        )
        .unwrap();
    let (ra_before, rb_before) = w.router.pool(TOKEN_A, TOKEN_B).unwrap().get_reserves();

    let b_before = w.bank.balance_of(TOKEN_B, BOB);
    w.router
        .swap_exact_input_single(&mut w.bank, BOB, TOKEN_A, TOKEN_B, 10_000, 0, FAR_DEADLINE)
        .unwrap();

    let (ra_after, rb_after) = w.router.pool(TOKEN_A, TOKEN_B).unwrap().get_reserves();
    assert!(ra_after > ra_before);
    assert!(rb_after < rb_before);
    assert!(w.bank.balance_of(TOKEN_B, BOB) > b_before);
    // Fee-favoring rounding: the reserve product never decreases.
    assert!(
        u128::from(ra_after) * u128::from(rb_after)
            >= u128::from(ra_before) * u128::from(rb_before)
    );
}

#[test]
fn each_pair_gets_its_own_pool() {
    let mut w = World::new();
    w.router
        .add_liquidity(&mut w.bank, ALICE, TOKEN_A, TOKEN_B, 1_000, 1_000, FAR_DEADLINE)
        .unwrap();
    w.router
        .add_liquidity(&mut w.bank, ALICE, TOKEN_A, TOKEN_C, 2_000, 4_000, FAR_DEADLINE)
        .unwrap();

    assert_eq!(w.router.registry().len(), 2);
    assert_eq!(
        w.router.pool(TOKEN_A, TOKEN_B).unwrap().get_reserves(),
        (1_000, 1_000)
    );
    assert_eq!(
        w.router.pool(TOKEN_C, TOKEN_A).unwrap().get_reserves(),
        (2_000, 4_000)
    );
}

#[test]
fn expired_requests_never_touch_state() {
    let mut w = World::new();
    w.router
        .add_liquidity(&mut w.bank, ALICE, TOKEN_A, TOKEN_B, 1_000, 1_000, FAR_DEADLINE)
        .unwrap();
    let stale = w.clock.now() - 1;

    let err = w
        .router
        .swap_exact_input_single(&mut w.bank, BOB, TOKEN_A, TOKEN_B, 100, 0, stale)
        .unwrap_err();
    assert!(matches!(err, RouterError::Expired { .. }));
    assert_eq!(
        w.router.pool(TOKEN_A, TOKEN_B).unwrap().get_reserves(),
        (1_000, 1_000)
    );
    assert_eq!(w.bank.balance_of(TOKEN_A, BOB), USER_FUNDS);
}

#[test]
fn unapproved_caller_is_rejected_with_allowance_error() {
    let mut w = World::new();
    let outsider = types::AccountId::new([0x77; 20]);
    w.bank.mint(TOKEN_A, outsider, 10_000);
    w.bank.mint(TOKEN_B, outsider, 10_000);

    let err = w
        .router
        .add_liquidity(
            &mut w.bank,
            outsider,
            TOKEN_A,
            TOKEN_B,
            1_000,
            1_000,
            FAR_DEADLINE,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RouterError::Token(TokenError::InsufficientAllowance { .. })
    ));
}

#[test]
fn swap_with_insufficient_liquidity_is_rejected() {
    let mut w = World::new();
    let err = w
        .router
        .swap_exact_input_single(&mut w.bank, BOB, TOKEN_A, TOKEN_B, 100, 0, FAR_DEADLINE)
        .unwrap_err();
    assert!(matches!(err, RouterError::Pool(PoolError::NoLiquidity)));
    // Rejection leaves the registry exactly as it was.
    assert_eq!(w.router.registry().len(), 0);
}

#[test]
fn oracle_seeded_bootstrap_sets_the_feed_ratio() {
    let mut w = World::new();
    let now = w.clock.now();
    // A at $200, B at $400, Chainlink 8-decimal convention.
    w.router
        .set_price_feed(TOKEN_A, Box::new(FixedPriceFeed::new(200_0000_0000, now)));
    w.router
        .set_price_feed(TOKEN_B, Box::new(FixedPriceFeed::new(400_0000_0000, now)));

    let event = w
        .router
        .initialize_pool_with_oracle(&mut w.bank, ALICE, TOKEN_A, TOKEN_B, 10_000, FAR_DEADLINE)
        .unwrap();
    assert!(matches!(
        event,
        Event::LiquidityAdded {
            amount_a: 10_000,
            amount_b: 5_000,
            ..
        }
    ));

    // The seeded ratio only defines the bootstrap; swaps price off reserves.
    let quote = w.router.quote(TOKEN_A, TOKEN_B, 1_000).unwrap();
    assert!(quote < 500);
}

#[test]
fn oracle_seeding_requires_feeds_for_both_tokens() {
    let mut w = World::new();
    let now = w.clock.now();
    w.router
        .set_price_feed(TOKEN_A, Box::new(FixedPriceFeed::new(200_0000_0000, now)));

    let err = w
        .router
        .initialize_pool_with_oracle(&mut w.bank, ALICE, TOKEN_A, TOKEN_B, 10_000, FAR_DEADLINE)
        .unwrap_err();
    assert!(matches!(err, RouterError::NoPriceFeed { token } if token == TOKEN_B));
}
