//! Kani formal verification harnesses for stablecoin-prog.
//!
//! Run with: `cargo kani --tests`
//!
//! These harnesses prove engine-level solvency properties over bounded
//! symbolic inputs:
//! - minting never leaves a position below the minimum health factor
//! - redemption never leaves a position below the minimum health factor
//! - liquidation never seizes more than the locked collateral
//! - liquidation retires exactly the repaid debt
//! - config updates never touch the immutable parameters
//!
//! Note: token movements and the oracle are NOT modeled.

#![cfg(kani)]

extern crate kani;

use stablecoin_prog::engine::{self, ConfigUpdate, Position, RiskError, RiskParams};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Valid parameters with small symbolic ranges to keep proofs tractable.
fn any_params() -> RiskParams {
    let params = RiskParams {
        liquidation_threshold: kani::any(),
        liquidation_bonus: kani::any(),
        min_health_factor: kani::any(),
        precision_scale: kani::any(),
        max_ltv: kani::any(),
        collateral_unit: kani::any(),
    };
    kani::assume(params.liquidation_threshold > 0 && params.liquidation_threshold <= 100);
    kani::assume(params.liquidation_bonus <= 50);
    kani::assume(params.min_health_factor > 0 && params.min_health_factor <= 1_000);
    kani::assume(params.precision_scale > 0 && params.precision_scale <= 1_000);
    kani::assume(params.max_ltv <= 100);
    kani::assume(params.collateral_unit > 0 && params.collateral_unit <= 1_000);
    params
}

fn any_position() -> Position {
    let position = Position {
        collateral_amount: kani::any(),
        debt_amount: kani::any(),
    };
    kani::assume(position.collateral_amount <= 1_000_000);
    kani::assume(position.debt_amount <= 1_000_000);
    position
}

fn any_price() -> u64 {
    let price: u64 = kani::any();
    kani::assume(price > 0 && price <= 1_000_000);
    price
}

// =============================================================================
// A. MINT / REDEEM SOLVENCY
// =============================================================================

/// Prove: a successful deposit never yields a position below the minimum
#[kani::proof]
fn kani_deposit_keeps_minimum_health() {
    let params = any_params();
    let position = any_position();
    let price = any_price();
    let amount: u64 = kani::any();
    kani::assume(amount <= 1_000_000);

    if let Ok(out) = engine::deposit_and_mint(&params, &position, amount, price) {
        assert!(out.position.debt_amount == 0 || out.health_factor >= params.min_health_factor as u128);
        assert!(out.position.debt_amount >= position.debt_amount, "deposit never retires debt");
        assert_eq!(out.position.collateral_amount, position.collateral_amount + amount);
    }
}

/// Prove: a successful burn never yields a position below the minimum
#[kani::proof]
fn kani_burn_keeps_minimum_health() {
    let params = any_params();
    let position = any_position();
    let price = any_price();
    let amount: u64 = kani::any();

    if let Ok(out) = engine::burn_and_redeem(&params, &position, amount, price) {
        assert!(out.position.debt_amount == 0 || out.health_factor >= params.min_health_factor as u128);
        assert!(out.redeemed <= position.collateral_amount);
        assert_eq!(out.position.debt_amount, position.debt_amount - amount);
    }
}

/// Prove: burning more than the debt is always rejected
#[kani::proof]
fn kani_burn_rejects_excess() {
    let params = any_params();
    let position = any_position();
    let price = any_price();
    let amount: u64 = kani::any();
    kani::assume(amount > position.debt_amount);

    let result = engine::burn_and_redeem(&params, &position, amount, price);
    assert_eq!(result, Err(RiskError::InsufficientDebt));
}

// =============================================================================
// B. LIQUIDATION
// =============================================================================

/// Prove: seizure is bounded by collateral and the full repay is retired
#[kani::proof]
fn kani_liquidation_bounded_seizure() {
    let params = any_params();
    let position = any_position();
    let price = any_price();
    let repay: u64 = kani::any();

    if let Ok(out) = engine::liquidate(&params, &position, repay, price) {
        assert!(out.seized <= position.collateral_amount);
        assert_eq!(out.position.debt_amount, position.debt_amount - repay);
        assert_eq!(out.position.collateral_amount, position.collateral_amount - out.seized);
        assert!(out.health_factor_before < params.min_health_factor as u128);
        if out.shortfall {
            assert_eq!(out.seized, position.collateral_amount);
        }
    }
}

/// Prove: a position at or above the minimum cannot be liquidated
#[kani::proof]
fn kani_healthy_position_not_liquidatable() {
    let params = any_params();
    let position = any_position();
    let price = any_price();
    let repay: u64 = kani::any();

    let hf = engine::health_factor(&params, &position, price);
    kani::assume(matches!(hf, Ok(v) if v >= params.min_health_factor as u128));

    let result = engine::liquidate(&params, &position, repay, price);
    assert_eq!(result, Err(RiskError::HealthyPosition));
}

// =============================================================================
// C. CONFIG
// =============================================================================

/// Prove: applying an update either fails or yields valid parameters with
/// the immutable fields preserved
#[kani::proof]
fn kani_config_update_preserves_immutables() {
    let params = any_params();
    let update = ConfigUpdate {
        liquidation_threshold: kani::any(),
        liquidation_bonus: kani::any(),
        min_health_factor: kani::any(),
    };

    if let Ok(next) = params.apply(&update) {
        assert!(next.validate().is_ok());
        assert_eq!(next.precision_scale, params.precision_scale);
        assert_eq!(next.max_ltv, params.max_ltv);
        assert_eq!(next.collateral_unit, params.collateral_unit);
    }
}
