//! Risk engine for a collateral-backed stablecoin market.
//!
//! Pure integer state transitions over plain structs. The program wrapper
//! owns accounts, token movements and the oracle; every function here takes
//! the already-validated price explicitly and returns the complete post-state
//! without mutating its inputs, so a rejected operation never leaves partial
//! effects behind.
//!
//! Units:
//! - collateral amounts are in the collateral mint's smallest unit
//! - debt amounts are in stablecoin base units
//! - `price_e6` is the value of one whole collateral token in stablecoin
//!   base units (the stablecoin has 6 decimals)
//! - percentages (threshold, bonus, max LTV) are over [`PERCENT_BASE`]
//! - health factors are scaled by `precision_scale`

use std::collections::BTreeMap;
use thiserror::Error;

pub const PERCENT_BASE: u64 = 100;

/// Health factor reported for a position without debt.
pub const HEALTH_FACTOR_MAX: u128 = u128::MAX;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum RiskError {
    #[error("risk parameter out of range")]
    InvalidParameter,
    #[error("amount is zero or overflows")]
    InvalidAmount,
    #[error("price must be non-zero")]
    InvalidPrice,
    #[error("burn amount exceeds outstanding debt")]
    InsufficientDebt,
    #[error("repay amount exceeds outstanding debt")]
    ExcessiveRepay,
    #[error("health factor would fall below the minimum")]
    InsufficientCollateral,
    #[error("position has no collateral left to seize")]
    InsufficientCollateralToSeize,
    #[error("health factor is not below the minimum")]
    HealthyPosition,
    #[error("position not found")]
    PositionNotFound,
}

pub type Result<T> = core::result::Result<T, RiskError>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RiskParams {
    /// Percent of collateral value counted as borrowing capacity, in (0, 100].
    pub liquidation_threshold: u64,
    /// Percent premium paid to liquidators on top of the repaid value.
    pub liquidation_bonus: u64,
    /// Liquidation eligibility threshold, scaled by `precision_scale`.
    pub min_health_factor: u64,
    /// Fixed-point base of the health factor. Immutable after genesis.
    pub precision_scale: u64,
    /// Optional mint cap in percent of collateral value; 0 mints to capacity.
    pub max_ltv: u64,
    /// `10^decimals` of the collateral mint.
    pub collateral_unit: u64,
}

impl RiskParams {
    pub fn validate(&self) -> Result<()> {
        if self.liquidation_threshold == 0 || self.liquidation_threshold > PERCENT_BASE {
            return Err(RiskError::InvalidParameter);
        }
        if self.precision_scale == 0 || self.min_health_factor == 0 || self.collateral_unit == 0 {
            return Err(RiskError::InvalidParameter);
        }
        if self.max_ltv > PERCENT_BASE {
            return Err(RiskError::InvalidParameter);
        }
        Ok(())
    }

    /// Returns the parameters with `update` applied, validated as a whole.
    /// `precision_scale`, `max_ltv` and `collateral_unit` are not updatable.
    pub fn apply(&self, update: &ConfigUpdate) -> Result<RiskParams> {
        let mut next = *self;
        if let Some(threshold) = update.liquidation_threshold {
            next.liquidation_threshold = threshold;
        }
        if let Some(bonus) = update.liquidation_bonus {
            next.liquidation_bonus = bonus;
        }
        if let Some(min_health_factor) = update.min_health_factor {
            next.min_health_factor = min_health_factor;
        }
        next.validate()?;
        Ok(next)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConfigUpdate {
    pub liquidation_threshold: Option<u64>,
    pub liquidation_bonus: Option<u64>,
    pub min_health_factor: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Position {
    pub collateral_amount: u64,
    pub debt_amount: u64,
}

impl Position {
    pub fn is_closed(&self) -> bool {
        self.collateral_amount == 0 && self.debt_amount == 0
    }
}

/// Composite identity of a position: one owner may hold any number of
/// independent positions in a market, told apart by a caller-chosen nonce.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PositionKey {
    pub owner: [u8; 32],
    pub market: [u8; 32],
    pub nonce: i64,
}

// ---------------------------------------------------------------------------
// Fixed-point math
// ---------------------------------------------------------------------------

/// Value of `amount` collateral in stablecoin base units, rounded down.
pub fn collateral_value(amount: u64, price_e6: u64, collateral_unit: u64) -> Result<u128> {
    if collateral_unit == 0 {
        return Err(RiskError::InvalidParameter);
    }
    // u64 * u64 always fits in u128
    Ok((amount as u128 * price_e6 as u128) / collateral_unit as u128)
}

/// `floor(value * threshold * precision_scale / (debt * PERCENT_BASE))`,
/// or [`HEALTH_FACTOR_MAX`] when the position carries no debt.
pub fn health_factor(params: &RiskParams, position: &Position, price_e6: u64) -> Result<u128> {
    if position.debt_amount == 0 {
        return Ok(HEALTH_FACTOR_MAX);
    }
    let value = collateral_value(position.collateral_amount, price_e6, params.collateral_unit)?;
    let weighted = value
        .checked_mul(params.liquidation_threshold as u128)
        .and_then(|v| v.checked_mul(params.precision_scale as u128))
        .ok_or(RiskError::InvalidAmount)?;
    let scaled_debt = position.debt_amount as u128 * PERCENT_BASE as u128;
    Ok(weighted / scaled_debt)
}

pub fn is_liquidatable(params: &RiskParams, position: &Position, price_e6: u64) -> Result<bool> {
    if position.debt_amount == 0 {
        return Ok(false);
    }
    Ok(health_factor(params, position, price_e6)? < params.min_health_factor as u128)
}

/// Largest debt `collateral_amount` can carry at `price_e6`.
///
/// Capacity is the debt at which the health factor equals exactly
/// `min_health_factor`; with a non-zero `max_ltv` the target is further
/// capped at `value * max_ltv / 100`. Rounded down, so a position sized to
/// this debt is never below the minimum.
pub fn max_debt(params: &RiskParams, collateral_amount: u64, price_e6: u64) -> Result<u64> {
    let value = collateral_value(collateral_amount, price_e6, params.collateral_unit)?;
    let weighted = value
        .checked_mul(params.liquidation_threshold as u128)
        .and_then(|v| v.checked_mul(params.precision_scale as u128))
        .ok_or(RiskError::InvalidAmount)?;
    let divisor = PERCENT_BASE as u128 * params.min_health_factor as u128;
    if divisor == 0 {
        return Err(RiskError::InvalidParameter);
    }
    let mut target = weighted / divisor;
    if params.max_ltv != 0 {
        let ltv_cap = value
            .checked_mul(params.max_ltv as u128)
            .ok_or(RiskError::InvalidAmount)?
            / PERCENT_BASE as u128;
        target = target.min(ltv_cap);
    }
    Ok(target.min(u64::MAX as u128) as u64)
}

/// Collateral that may leave a position which keeps `remaining_debt`, such
/// that the health factor stays at or above the minimum. Rounded so the
/// collateral left behind is never short.
pub fn withdrawable_collateral(
    params: &RiskParams,
    collateral_amount: u64,
    remaining_debt: u64,
    price_e6: u64,
) -> Result<u64> {
    if remaining_debt == 0 {
        return Ok(collateral_amount);
    }
    if price_e6 == 0 {
        return Err(RiskError::InvalidPrice);
    }
    let needed_weighted = (remaining_debt as u128)
        .checked_mul(PERCENT_BASE as u128)
        .and_then(|v| v.checked_mul(params.min_health_factor as u128))
        .ok_or(RiskError::InvalidAmount)?;
    let weight = params.liquidation_threshold as u128 * params.precision_scale as u128;
    if weight == 0 {
        return Err(RiskError::InvalidParameter);
    }
    let value_needed = needed_weighted.div_ceil(weight);
    let collateral_needed = value_needed
        .checked_mul(params.collateral_unit as u128)
        .ok_or(RiskError::InvalidAmount)?
        .div_ceil(price_e6 as u128);
    if collateral_needed >= collateral_amount as u128 {
        return Ok(0);
    }
    Ok(collateral_amount - collateral_needed as u64)
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DepositAndMint {
    pub position: Position,
    pub deposited: u64,
    pub minted: u64,
    pub health_factor: u128,
}

/// Locks `deposit_amount` more collateral and mints the stablecoin needed to
/// bring the debt up to [`max_debt`] (never beyond it).
pub fn deposit_and_mint(
    params: &RiskParams,
    position: &Position,
    deposit_amount: u64,
    price_e6: u64,
) -> Result<DepositAndMint> {
    if price_e6 == 0 {
        return Err(RiskError::InvalidPrice);
    }
    if deposit_amount == 0 {
        return Err(RiskError::InvalidAmount);
    }
    let collateral_amount = position
        .collateral_amount
        .checked_add(deposit_amount)
        .ok_or(RiskError::InvalidAmount)?;

    let target = max_debt(params, collateral_amount, price_e6)?;
    let minted = target.saturating_sub(position.debt_amount);
    let debt_amount = position
        .debt_amount
        .checked_add(minted)
        .ok_or(RiskError::InvalidAmount)?;

    let next = Position { collateral_amount, debt_amount };
    let hf = health_factor(params, &next, price_e6)?;
    if next.debt_amount > 0 && hf < params.min_health_factor as u128 {
        return Err(RiskError::InsufficientCollateral);
    }

    Ok(DepositAndMint {
        position: next,
        deposited: deposit_amount,
        minted,
        health_factor: hf,
    })
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BurnAndRedeem {
    pub position: Position,
    pub burned: u64,
    pub redeemed: u64,
    pub health_factor: u128,
}

/// Retires `burn_amount` of debt and releases collateral in proportion to
/// the debt repaid, rounded down and capped so the position stays healthy.
///
/// Repaying the whole debt releases all collateral. A zero burn is only
/// accepted on a debt-free position and releases whatever collateral is
/// left there.
pub fn burn_and_redeem(
    params: &RiskParams,
    position: &Position,
    burn_amount: u64,
    price_e6: u64,
) -> Result<BurnAndRedeem> {
    if price_e6 == 0 {
        return Err(RiskError::InvalidPrice);
    }
    let debt = position.debt_amount;
    let collateral = position.collateral_amount;
    if burn_amount > debt {
        return Err(RiskError::InsufficientDebt);
    }
    if burn_amount == 0 && (debt > 0 || collateral == 0) {
        return Err(RiskError::InvalidAmount);
    }

    let remaining_debt = debt - burn_amount;
    let redeemed = if remaining_debt == 0 {
        collateral
    } else {
        let proportional = (collateral as u128 * burn_amount as u128 / debt as u128) as u64;
        proportional.min(withdrawable_collateral(params, collateral, remaining_debt, price_e6)?)
    };

    let next = Position {
        collateral_amount: collateral - redeemed,
        debt_amount: remaining_debt,
    };
    let hf = health_factor(params, &next, price_e6)?;
    if next.debt_amount > 0 && hf < params.min_health_factor as u128 {
        return Err(RiskError::InsufficientCollateral);
    }

    Ok(BurnAndRedeem {
        position: next,
        burned: burn_amount,
        redeemed,
        health_factor: hf,
    })
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Liquidation {
    pub position: Position,
    pub repaid: u64,
    pub seized: u64,
    /// Part of `seized` paid as the liquidation bonus.
    pub bonus: u64,
    /// The bonus-inflated seizure exceeded the locked collateral; everything
    /// left was seized and the full repay still retired.
    pub shortfall: bool,
    pub health_factor_before: u128,
    pub health_factor_after: u128,
}

/// Liquidator repays `repay_amount` of an eligible position's debt and
/// receives its value in collateral plus the bonus, capped at what is
/// locked. Partial liquidation is allowed.
pub fn liquidate(
    params: &RiskParams,
    position: &Position,
    repay_amount: u64,
    price_e6: u64,
) -> Result<Liquidation> {
    if price_e6 == 0 {
        return Err(RiskError::InvalidPrice);
    }
    let health_factor_before = health_factor(params, position, price_e6)?;
    if position.debt_amount == 0 || health_factor_before >= params.min_health_factor as u128 {
        return Err(RiskError::HealthyPosition);
    }
    if repay_amount == 0 {
        return Err(RiskError::InvalidAmount);
    }
    if repay_amount > position.debt_amount {
        return Err(RiskError::ExcessiveRepay);
    }
    if position.collateral_amount == 0 {
        return Err(RiskError::InsufficientCollateralToSeize);
    }

    let base = repay_amount as u128 * params.collateral_unit as u128 / price_e6 as u128;
    let bonus = base
        .checked_mul(params.liquidation_bonus as u128)
        .ok_or(RiskError::InvalidAmount)?
        / PERCENT_BASE as u128;
    let wanted = base.checked_add(bonus).ok_or(RiskError::InvalidAmount)?;

    let shortfall = wanted > position.collateral_amount as u128;
    let seized = if shortfall {
        position.collateral_amount
    } else {
        wanted as u64
    };

    let next = Position {
        collateral_amount: position.collateral_amount - seized,
        debt_amount: position.debt_amount - repay_amount,
    };
    let health_factor_after = health_factor(params, &next, price_e6)?;

    Ok(Liquidation {
        position: next,
        repaid: repay_amount,
        seized,
        bonus: (seized as u128).saturating_sub(base) as u64,
        shortfall,
        health_factor_before,
        health_factor_after,
    })
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Host-independent ledger of one market: positions indexed by
/// [`PositionKey`], their vault balances and the stablecoin supply.
///
/// Each operation plans the full post-state first and commits it only when
/// every step succeeded.
#[derive(Clone, Debug)]
pub struct Ledger {
    params: RiskParams,
    positions: BTreeMap<PositionKey, Position>,
    vaults: BTreeMap<PositionKey, u64>,
    supply: u64,
}

impl Ledger {
    pub fn new(params: RiskParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            positions: BTreeMap::new(),
            vaults: BTreeMap::new(),
            supply: 0,
        })
    }

    pub fn params(&self) -> &RiskParams {
        &self.params
    }

    pub fn update_config(&mut self, update: &ConfigUpdate) -> Result<()> {
        self.params = self.params.apply(update)?;
        Ok(())
    }

    pub fn position(&self, key: &PositionKey) -> Option<&Position> {
        self.positions.get(key)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&PositionKey, &Position)> {
        self.positions.iter()
    }

    pub fn vault_balance(&self, key: &PositionKey) -> u64 {
        self.vaults.get(key).copied().unwrap_or(0)
    }

    pub fn supply(&self) -> u64 {
        self.supply
    }

    pub fn total_debt(&self) -> u128 {
        self.positions.values().map(|p| p.debt_amount as u128).sum()
    }

    pub fn deposit_and_mint(
        &mut self,
        key: PositionKey,
        deposit_amount: u64,
        price_e6: u64,
    ) -> Result<DepositAndMint> {
        let current = self.positions.get(&key).copied().unwrap_or_default();
        let out = deposit_and_mint(&self.params, &current, deposit_amount, price_e6)?;

        let supply = self.supply.checked_add(out.minted).ok_or(RiskError::InvalidAmount)?;
        let vault = self
            .vault_balance(&key)
            .checked_add(out.deposited)
            .ok_or(RiskError::InvalidAmount)?;

        self.supply = supply;
        self.vaults.insert(key, vault);
        self.positions.insert(key, out.position);
        Ok(out)
    }

    pub fn burn_and_redeem(
        &mut self,
        key: &PositionKey,
        burn_amount: u64,
        price_e6: u64,
    ) -> Result<BurnAndRedeem> {
        let current = *self.positions.get(key).ok_or(RiskError::PositionNotFound)?;
        let out = burn_and_redeem(&self.params, &current, burn_amount, price_e6)?;

        let supply = self.supply.checked_sub(out.burned).ok_or(RiskError::InsufficientDebt)?;
        let vault = self
            .vault_balance(key)
            .checked_sub(out.redeemed)
            .ok_or(RiskError::InsufficientCollateral)?;

        self.supply = supply;
        self.vaults.insert(*key, vault);
        self.positions.insert(*key, out.position);
        Ok(out)
    }

    pub fn liquidate(
        &mut self,
        key: &PositionKey,
        repay_amount: u64,
        price_e6: u64,
    ) -> Result<Liquidation> {
        let current = *self.positions.get(key).ok_or(RiskError::PositionNotFound)?;
        let out = liquidate(&self.params, &current, repay_amount, price_e6)?;

        let supply = self.supply.checked_sub(out.repaid).ok_or(RiskError::ExcessiveRepay)?;
        let vault = self
            .vault_balance(key)
            .checked_sub(out.seized)
            .ok_or(RiskError::InsufficientCollateralToSeize)?;

        self.supply = supply;
        self.vaults.insert(*key, vault);
        self.positions.insert(*key, out.position);
        Ok(out)
    }

    /// Supply equals the sum of debts and every vault holds exactly its
    /// position's collateral.
    pub fn check_conservation(&self) -> bool {
        if self.supply as u128 != self.total_debt() {
            return false;
        }
        self.positions
            .iter()
            .all(|(key, p)| self.vault_balance(key) == p.collateral_amount)
    }
}
