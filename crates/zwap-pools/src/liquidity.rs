//! Liquidity aggregation.
//!
//! The 24h baseline is an approximation: each pool's prior value is its
//! current valuation scaled by `prior_contribution / total_contribution`, so a
//! price move inside the window is attributed to the present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zwap_core::amount::Amount;
use zwap_core::error::ZwapError;

/// Price-table key for the native currency side of every pool.
pub const NATIVE_ASSET: &str = "ZIL";

/// Pool reserves in display units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    pub zil_reserve: Amount,
    pub token_reserve: Amount,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPosition {
    /// Pool value in USD as reported by the snapshot provider.
    #[serde(default)]
    pub current_pool_value: Option<Amount>,
    #[serde(default)]
    pub total_contribution: Amount,
    #[serde(default)]
    pub contribution_change_24h: Option<Amount>,
    #[serde(default)]
    pub reserves: Option<PoolReserves>,
}

impl PoolPosition {
    /// `total_contribution - change_24h`, missing change counted as zero.
    pub fn prior_contribution(&self) -> Result<Amount, ZwapError> {
        self.total_contribution
            .checked_sub(self.contribution_change_24h.unwrap_or(Amount::ZERO))
    }
}

/// Asset id → pool position. Read-only input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiquiditySnapshot(pub BTreeMap<String, PoolPosition>);

impl LiquiditySnapshot {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PoolPosition)> {
        self.0.iter()
    }
}

/// Asset id → USD price.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable(pub BTreeMap<String, Amount>);

impl PriceTable {
    pub fn price(&self, asset: &str) -> Option<Amount> {
        self.0.get(asset).copied()
    }
}

/// Value of a pool at current prices. Uses `reserves × prices` when the
/// reserves and both prices are known, then the reported pool value, then zero.
pub fn current_valuation(
    asset: &str,
    position: &PoolPosition,
    prices: &PriceTable,
) -> Result<Amount, ZwapError> {
    if let (Some(reserves), Some(zil_price), Some(token_price)) = (
        position.reserves,
        prices.price(NATIVE_ASSET),
        prices.price(asset),
    ) {
        let zil_side = reserves.zil_reserve.checked_mul(zil_price)?;
        let token_side = reserves.token_reserve.checked_mul(token_price)?;
        return zil_side.checked_add(token_side);
    }
    Ok(position.current_pool_value.unwrap_or(Amount::ZERO))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquiditySummary {
    pub total_liquidity: Amount,
    pub prior_liquidity: Amount,
    /// Percentage points; zero when there is no baseline.
    pub change_percent: Amount,
}

pub fn aggregate(
    snapshot: &LiquiditySnapshot,
    prices: &PriceTable,
) -> Result<LiquiditySummary, ZwapError> {
    let mut total = Amount::ZERO;
    let mut prior = Amount::ZERO;

    for (asset, position) in snapshot.iter() {
        total = total.checked_add(position.current_pool_value.unwrap_or(Amount::ZERO))?;

        let prior_contribution = position.prior_contribution()?;
        if prior_contribution.is_zero() || position.total_contribution.is_zero() {
            debug!(asset = %asset, "pool skipped from 24h baseline");
            continue;
        }
        let factor = prior_contribution.checked_div(position.total_contribution)?;
        let prior_value = current_valuation(asset, position, prices)?.checked_mul(factor)?;
        prior = prior.checked_add(prior_value)?;
    }

    let change_percent = if prior.is_zero() {
        Amount::ZERO
    } else {
        total
            .checked_sub(prior)?
            .checked_div(prior)?
            .checked_mul(Amount::ONE_HUNDRED)?
    };

    debug!(
        total = %total,
        prior = %prior,
        change_percent = %change_percent,
        pools = snapshot.0.len(),
        "liquidity aggregated"
    );

    Ok(LiquiditySummary {
        total_liquidity: total,
        prior_liquidity: prior,
        change_percent,
    })
}
