//! zwap-pools
//!
//! Total value locked across liquidity pools and its 24h change, computed
//! from caller-owned price and liquidity snapshots.

pub mod liquidity;

pub use liquidity::{
    aggregate, current_valuation, LiquiditySnapshot, LiquiditySummary, PoolPosition,
    PoolReserves, PriceTable, NATIVE_ASSET,
};
