/// ─── ZWAP Reward Constants ──────────────────────────────────────────────────
///
/// Total supply: 1,000,000 ZWAP
/// Base unit:    10^-12 ZWAP (same exponent as the native ZIL / Qa pair)
/// Emission:     retroactive airdrop at epoch 0, then linear mining per epoch

// ── Supply ───────────────────────────────────────────────────────────────────

/// Total fixed supply in whole ZWAP.
pub const TOTAL_SUPPLY_ZWAP: u64 = 1_000_000;

/// Base-unit exponent: 1 ZWAP = 10^12 base units.
pub const TOKEN_DECIMALS: u32 = 12;

/// Share of total supply released by the retroactive airdrop, in basis points.
pub const RETROACTIVE_AIRDROP_FACTOR_BPS: u32 = 500; // 5%

/// Flat airdrop bonus added on top of the retroactive share (whole ZWAP).
pub const FIXED_AIRDROP_BONUS_ZWAP: u64 = 8_500;

// ── Epochs ───────────────────────────────────────────────────────────────────

/// Length of one distribution epoch (seconds). Default: 7 days.
pub const EPOCH_DURATION_SECS: i64 = 7 * 24 * 3600;

pub const SECS_PER_DAY: i64 = 86_400;
pub const SECS_PER_HOUR: i64 = 3_600;
pub const SECS_PER_MINUTE: i64 = 60;

// ── Claim transactions ───────────────────────────────────────────────────────

/// Message version packed together with the chain id into `version`.
pub const MSG_VERSION: u32 = 1;

/// Gas limit attached to every distributor `Claim` call.
pub const CLAIM_GAS_LIMIT: u64 = 30_000;

/// Transition name of the distributor contract's claim entry point.
pub const CLAIM_ENTRY_POINT: &str = "Claim";

/// Chain id of the public mainnet.
pub const MAINNET_CHAIN_ID: u32 = 1;

/// Chain id of the developer testnet.
pub const TESTNET_CHAIN_ID: u32 = 333;

// ── Native currency units ────────────────────────────────────────────────────

/// 1 ZIL expressed in Qa.
pub const QA_PER_ZIL: u128 = 1_000_000_000_000;

/// 1 Li expressed in Qa. Gas prices are usually quoted in Li.
pub const QA_PER_LI: u128 = 1_000_000;
