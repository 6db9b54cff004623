//! Engine constants. Durations are in seconds, ratios in whole percent.

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Upper bound for both redeem ratios (100% of the escrowed amount).
pub const MAX_FIXED_RATIO: u64 = 100;

/// Upper bound for the compensation adjustment percentage.
pub const MAX_COMPENSATION_ADJUSTMENT: u64 = 100;

/// Denominator for percentage arithmetic.
pub const PERCENT_PRECISION: u128 = 100;

/// Denominator for basis-point arithmetic (10 000 bps = 100%).
pub const BPS_PRECISION: u128 = 10_000;

/// Ceiling for a plugin's deallocation fee: 200 bps (2%).
pub const MAX_DEALLOCATION_FEE_BPS: u16 = 200;

pub const DEFAULT_MIN_REDEEM_RATIO: u64 = 50;
pub const DEFAULT_MAX_REDEEM_RATIO: u64 = 100;
pub const DEFAULT_MIN_REDEEM_DURATION: u64 = 15 * SECONDS_PER_DAY;
pub const DEFAULT_MAX_REDEEM_DURATION: u64 = 90 * SECONDS_PER_DAY;

/// Default share of a vesting redemption granted to the compensation plugin.
///
/// Only takes effect once a compensation plugin is configured; with no plugin
/// the adjustment is forced to zero.
pub const DEFAULT_COMPENSATION_ADJUSTMENT: u64 = 50;
