//! Redemption curve and fee arithmetic.
//!
//! Pure computation: the payout ratio grows linearly from `min_redeem_ratio`
//! at `min_redeem_duration` to `max_redeem_ratio` at `max_redeem_duration`
//! and saturates beyond it. Durations shorter than the minimum pay nothing.
//! Integer division truncates toward zero everywhere.

use crate::constants::{BPS_PRECISION, PERCENT_PRECISION};
use crate::error::ValidationError;
use crate::types::{Amount, RedeemSettings};

/// Payout ratio in whole percent for a vesting `duration` in seconds.
///
/// # Examples
///
/// ```
/// use vesta_core::constants::SECONDS_PER_DAY;
/// use vesta_core::curve::redeem_ratio;
/// use vesta_core::types::RedeemSettings;
///
/// let s = RedeemSettings::default(); // 50% at 15 days, 100% at 90 days
/// assert_eq!(redeem_ratio(&s, 14 * SECONDS_PER_DAY), 0);
/// assert_eq!(redeem_ratio(&s, 15 * SECONDS_PER_DAY), 50);
/// assert_eq!(redeem_ratio(&s, 45 * SECONDS_PER_DAY), 70);
/// assert_eq!(redeem_ratio(&s, 365 * SECONDS_PER_DAY), 100);
/// ```
pub fn redeem_ratio(settings: &RedeemSettings, duration: u64) -> u64 {
    if duration < settings.min_redeem_duration {
        return 0;
    }
    if duration > settings.max_redeem_duration {
        return settings.max_redeem_ratio;
    }

    let elapsed = (duration - settings.min_redeem_duration) as u128;
    let ratio_span = settings
        .max_redeem_ratio
        .saturating_sub(settings.min_redeem_ratio) as u128;
    // Non-zero for validated settings.
    let duration_span = settings
        .max_redeem_duration
        .saturating_sub(settings.min_redeem_duration)
        .max(1) as u128;

    // elapsed <= duration_span, so the quotient never exceeds ratio_span and
    // the sum never exceeds max(min_redeem_ratio, max_redeem_ratio).
    settings.min_redeem_ratio + (elapsed * ratio_span / duration_span) as u64
}

/// Liquid-asset payout for redeeming `amount` escrow over `duration` seconds.
///
/// # Examples
///
/// ```
/// use vesta_core::constants::SECONDS_PER_DAY;
/// use vesta_core::curve::payout_for_duration;
/// use vesta_core::types::RedeemSettings;
///
/// let s = RedeemSettings::default();
/// assert_eq!(payout_for_duration(&s, 1000, 45 * SECONDS_PER_DAY), Ok(700));
/// ```
pub fn payout_for_duration(
    settings: &RedeemSettings,
    amount: Amount,
    duration: u64,
) -> Result<Amount, ValidationError> {
    apply_percent(amount, redeem_ratio(settings, duration))
}

/// Share of a vesting `amount` granted to the compensation plugin.
pub fn compensation_for(amount: Amount, adjustment_pct: u64) -> Result<Amount, ValidationError> {
    apply_percent(amount, adjustment_pct)
}

/// Fee charged when `amount` is deallocated from a plugin charging `fee_bps`.
///
/// # Examples
///
/// ```
/// use vesta_core::curve::deallocation_fee;
///
/// assert_eq!(deallocation_fee(100, 200), Ok(2));
/// assert_eq!(deallocation_fee(49, 200), Ok(0));
/// ```
pub fn deallocation_fee(amount: Amount, fee_bps: u16) -> Result<Amount, ValidationError> {
    amount
        .checked_mul(fee_bps as u128)
        .map(|v| v / BPS_PRECISION)
        .ok_or(ValidationError::ArithmeticOverflow)
}

fn apply_percent(amount: Amount, pct: u64) -> Result<Amount, ValidationError> {
    amount
        .checked_mul(pct as u128)
        .map(|v| v / PERCENT_PRECISION)
        .ok_or(ValidationError::ArithmeticOverflow)
}
