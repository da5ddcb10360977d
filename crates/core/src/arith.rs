//! Overflow-aware Decimal helpers.
//!
//! `Decimal` operators panic past roughly 7.9e28. Stake math goes through
//! these helpers instead, so absurd input degrades to an invalid result.

use rust_decimal::Decimal;

/// Sums the values, or `None` on overflow.
#[must_use]
pub fn checked_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
}

/// Sums the values, clamping at the representable bounds.
#[must_use]
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Computes `amount × numerator / denominator`, or `None` on overflow or a
/// zero denominator.
///
/// Dividing first is tried when the product alone would overflow.
#[must_use]
pub fn checked_scale(amount: Decimal, numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(numerator)
        .and_then(|v| v.checked_div(denominator))
        .or_else(|| {
            amount
                .checked_div(denominator)
                .and_then(|v| v.checked_mul(numerator))
        })
}

/// The largest value with the sign of `like`.
#[must_use]
pub fn saturated(like: Decimal) -> Decimal {
    if like.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}
