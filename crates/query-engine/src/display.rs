//! Values derived for display: discount badge, star rating, currency.
//!
//! None of these feed back into filtering or sorting.

use catalog_data::Product;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Discount
// =============================================================================

/// Round half toward positive infinity, the way storefront scripts round.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// `round((1 - price / original) * 100)`.
///
/// `None` when there is no original price or it is zero. The result is not
/// clamped: a price above the original gives a negative percent.
pub fn discount_percent(price: f64, original: Option<f64>) -> Option<i64> {
    let original = original.filter(|o| *o != 0.0)?;
    let percent = round_half_up((1.0 - price / original) * 100.0);
    percent.is_finite().then_some(percent as i64)
}

/// Thresholds for flagging discounts that are probably bad data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    pub max_plausible_percent: i64,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self {
            max_plausible_percent: 90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscountAnomaly {
    /// Original price is below the current price
    Negative,
    /// Percent exceeds the policy's plausible maximum
    Implausible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountAssessment {
    pub percent: i64,
    pub anomaly: Option<DiscountAnomaly>,
}

/// Discount for a product plus a data-quality flag. The percent is reported
/// as computed even when flagged.
pub fn assess_discount(product: &Product, policy: &DiscountPolicy) -> Option<DiscountAssessment> {
    let percent = discount_percent(product.price, product.original_price)?;
    let anomaly = if percent < 0 {
        Some(DiscountAnomaly::Negative)
    } else if percent > policy.max_plausible_percent {
        Some(DiscountAnomaly::Implausible)
    } else {
        None
    };
    Some(DiscountAssessment { percent, anomaly })
}

// =============================================================================
// Stars
// =============================================================================

/// Five-slot star rendering of a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarRating {
    pub full: u8,
    pub half: bool,
    pub empty: u8,
}

impl StarRating {
    /// Full stars for the integer part, a half star when the fraction is at
    /// least 0.5, empty stars for the rest. Out-of-range ratings are clamped.
    pub fn from_rating(rating: f32) -> Self {
        let rating = if rating.is_finite() {
            rating.clamp(0.0, 5.0)
        } else {
            0.0
        };
        let full = rating.floor() as u8;
        let half = full < 5 && rating - rating.floor() >= 0.5;
        let empty = 5 - full - u8::from(half);
        Self { full, half, empty }
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.full {
            f.write_str("★")?;
        }
        if self.half {
            f.write_str("⯪")?;
        }
        for _ in 0..self.empty {
            f.write_str("☆")?;
        }
        Ok(())
    }
}

// =============================================================================
// Currency
// =============================================================================

/// `$1,234.56` style formatting.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}
