use crate::config::{condition_multipliers, pricing_rules};
use crate::state::PriceSnapshot;
use crate::types::{Condition, Estimate};

/// Multiplier applied on top of the category markup.
pub fn condition_multiplier(condition: Condition) -> f64 {
    match condition {
        Condition::New => condition_multipliers::NEW,
        Condition::Refurbished => condition_multipliers::REFURBISHED,
        Condition::Used => condition_multipliers::USED,
        Condition::Other => condition_multipliers::OTHER,
    }
}

/// Estimate a listing price and range for an item bought at `original_price`.
///
/// Only defined for `original_price > 0`; callers validate before calling.
pub fn estimate(
    snapshot: &PriceSnapshot,
    original_price: f64,
    category: Option<&str>,
    condition: Condition,
) -> Estimate {
    let (category_markup, markup_source) = snapshot.category_markup(category);
    let (prediction, low, high) = price_with_markup(original_price, category_markup, condition);
    Estimate { prediction, low, high, markup_source }
}

/// Core arithmetic once the category markup is known. Returns
/// `(prediction, low, high)`.
pub fn price_with_markup(
    original_price: f64,
    category_markup: f64,
    condition: Condition,
) -> (f64, f64, f64) {
    let mut pred = original_price * category_markup * condition_multiplier(condition);

    if condition == Condition::New {
        pred *= pricing_rules::NEW_UPLIFT;
    }

    let floor = original_price * pricing_rules::FLOOR;
    let ceiling = original_price * pricing_rules::CEILING;
    if pred < floor {
        pred = floor;
    } else if pred > ceiling {
        pred = ceiling;
    }

    let (mut low, high) = match condition {
        Condition::New => (pred, pred * pricing_rules::NEW_HIGH),
        Condition::Refurbished => (original_price * pricing_rules::REFURBISHED_LOW, pred),
        Condition::Used => (original_price * pricing_rules::USED_LOW, pred),
        Condition::Other => (pred, pred),
    };

    // New items never quote a low end below the markup floor.
    if condition == Condition::New && low < floor {
        low = floor;
    }

    (pred, low, high)
}
