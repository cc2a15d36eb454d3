use std::collections::BTreeMap;

use crate::config::markup_bounds;
use crate::types::{CategoryStat, Listing};

/// Median of a sample. Even-length samples average the two middle values.
/// Returns None for an empty sample.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        Some((v[mid - 1] + v[mid]) * 0.5)
    } else {
        Some(v[mid])
    }
}

/// Qualifying-row predicate: both prices positive and the markup strictly
/// inside the outlier bounds.
pub fn is_qualifying(current_price: f64, original_price: f64) -> bool {
    if !(original_price > 0.0 && current_price > 0.0) {
        return false;
    }
    let ratio = current_price / original_price;
    ratio > markup_bounds::MIN && ratio < markup_bounds::MAX
}

/// Per-category statistics, keyed by the category name as stored.
pub fn category_stats(listings: &[Listing]) -> BTreeMap<String, CategoryStat> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for listing in listings {
        groups
            .entry(listing.main_category.as_str())
            .or_default()
            .push(listing.markup_ratio());
    }

    groups
        .into_iter()
        .filter_map(|(name, ratios)| {
            let median_markup = median(&ratios)?;
            Some((
                name.to_string(),
                CategoryStat { median_markup, count: ratios.len() },
            ))
        })
        .collect()
}

/// Median markup over every listing regardless of category.
pub fn global_median(listings: &[Listing]) -> Option<f64> {
    let ratios: Vec<f64> = listings.iter().map(Listing::markup_ratio).collect();
    median(&ratios)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(category: &str, current: f64, original: f64) -> Listing {
        Listing {
            name: format!("{category} item"),
            main_category: category.to_string(),
            current_price: current,
            original_price: original,
        }
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn qualifying_bounds_are_exclusive() {
        assert!(is_qualifying(150.0, 100.0));
        assert!(!is_qualifying(20.0, 100.0), "ratio exactly 0.2 excluded");
        assert!(!is_qualifying(500.0, 100.0), "ratio exactly 5.0 excluded");
        assert!(!is_qualifying(10.0, 100.0));
        assert!(!is_qualifying(100.0, 0.0));
        assert!(!is_qualifying(0.0, 100.0));
        assert!(!is_qualifying(-50.0, -100.0));
    }

    #[test]
    fn groups_by_category_with_counts() {
        let rows = vec![
            listing("Phones", 150.0, 100.0),
            listing("Phones", 200.0, 100.0),
            listing("Phones", 250.0, 100.0),
            listing("Home", 120.0, 100.0),
        ];
        let stats = category_stats(&rows);
        assert_eq!(stats.len(), 2);
        let phones = stats["Phones"];
        assert_eq!(phones.count, 3);
        assert!((phones.median_markup - 2.0).abs() < 1e-9);
        assert_eq!(stats["Home"].count, 1);

        let global = global_median(&rows).unwrap();
        assert!((global - 1.75).abs() < 1e-9, "global={global}");
    }

    #[test]
    fn categories_are_case_sensitive_as_stored() {
        let rows = vec![listing("phones", 150.0, 100.0), listing("Phones", 150.0, 100.0)];
        assert_eq!(category_stats(&rows).len(), 2);
    }
}
