use std::collections::{BTreeMap, HashMap};

use crate::config::{MIN_CATEGORY_SAMPLES, SEARCH_MAX_RESULTS, SEARCH_MIN_QUERY_CHARS};
use crate::dataset::stats::{category_stats, global_median};
use crate::types::{CategoryStat, Listing, MarkupSource};

// ---------------------------------------------------------------------------
// PriceSnapshot
// ---------------------------------------------------------------------------

/// Everything the estimator and lookup endpoints read, built once at startup.
/// Never mutated after construction; shared across handlers behind an `Arc`.
#[derive(Debug)]
pub struct PriceSnapshot {
    /// Qualifying rows in dataset order.
    listings: Vec<Listing>,
    /// stored category name → stat
    categories: BTreeMap<String, CategoryStat>,
    /// lowercased category name → stored category name
    category_index: HashMap<String, String>,
    global_median: f64,
}

impl PriceSnapshot {
    /// Build from qualifying listings. Returns None when there are none, since
    /// the global median would be undefined.
    pub fn from_listings(listings: Vec<Listing>) -> Option<Self> {
        let global_median = global_median(&listings)?;
        let categories = category_stats(&listings);

        // Stored names that differ only by case collapse onto the larger sample.
        let mut category_index: HashMap<String, String> = HashMap::new();
        for (name, stat) in &categories {
            let key = name.to_lowercase();
            let replace = match category_index.get(&key) {
                Some(existing) => categories[existing].count < stat.count,
                None => true,
            };
            if replace {
                category_index.insert(key, name.clone());
            }
        }

        Some(Self {
            listings,
            categories,
            category_index,
            global_median,
        })
    }

    pub fn global_median(&self) -> f64 {
        self.global_median
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// All category statistics, sorted by stored name.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategoryStat)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Case-insensitive category lookup. Returns the stored name and its stat.
    pub fn category_stat(&self, category: &str) -> Option<(&str, CategoryStat)> {
        let stored = self.category_index.get(&category.trim().to_lowercase())?;
        let stat = self.categories.get(stored)?;
        Some((stored.as_str(), *stat))
    }

    /// Markup basis for a category. Empty, unknown and under-sampled
    /// categories fall back to the global median.
    pub fn category_markup(&self, category: Option<&str>) -> (f64, MarkupSource) {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        match category.and_then(|c| self.category_stat(c)) {
            Some((_, stat)) if stat.count >= MIN_CATEGORY_SAMPLES => {
                (stat.median_markup, MarkupSource::Category)
            }
            _ => (self.global_median, MarkupSource::Global),
        }
    }

    /// Category of the first listing whose name equals `product_name`,
    /// ignoring case and surrounding whitespace.
    pub fn infer_category(&self, product_name: &str) -> Option<&str> {
        let wanted = product_name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.listings
            .iter()
            .find(|l| l.name.trim().to_lowercase() == wanted)
            .map(|l| l.main_category.as_str())
    }

    /// Case-insensitive substring search over listing names. Queries shorter
    /// than the minimum length return nothing.
    pub fn search(&self, query: &str) -> Vec<&Listing> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < SEARCH_MIN_QUERY_CHARS {
            return Vec::new();
        }
        self.listings
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&query))
            .take(SEARCH_MAX_RESULTS)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
