use crate::error::{AppError, Result};

pub const DATASET_PATH: &str = "data/listings.csv";
pub const PREDICTION_LOG_PATH: &str = "predictions.jsonl";
pub const CURRENCY: &str = "KSh";

/// Category label used when the dataset has no category column, and reported
/// as `used_category` when a request resolves to no category at all.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Confidence label echoed in every prediction response.
pub const CONFIDENCE_LABEL: &str = "95%";

/// A category median is only trusted once this many qualifying rows back it.
/// Smaller categories fall back to the global median.
pub const MIN_CATEGORY_SAMPLES: usize = 15;

/// Channel capacity for the prediction journal writer.
pub const CHANNEL_CAPACITY: usize = 1024;

/// Search: minimum trimmed query length and maximum hits returned.
pub const SEARCH_MIN_QUERY_CHARS: usize = 2;
pub const SEARCH_MAX_RESULTS: usize = 12;

/// History endpoint defaults.
pub const HISTORY_DEFAULT_LIMIT: usize = 10;
pub const HISTORY_MAX_LIMIT: usize = 100;

/// Qualifying-row bounds on `current_price / original_price` (both exclusive).
pub mod markup_bounds {
    pub const MIN: f64 = 0.2;
    pub const MAX: f64 = 5.0;
}

/// Condition multipliers applied on top of the category markup.
pub mod condition_multipliers {
    pub const NEW: f64 = 1.05;
    pub const REFURBISHED: f64 = 0.90;
    pub const USED: f64 = 0.75;
    pub const OTHER: f64 = 1.00;
}

/// Business-rule factors, all relative to the original price unless noted.
pub mod pricing_rules {
    /// Extra uplift on the prediction for new items.
    pub const NEW_UPLIFT: f64 = 1.1;
    /// Minimum 30% markup floor.
    pub const FLOOR: f64 = 1.3;
    /// 3x cap.
    pub const CEILING: f64 = 3.0;
    /// New: high end of the range, relative to the prediction.
    pub const NEW_HIGH: f64 = 1.2;
    pub const REFURBISHED_LOW: f64 = 1.1;
    pub const USED_LOW: f64 = 0.7;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dataset_path: String,
    pub prediction_log_path: String,
    pub currency: String,
    pub log_level: String,
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            dataset_path: std::env::var("DATASET_PATH")
                .unwrap_or_else(|_| DATASET_PATH.to_string()),
            prediction_log_path: std::env::var("PREDICTION_LOG_PATH")
                .unwrap_or_else(|_| PREDICTION_LOG_PATH.to_string()),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| CURRENCY.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
        })
    }
}
