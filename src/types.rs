use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// One qualifying dataset row. Prices are already parsed and filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub main_category: String,
    pub current_price: f64,
    pub original_price: f64,
}

impl Listing {
    pub fn markup_ratio(&self) -> f64 {
        self.current_price / self.original_price
    }
}

/// Median markup and sample count for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryStat {
    pub median_markup: f64,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Refurbished,
    Used,
    /// Empty, missing or unrecognized.
    Other,
}

impl Condition {
    /// Trimmed, case-insensitive. Anything unrecognized is `Other`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("new") => Condition::New,
            Some("refurbished") => Condition::Refurbished,
            Some("used") => Condition::Used,
            _ => Condition::Other,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Condition::New => "new",
            Condition::Refurbished => "refurbished",
            Condition::Used => "used",
            Condition::Other => "other",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Estimate
// ---------------------------------------------------------------------------

/// Which median the category markup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupSource {
    Category,
    Global,
}

impl std::fmt::Display for MarkupSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkupSource::Category => write!(f, "category"),
            MarkupSource::Global => write!(f, "global"),
        }
    }
}

/// Raw estimator output. `low <= prediction <= high` does not hold for every
/// condition: refurbished and used lows are anchored to the original price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub prediction: f64,
    pub low: f64,
    pub high: f64,
    pub markup_source: MarkupSource,
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Price as submitted: JSON clients may send a number, forms always send text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub original_price: Option<PriceInput>,
    #[serde(default)]
    pub main_category: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: f64,
    pub price_range: PriceRange,
    pub currency: String,
    pub used_category: String,
    pub confidence: String,
    pub markup_source: MarkupSource,
}

/// One listing returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub category: String,
    pub current_price: f64,
    pub original_price: f64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_parse_trims_and_ignores_case() {
        assert_eq!(Condition::parse(Some("new")), Condition::New);
        assert_eq!(Condition::parse(Some("  NEW ")), Condition::New);
        assert_eq!(Condition::parse(Some("Refurbished")), Condition::Refurbished);
        assert_eq!(Condition::parse(Some("used\n")), Condition::Used);
        assert_eq!(Condition::parse(Some("mint")), Condition::Other);
        assert_eq!(Condition::parse(Some("")), Condition::Other);
        assert_eq!(Condition::parse(None), Condition::Other);
    }

    #[test]
    fn price_input_accepts_number_or_text() {
        let req: PredictionRequest =
            serde_json::from_str(r#"{"original_price": 1200.5, "condition": "used"}"#).unwrap();
        assert_eq!(req.original_price, Some(PriceInput::Number(1200.5)));

        let req: PredictionRequest =
            serde_json::from_str(r#"{"original_price": "1,200"}"#).unwrap();
        assert_eq!(req.original_price, Some(PriceInput::Text("1,200".to_string())));
        assert!(req.product_name.is_none());
    }

    #[test]
    fn markup_source_serializes_snake_case() {
        let json = serde_json::to_string(&MarkupSource::Global).unwrap();
        assert_eq!(json, "\"global\"");
    }
}
