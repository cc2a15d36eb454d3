use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::health::HealthState;
use crate::api::latency::{PredictionLatency, PredictionLatencyReport};
use crate::config::{
    CONFIDENCE_LABEL, HISTORY_DEFAULT_LIMIT, HISTORY_MAX_LIMIT, MIN_CATEGORY_SAMPLES,
    UNKNOWN_CATEGORY,
};
use crate::error::AppError;
use crate::estimator::estimate;
use crate::journal::{read_recent, JournalHandle, PredictionLogEntry};
use crate::state::PriceSnapshot;
use crate::types::{
    Condition, PredictionRequest, PredictionResponse, PriceInput, PriceRange, SearchHit,
};

#[derive(Clone)]
pub struct ApiState {
    pub snapshot: Arc<PriceSnapshot>,
    pub journal: JournalHandle,
    pub journal_path: PathBuf,
    pub currency: String,
    pub health: Arc<HealthState>,
    pub latency: Arc<PredictionLatency>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/predict", post(predict_form))
        .route("/predict_api", post(predict_json))
        .route("/search", get(search))
        .route("/history", get(get_history))
        .route("/categories", get(get_categories))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CategoryResponse {
    pub name: String,
    pub median_markup: f64,
    pub count: usize,
    /// Whether the category has enough samples to be used directly.
    pub usable: bool,
}

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub global_median_markup: f64,
    pub min_samples: usize,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub listings: usize,
    pub categories: usize,
    pub predictions_served: u64,
    pub journal_queue_pending: u64,
    pub secs_since_last_prediction: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn predict_form(
    State(state): State<ApiState>,
    form: Result<Form<PredictionRequest>, FormRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Form(req) = form.map_err(|e| AppError::Validation(e.body_text()))?;
    predict(&state, req).map(Json)
}

async fn predict_json(
    State(state): State<ApiState>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(req) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    predict(&state, req).map(Json)
}

/// Validate, estimate, journal. Shared by the form and JSON endpoints.
pub fn predict(state: &ApiState, req: PredictionRequest) -> Result<PredictionResponse, AppError> {
    let started = Instant::now();

    let original_price = validate_price(req.original_price.as_ref())?;
    let condition = Condition::parse(req.condition.as_deref());
    let category = resolve_category(&state.snapshot, &req);

    let est = estimate(&state.snapshot, original_price, category.as_deref(), condition);

    debug!(
        category = category.as_deref().unwrap_or(UNKNOWN_CATEGORY),
        %condition,
        original_price,
        prediction = est.prediction,
        markup_source = %est.markup_source,
        "Prediction computed",
    );

    let prediction = round_money(est.prediction);
    let price_range = PriceRange {
        low: round_money(est.low),
        high: round_money(est.high),
    };
    // Huge prices overflow to infinity, which JSON can only carry as null.
    if ![prediction, price_range.low, price_range.high].iter().all(|v| v.is_finite()) {
        return Err(AppError::Validation(format!(
            "original_price {original_price} is too large to price"
        )));
    }

    let response = PredictionResponse {
        prediction,
        price_range,
        currency: state.currency.clone(),
        used_category: category.unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        confidence: CONFIDENCE_LABEL.to_string(),
        markup_source: est.markup_source,
    };

    state.journal.record(PredictionLogEntry::new(req, response.clone()));
    state.health.record_prediction(now_ns());
    state.latency.record_prediction(started.elapsed(), est.markup_source);

    Ok(response)
}

async fn search(
    State(state): State<ApiState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let Query(params) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let query = params.q.unwrap_or_default();
    let hits = state
        .snapshot
        .search(&query)
        .into_iter()
        .map(|l| SearchHit {
            name: l.name.clone(),
            category: l.main_category.clone(),
            current_price: l.current_price,
            original_price: l.original_price,
            currency: state.currency.clone(),
        })
        .collect();
    Ok(Json(hits))
}

async fn get_history(
    State(state): State<ApiState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<PredictionLogEntry>>, AppError> {
    let Query(params) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let limit = params
        .limit
        .unwrap_or(HISTORY_DEFAULT_LIMIT)
        .min(HISTORY_MAX_LIMIT);
    let entries = read_recent(&state.journal_path, limit).await?;
    Ok(Json(entries))
}

async fn get_categories(State(state): State<ApiState>) -> Json<CategoriesResponse> {
    let categories = state
        .snapshot
        .categories()
        .map(|(name, stat)| CategoryResponse {
            name: name.to_string(),
            median_markup: stat.median_markup,
            count: stat.count,
            usable: stat.count >= MIN_CATEGORY_SAMPLES,
        })
        .collect();

    Json(CategoriesResponse {
        global_median_markup: state.snapshot.global_median(),
        min_samples: MIN_CATEGORY_SAMPLES,
        categories,
    })
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let last = state.health.last_prediction_at_ns();
    let secs_since_last_prediction =
        (last > 0).then(|| now_ns().saturating_sub(last) as f64 / 1_000_000_000.0);

    Json(HealthResponse {
        status: "ok",
        listings: state.snapshot.listing_count(),
        categories: state.snapshot.category_count(),
        predictions_served: state.health.predictions_served(),
        journal_queue_pending: state.health.journal_queue_pending(),
        secs_since_last_prediction,
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<PredictionLatencyReport> {
    Json(state.latency.report())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Request-boundary price check. The estimator is only defined for positive,
/// finite prices.
fn validate_price(input: Option<&PriceInput>) -> Result<f64, AppError> {
    let price = match input {
        None => return Err(AppError::Validation("original_price is required".to_string())),
        Some(PriceInput::Number(v)) => *v,
        Some(PriceInput::Text(s)) => s.trim().replace(',', "").parse::<f64>().map_err(|_| {
            AppError::Validation(format!("original_price must be a number, got {s:?}"))
        })?,
    };
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::Validation(
            "original_price must be greater than 0".to_string(),
        ));
    }
    Ok(price)
}

/// Explicit category first, then a name match against the dataset.
fn resolve_category(snapshot: &PriceSnapshot, req: &PredictionRequest) -> Option<String> {
    if let Some(category) = req
        .main_category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        return Some(category.to_string());
    }
    req.product_name
        .as_deref()
        .and_then(|name| snapshot.infer_category(name))
        .map(str::to_string)
}

fn round_money(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
