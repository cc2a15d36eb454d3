use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PredictionRequest, PredictionResponse};

/// One line of the prediction journal: the request as received and the
/// response that was returned for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub input: PredictionRequest,
    pub result: PredictionResponse,
}

impl PredictionLogEntry {
    pub fn new(input: PredictionRequest, result: PredictionResponse) -> Self {
        Self {
            timestamp: Utc::now(),
            input,
            result,
        }
    }
}
