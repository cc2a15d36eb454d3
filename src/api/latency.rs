//! Prediction handling latency, split by where the markup came from.
//! Category lookups and global fallbacks take different paths through the
//! snapshot, so each keeps its own histogram.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

use crate::types::MarkupSource;

/// Percentiles in microseconds for one markup source. `None` until sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LatencySummary {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionLatencyReport {
    pub category: LatencySummary,
    pub global: LatencySummary,
}

struct SourceHistograms {
    category: Histogram<u64>,
    global: Histogram<u64>,
}

impl SourceHistograms {
    fn for_source(&mut self, source: MarkupSource) -> &mut Histogram<u64> {
        match source {
            MarkupSource::Category => &mut self.category,
            MarkupSource::Global => &mut self.global,
        }
    }
}

/// Shared by the prediction handlers (write) and `/stats/latency` (read).
pub struct PredictionLatency {
    inner: Mutex<SourceHistograms>,
}

impl PredictionLatency {
    /// Tracks 1us to 100s, 3 significant figures.
    pub fn new() -> Self {
        let histogram = || -> Histogram<u64> {
            Histogram::new_with_bounds(1, 100_000_000, 3).expect("valid histogram bounds")
        };
        Self {
            inner: Mutex::new(SourceHistograms {
                category: histogram(),
                global: histogram(),
            }),
        }
    }

    /// Record one prediction. Sub-microsecond timings count as 1us.
    pub fn record_prediction(&self, elapsed: Duration, source: MarkupSource) {
        let us = elapsed.as_micros().clamp(1, u128::from(u64::MAX)) as u64;
        if let Ok(mut h) = self.inner.lock() {
            let _ = h.for_source(source).record(us);
        }
    }

    pub fn report(&self) -> PredictionLatencyReport {
        let Ok(h) = self.inner.lock() else {
            return PredictionLatencyReport {
                category: LatencySummary::default(),
                global: LatencySummary::default(),
            };
        };
        PredictionLatencyReport {
            category: summarize(&h.category),
            global: summarize(&h.global),
        }
    }

    /// Total predictions recorded across both sources.
    pub fn samples(&self) -> u64 {
        self.inner
            .lock()
            .map(|h| h.category.len() + h.global.len())
            .unwrap_or(0)
    }
}

impl Default for PredictionLatency {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(h: &Histogram<u64>) -> LatencySummary {
    if h.len() == 0 {
        return LatencySummary::default();
    }
    LatencySummary {
        samples: h.len(),
        p50_us: Some(h.value_at_quantile(0.5)),
        p95_us: Some(h.value_at_quantile(0.95)),
        p99_us: Some(h.value_at_quantile(0.99)),
    }
}
