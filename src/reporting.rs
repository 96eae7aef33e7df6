use serde::{Deserialize, Serialize};

/// Distribution of one per-tick metric over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub samples: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub last: f64,
}

/// Collects raw samples of one metric and summarises them on demand.
#[derive(Debug, Clone, Default)]
pub struct MetricAggregator {
    samples: Vec<f64>,
}

impl MetricAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.samples.push(value);
    }

    pub fn summary(&self) -> MetricSummary {
        let Some(&last) = self.samples.last() else {
            return MetricSummary::default();
        };
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);
        let total: f64 = sorted.iter().sum();

        MetricSummary {
            samples: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: total / sorted.len() as f64,
            median: nearest_rank(&sorted, 0.50),
            p95: nearest_rank(&sorted, 0.95),
            last,
        }
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let rank = (p.clamp(0.0, 1.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}
