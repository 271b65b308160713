// 🔮 Trend Forecaster
// 3-day rate projection from the 7-day vs 14-day average of suggested rates

use crate::confidence::ConfidenceBand;
use crate::pricing::round2;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Timestamp layout of the rate-history log
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LONG_WINDOW_DAYS: i64 = 14;
const SHORT_WINDOW_DAYS: i64 = 7;
const TREND_SHIFT: f64 = 0.03;
const DAILY_STEP: f64 = 0.01;

/// One stored rate suggestion (read view of the rate-history log)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateHistoryEntry {
    pub timestamp: NaiveDateTime,
    pub suggested_rate: f64,
    /// Whole percent at the time of the suggestion, when it was recorded
    pub occupancy_pct: Option<f64>,
}

impl RateHistoryEntry {
    pub fn new(timestamp: NaiveDateTime, suggested_rate: f64) -> Self {
        RateHistoryEntry {
            timestamp,
            suggested_rate,
            occupancy_pct: None,
        }
    }

    pub fn with_occupancy(mut self, occupancy_pct: f64) -> Self {
        self.occupancy_pct = Some(occupancy_pct);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub projected_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Falling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub avg_7: f64,
    pub avg_14: f64,
    pub trend: Trend,
    pub sample_count: usize,
    pub confidence: ConfidenceBand,
    pub points: [ForecastPoint; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateForecast {
    /// No history in the last 14 days
    InsufficientData,
    Projected(ForecastReport),
}

impl RateForecast {
    pub fn report(&self) -> Option<&ForecastReport> {
        match self {
            RateForecast::Projected(report) => Some(report),
            RateForecast::InsufficientData => None,
        }
    }
}

/// Midnight `days` before `now`'s date
pub fn window_start(now: NaiveDateTime, days: i64) -> NaiveDateTime {
    (now.date() - Duration::days(days)).and_time(NaiveTime::MIN)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Project the next three nights from the history snapshot
///
/// `history` may be unsorted and may reach further back than 14 days; only
/// entries at or after midnight 14 days ago are used.
pub fn forecast(history: &[RateHistoryEntry], now: NaiveDateTime) -> RateForecast {
    let long_start = window_start(now, LONG_WINDOW_DAYS);
    let short_start = window_start(now, SHORT_WINDOW_DAYS);

    let window: Vec<&RateHistoryEntry> = history
        .iter()
        .filter(|e| e.timestamp >= long_start && e.suggested_rate.is_finite())
        .collect();
    if window.is_empty() {
        return RateForecast::InsufficientData;
    }

    let long: Vec<f64> = window.iter().map(|e| e.suggested_rate).collect();
    let short: Vec<f64> = window
        .iter()
        .filter(|e| e.timestamp >= short_start)
        .map(|e| e.suggested_rate)
        .collect();

    let avg_14 = round2(mean(&long));
    let avg_7 = round2(mean(&short));

    let trend = if avg_7 > avg_14 { Trend::Rising } else { Trend::Falling };
    let shift = match trend {
        Trend::Rising => TREND_SHIFT,
        Trend::Falling => -TREND_SHIFT,
    };
    let base = if avg_7 > 0.0 { avg_7 } else { avg_14 };

    let today = now.date();
    let point = |i: i64| ForecastPoint {
        date: today + Duration::days(i),
        projected_rate: round2(base * (1.0 + shift + DAILY_STEP * i as f64)),
    };

    RateForecast::Projected(ForecastReport {
        avg_7,
        avg_14,
        trend,
        sample_count: window.len(),
        confidence: ConfidenceBand::from_samples(window.len()),
        points: [1, 2, 3].map(point),
    })
}
