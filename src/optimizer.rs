// 📈 Rate Optimizer
// 30-day performance summary and annual revenue projection

use crate::forecast::{window_start, RateHistoryEntry, Trend};
use crate::pricing::round2;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const OPTIMIZER_WINDOW_DAYS: i64 = 30;
const REDUCE_BELOW_PCT: f64 = 40.0;
const INCREASE_ABOVE_PCT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Reduce,
    Maintain,
    Increase,
}

impl Recommendation {
    pub fn from_occupancy(avg_occupancy_pct: f64) -> Self {
        if avg_occupancy_pct < REDUCE_BELOW_PCT {
            Recommendation::Reduce
        } else if avg_occupancy_pct > INCREASE_ABOVE_PCT {
            Recommendation::Increase
        } else {
            Recommendation::Maintain
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Recommendation::Reduce => {
                "Low occupancy trend. Consider reducing base rates to stay competitive."
            }
            Recommendation::Maintain => "Occupancy stable. Maintain current pricing strategy.",
            Recommendation::Increase => {
                "High occupancy trend. You may consider increasing rates to maximize revenue."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSummary {
    pub sample_count: usize,
    pub avg_rate: f64,
    /// None when no entry in the window recorded occupancy
    pub avg_occupancy_pct: Option<f64>,
    pub rate_trend: Trend,
    pub occupancy_trend: Trend,
    pub recommendation: Recommendation,
}

impl OptimizerSummary {
    pub fn projected_revenue(&self, occupancy_pct: f64, rooms: u32) -> f64 {
        project_annual_revenue(self.avg_rate, occupancy_pct, rooms)
    }
}

/// round(avg_rate × occupancy × rooms × 365), whole currency units
pub fn project_annual_revenue(avg_rate: f64, occupancy_pct: f64, rooms: u32) -> f64 {
    (avg_rate * (occupancy_pct / 100.0) * rooms as f64 * 365.0).round()
}

fn trend(first: Option<f64>, last: Option<f64>) -> Trend {
    match (first, last) {
        (Some(first), Some(last)) if last > first => Trend::Rising,
        _ => Trend::Falling,
    }
}

/// Summarize the last 30 days of rate history; None when the window is empty
pub fn summarize_history(history: &[RateHistoryEntry], now: NaiveDateTime) -> Option<OptimizerSummary> {
    let start = window_start(now, OPTIMIZER_WINDOW_DAYS);
    let mut window: Vec<&RateHistoryEntry> = history
        .iter()
        .filter(|e| e.timestamp >= start && e.suggested_rate.is_finite())
        .collect();
    if window.is_empty() {
        return None;
    }
    window.sort_by_key(|e| e.timestamp);

    let avg_rate = round2(window.iter().map(|e| e.suggested_rate).sum::<f64>() / window.len() as f64);

    let occupancy: Vec<f64> = window.iter().filter_map(|e| e.occupancy_pct).collect();
    let avg_occupancy_pct = if occupancy.is_empty() {
        None
    } else {
        Some(round2(occupancy.iter().sum::<f64>() / occupancy.len() as f64))
    };

    Some(OptimizerSummary {
        sample_count: window.len(),
        avg_rate,
        avg_occupancy_pct,
        rate_trend: trend(
            window.first().map(|e| e.suggested_rate),
            window.last().map(|e| e.suggested_rate),
        ),
        occupancy_trend: trend(occupancy.first().copied(), occupancy.last().copied()),
        recommendation: avg_occupancy_pct
            .map(Recommendation::from_occupancy)
            .unwrap_or(Recommendation::Maintain),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::HISTORY_TIMESTAMP_FORMAT;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, HISTORY_TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_empty_window() {
        let history = vec![RateHistoryEntry::new(at("2025-03-01 10:00:00"), 100.0)];
        assert_eq!(summarize_history(&history, at("2025-04-25 12:00:00")), None);
    }

    #[test]
    fn test_summary_sorts_before_trend() {
        let history = vec![
            RateHistoryEntry::new(at("2025-04-20 10:00:00"), 140.0).with_occupancy(90.0),
            RateHistoryEntry::new(at("2025-04-01 10:00:00"), 100.0).with_occupancy(30.0),
            RateHistoryEntry::new(at("2025-04-10 10:00:00"), 121.0),
        ];
        let summary = summarize_history(&history, at("2025-04-25 12:00:00")).unwrap();

        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.avg_rate, 120.33);
        assert_eq!(summary.avg_occupancy_pct, Some(60.0));
        assert_eq!(summary.rate_trend, Trend::Rising);
        assert_eq!(summary.occupancy_trend, Trend::Rising);
        assert_eq!(summary.recommendation, Recommendation::Maintain);
    }

    #[test]
    fn test_recommendation_bands() {
        assert_eq!(Recommendation::from_occupancy(39.9), Recommendation::Reduce);
        assert_eq!(Recommendation::from_occupancy(40.0), Recommendation::Maintain);
        assert_eq!(Recommendation::from_occupancy(80.0), Recommendation::Maintain);
        assert_eq!(Recommendation::from_occupancy(80.1), Recommendation::Increase);
    }

    #[test]
    fn test_no_occupancy_recorded_defaults_to_maintain() {
        let history = vec![RateHistoryEntry::new(at("2025-04-24 10:00:00"), 100.0)];
        let summary = summarize_history(&history, at("2025-04-25 12:00:00")).unwrap();
        assert_eq!(summary.avg_occupancy_pct, None);
        assert_eq!(summary.recommendation, Recommendation::Maintain);
        assert_eq!(summary.rate_trend, Trend::Falling);
    }

    #[test]
    fn test_annual_revenue_projection() {
        assert_eq!(project_annual_revenue(100.0, 75.0, 60), 1_642_500.0);
        assert_eq!(project_annual_revenue(0.0, 75.0, 60), 0.0);
    }
}
