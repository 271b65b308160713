// 🎯 Confidence Scorer
// How much of the pricing input was actually supplied, as a 0-100 score

use serde::{Deserialize, Serialize};

const OCCUPANCY_POINTS: u8 = 20;
const COMPETITOR_POINTS: u8 = 20;
const SALEABLE_POINTS: u8 = 10;
const DAY_TYPE_POINTS: u8 = 10;
const EVENT_POINTS: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    /// >= 80 High, >= 50 Medium, else Low
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ConfidenceBand::High
        } else if score >= 50 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    /// Forecast confidence from the number of samples it was built on
    pub fn from_samples(count: usize) -> Self {
        if count >= 10 {
            ConfidenceBand::High
        } else if count >= 5 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ConfidenceBand::High => "High",
            ConfidenceBand::Medium => "Medium",
            ConfidenceBand::Low => "Low",
        }
    }
}

/// Which pieces of pricing input are present
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfidenceSignals {
    pub total_rooms: u32,
    pub competitor_rate: f64,
    pub saleable_rooms: u32,
    pub event_today: bool,
    pub holiday_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    pub score: u8,
    pub band: ConfidenceBand,
    pub reasons: Vec<String>,
}

/// Score the signals. Day type always contributes but has no reason line.
pub fn score_confidence(signals: &ConfidenceSignals) -> ConfidenceScore {
    let mut score = 0u8;
    let mut reasons = Vec::new();

    if signals.total_rooms > 0 {
        score += OCCUPANCY_POINTS;
        reasons.push("Occupancy data available".to_string());
    }
    if signals.competitor_rate > 0.0 {
        score += COMPETITOR_POINTS;
        reasons.push("Competitor rate provided".to_string());
    }
    if signals.saleable_rooms > 0 {
        score += SALEABLE_POINTS;
        reasons.push("Saleable room data present".to_string());
    }
    score += DAY_TYPE_POINTS;
    if signals.event_today || signals.holiday_today {
        score += EVENT_POINTS;
        reasons.push("Event or holiday noted".to_string());
    }

    ConfidenceScore {
        score,
        band: ConfidenceBand::from_score(score),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> ConfidenceSignals {
        ConfidenceSignals {
            total_rooms: 50,
            competitor_rate: 120.0,
            saleable_rooms: 12,
            event_today: true,
            holiday_today: false,
        }
    }

    #[test]
    fn test_all_signals_score_80() {
        let result = score_confidence(&full());
        assert_eq!(result.score, 80);
        assert_eq!(result.band, ConfidenceBand::High);
        assert_eq!(
            result.reasons,
            vec![
                "Occupancy data available",
                "Competitor rate provided",
                "Saleable room data present",
                "Event or holiday noted",
            ]
        );
    }

    #[test]
    fn test_no_signals_still_counts_day_type() {
        let result = score_confidence(&ConfidenceSignals::default());
        assert_eq!(result.score, 10);
        assert_eq!(result.band, ConfidenceBand::Low);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_typical_weekday_is_medium() {
        let signals = ConfidenceSignals { event_today: false, ..full() };
        let result = score_confidence(&signals);
        assert_eq!(result.score, 60);
        assert_eq!(result.band, ConfidenceBand::Medium);
    }

    #[test]
    fn test_holiday_counts_like_event() {
        let signals = ConfidenceSignals { event_today: false, holiday_today: true, ..full() };
        assert_eq!(score_confidence(&signals).score, 80);
    }

    #[test]
    fn test_adding_a_signal_never_lowers_the_score() {
        // Every combination of the five boolean signals
        for mask in 0u8..32 {
            let signals = |m: u8| ConfidenceSignals {
                total_rooms: if m & 1 != 0 { 10 } else { 0 },
                competitor_rate: if m & 2 != 0 { 100.0 } else { 0.0 },
                saleable_rooms: if m & 4 != 0 { 5 } else { 0 },
                event_today: m & 8 != 0,
                holiday_today: m & 16 != 0,
            };
            let base = score_confidence(&signals(mask));
            for bit in 0..5 {
                let more = score_confidence(&signals(mask | (1 << bit)));
                assert!(more.score >= base.score, "mask {} bit {}", mask, bit);
                assert!(more.band >= base.band);
            }
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(ConfidenceBand::from_score(50), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_score(49), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::from_samples(10), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_samples(5), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_samples(4), ConfidenceBand::Low);
    }
}
