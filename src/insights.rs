// 💡 Audit Insights
// Human-readable advice derived from a nightly summary

use crate::aggregate::AuditSummary;
use serde::Serialize;

/// ADR thresholds by currency symbol; anything else uses DEFAULT_ADR_THRESHOLD
const ADR_THRESHOLDS: [(&str, f64); 8] = [
    ("Rs", 10000.0),
    ("AED", 500.0),
    ("₹", 5000.0),
    ("€", 150.0),
    ("£", 150.0),
    ("C$", 200.0),
    ("A$", 200.0),
    ("$", 200.0),
];

const DEFAULT_ADR_THRESHOLD: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OccupancyBand {
    High,
    Moderate,
    Low,
}

impl OccupancyBand {
    pub fn from_pct(pct: u32) -> Self {
        if pct >= 70 {
            OccupancyBand::High
        } else if pct >= 40 {
            OccupancyBand::Moderate
        } else {
            OccupancyBand::Low
        }
    }

    pub fn advice(&self, pct: u32) -> String {
        match self {
            OccupancyBand::High => format!("Great job! High occupancy today at {}%.", pct),
            OccupancyBand::Moderate => {
                format!("Moderate occupancy: {}%. Keep pushing promotions.", pct)
            }
            OccupancyBand::Low => {
                format!("Low occupancy today at {}%. Consider running special offers.", pct)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdrBand {
    Strong,
    Decent,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdrInsight {
    pub band: AdrBand,
    pub threshold: f64,
    pub message: String,
}

impl AdrInsight {
    pub fn evaluate(adr: f64, symbol: &str) -> Self {
        let threshold = adr_threshold(symbol);
        let amount = format_money(symbol, adr);

        let (band, message) = if adr > threshold {
            (AdrBand::Strong, format!("Strong ADR at {}. Well done!", amount))
        } else if adr > threshold * 0.7 {
            (AdrBand::Decent, format!("Decent ADR at {}. Room for improvement.", amount))
        } else {
            (
                AdrBand::Low,
                format!("ADR is slightly low ({}). Review your pricing strategies.", amount),
            )
        };

        AdrInsight { band, threshold, message }
    }
}

pub fn adr_threshold(symbol: &str) -> f64 {
    ADR_THRESHOLDS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, t)| *t)
        .unwrap_or(DEFAULT_ADR_THRESHOLD)
}

/// Share of rooms per type, in percent, in breakdown order
pub fn room_type_distribution(summary: &AuditSummary) -> Vec<(String, f64)> {
    let total: usize = summary.room_type_breakdown.iter().map(|b| b.total).sum();
    if total == 0 {
        return Vec::new();
    }

    summary
        .room_type_breakdown
        .iter()
        .map(|b| (b.room_type.clone(), b.total as f64 / total as f64 * 100.0))
        .collect()
}

/// "{symbol}{amount}" with thousands separators and 2 decimals
pub fn format_money(symbol: &str, amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, cents)
}
