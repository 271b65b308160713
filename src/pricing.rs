// 💵 Rate Suggestion Engine
// Competitor rate → suggested nightly rate through ordered, compounding adjustments
//
// Each step is a percentage of the CURRENT rate, not of the competitor rate:
//   occupancy → weekend → event → holiday → inventory
// Rounding to cents happens once, on the final rate.

use crate::confidence::{score_confidence, ConfidenceBand, ConfidenceSignals};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Round to 2 decimal places (half away from zero)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// PRICING RULES
// ============================================================================

/// Thresholds and magnitudes for every adjustment step
///
/// Percentages are signed fractions (`-0.10` = −10%). Every field has a serde
/// default so a config file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    pub low_occupancy_below: f64,
    pub low_occupancy_pct: f64,
    pub high_occupancy_above: f64,
    pub high_occupancy_pct: f64,
    pub weekend_pct: f64,
    pub event_pct: f64,
    pub holiday_pct: f64,
    pub low_inventory_below: u32,
    pub low_inventory_pct: f64,
    pub high_inventory_above: u32,
    pub high_inventory_pct: f64,
    pub single_tier: f64,
    pub double_tier: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        PricingRules {
            low_occupancy_below: 0.40,
            low_occupancy_pct: -0.10,
            high_occupancy_above: 0.80,
            high_occupancy_pct: 0.10,
            weekend_pct: 0.12,
            event_pct: 0.15,
            holiday_pct: 0.10,
            low_inventory_below: 10,
            low_inventory_pct: 0.08,
            high_inventory_above: 50,
            high_inventory_pct: -0.05,
            single_tier: 0.80,
            double_tier: 0.90,
        }
    }
}

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayType {
    #[default]
    Weekday,
    Weekend,
}

impl DayType {
    /// Saturday and Sunday are weekend nights
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DayType::Weekday => "Weekday",
            DayType::Weekend => "Weekend",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekday" => Ok(DayType::Weekday),
            "weekend" => Ok(DayType::Weekend),
            other => Err(format!("unknown day type: {}", other)),
        }
    }
}

/// Tonight's room counts as entered by the front desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomInventory {
    pub total_rooms: u32,
    pub out_of_order: u32,
    pub dirty_rooms: u32,
    pub occupied_rooms: u32,
}

impl RoomInventory {
    /// Clean, vacant and in order
    pub fn available(&self) -> u32 {
        self.total_rooms
            .saturating_sub(self.out_of_order)
            .saturating_sub(self.dirty_rooms)
            .saturating_sub(self.occupied_rooms)
    }

    /// Available plus dirty/checkout rooms; out-of-order never counts
    pub fn saleable(&self) -> u32 {
        self.available() + self.dirty_rooms
    }

    pub fn occupancy_ratio(&self) -> f64 {
        if self.total_rooms == 0 {
            return 0.0;
        }
        self.occupied_rooms as f64 / self.total_rooms as f64
    }

    /// Whole percent, floored
    pub fn occupancy_pct(&self) -> u32 {
        (self.occupancy_ratio() * 100.0) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateSuggestionInput {
    pub competitor_rate: f64,
    /// Occupied / total, in [0, 1]
    pub occupancy_ratio: f64,
    pub saleable_rooms: u32,
    pub day_type: DayType,
    pub event_today: bool,
    pub holiday_today: bool,
    pub total_rooms: u32,
}

impl RateSuggestionInput {
    pub fn from_inventory(inventory: &RoomInventory, competitor_rate: f64, day_type: DayType) -> Self {
        RateSuggestionInput {
            competitor_rate,
            occupancy_ratio: inventory.occupancy_ratio(),
            saleable_rooms: inventory.saleable(),
            day_type,
            event_today: false,
            holiday_today: false,
            total_rooms: inventory.total_rooms,
        }
    }

    /// Builder pattern: mark a local event tonight
    pub fn with_event(mut self, event_today: bool) -> Self {
        self.event_today = event_today;
        self
    }

    /// Builder pattern: mark a holiday tonight
    pub fn with_holiday(mut self, holiday_today: bool) -> Self {
        self.holiday_today = holiday_today;
        self
    }

    pub fn confidence_signals(&self) -> ConfidenceSignals {
        ConfidenceSignals {
            total_rooms: self.total_rooms,
            competitor_rate: self.competitor_rate,
            saleable_rooms: self.saleable_rooms,
            event_today: self.event_today,
            holiday_today: self.holiday_today,
        }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentKind {
    LowOccupancy,
    HighOccupancy,
    Weekend,
    LocalEvent,
    Holiday,
    LowInventory,
    HighInventory,
}

impl AdjustmentKind {
    pub fn label(&self) -> &str {
        match self {
            AdjustmentKind::LowOccupancy => "Low occupancy",
            AdjustmentKind::HighOccupancy => "High occupancy",
            AdjustmentKind::Weekend => "Weekend",
            AdjustmentKind::LocalEvent => "Local event today",
            AdjustmentKind::Holiday => "Holiday",
            AdjustmentKind::LowInventory => "Low available rooms",
            AdjustmentKind::HighInventory => "High availability",
        }
    }
}

/// One applied step: signed amount and the signed fraction that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub label: String,
    pub delta: f64,
    pub pct: f64,
}

impl Adjustment {
    /// e.g. `Weekend (+12% = $ 13.20)`; the symbol is used verbatim
    pub fn reason(&self, symbol: &str) -> String {
        let sign = if self.pct < 0.0 { "−" } else { "+" };
        format!(
            "{} ({}{}% = {} {:.2})",
            self.label,
            sign,
            (self.pct.abs() * 100.0).round(),
            symbol,
            self.delta.abs()
        )
    }
}

/// Apply steps in order, each as a fraction of the running rate
///
/// Returns the unrounded final rate and the adjustment trail.
pub fn apply_adjustments(base: f64, steps: &[(AdjustmentKind, f64)]) -> (f64, Vec<Adjustment>) {
    let mut rate = base;
    let mut adjustments = Vec::with_capacity(steps.len());

    for (kind, pct) in steps {
        let delta = rate * pct;
        rate += delta;
        adjustments.push(Adjustment {
            kind: *kind,
            label: kind.label().to_string(),
            delta,
            pct: *pct,
        });
    }

    (rate, adjustments)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTiers {
    /// 1 room, 1 person
    pub single: f64,
    /// 1 room, 2 persons
    pub double: f64,
    /// Family room, same as the suggested rate
    pub family: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSuggestionResult {
    pub suggested_rate: f64,
    pub adjustments: Vec<Adjustment>,
    pub confidence_score: u8,
    pub confidence_band: ConfidenceBand,
    pub confidence_reasons: Vec<String>,
    pub tiers: RoomTiers,
}

impl RateSuggestionResult {
    pub fn reasons(&self, symbol: &str) -> Vec<String> {
        self.adjustments.iter().map(|a| a.reason(symbol)).collect()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct RateEngine {
    rules: PricingRules,
}

impl RateEngine {
    pub fn new() -> Self {
        Self::with_rules(PricingRules::default())
    }

    pub fn with_rules(rules: PricingRules) -> Self {
        RateEngine { rules }
    }

    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Which steps fire for this input, in application order
    pub fn plan(&self, input: &RateSuggestionInput) -> Vec<(AdjustmentKind, f64)> {
        let r = &self.rules;
        let mut steps = Vec::new();

        if input.occupancy_ratio < r.low_occupancy_below {
            steps.push((AdjustmentKind::LowOccupancy, r.low_occupancy_pct));
        } else if input.occupancy_ratio > r.high_occupancy_above {
            steps.push((AdjustmentKind::HighOccupancy, r.high_occupancy_pct));
        }

        if input.day_type == DayType::Weekend {
            steps.push((AdjustmentKind::Weekend, r.weekend_pct));
        }
        if input.event_today {
            steps.push((AdjustmentKind::LocalEvent, r.event_pct));
        }
        if input.holiday_today {
            steps.push((AdjustmentKind::Holiday, r.holiday_pct));
        }

        if input.saleable_rooms < r.low_inventory_below {
            steps.push((AdjustmentKind::LowInventory, r.low_inventory_pct));
        } else if input.saleable_rooms > r.high_inventory_above {
            steps.push((AdjustmentKind::HighInventory, r.high_inventory_pct));
        }

        steps
    }

    /// Suggest tonight's rate. Deterministic: same input, same result.
    pub fn suggest(&self, input: &RateSuggestionInput) -> RateSuggestionResult {
        let base = input.competitor_rate.max(0.0);
        let (rate, adjustments) = apply_adjustments(base, &self.plan(input));
        let suggested_rate = round2(rate);

        let confidence = score_confidence(&input.confidence_signals());
        debug!(
            competitor_rate = base,
            suggested_rate,
            steps = adjustments.len(),
            confidence = confidence.score,
            "rate suggested"
        );

        RateSuggestionResult {
            suggested_rate,
            adjustments,
            confidence_score: confidence.score,
            confidence_band: confidence.band,
            confidence_reasons: confidence.reasons,
            tiers: RoomTiers {
                single: round2(suggested_rate * self.rules.single_tier),
                double: round2(suggested_rate * self.rules.double_tier),
                family: suggested_rate,
            },
        }
    }
}

impl Default for RateEngine {
    fn default() -> Self {
        Self::new()
    }
}
