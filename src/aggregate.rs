// 📊 Audit Aggregator
// Canonical room records → nightly performance summary

use crate::ingest::CanonicalRoomRecord;
use serde::{Deserialize, Serialize};

/// Per room-type row of the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTypeBreakdown {
    #[serde(rename = "Room Type")]
    pub room_type: String,
    #[serde(rename = "Total_Rooms")]
    pub total: usize,
    #[serde(rename = "Occupied_Rooms")]
    pub occupied: usize,
    /// Mean over every room of the type, occupied or not
    #[serde(rename = "Average_Rate")]
    pub avg_rate: f64,
}

/// Nightly performance summary
///
/// `average_rate` averages occupied rooms only, while each breakdown row
/// averages all rooms of its type. Both are kept as the persisted history
/// has always stored them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_rooms: usize,
    pub occupied_rooms: usize,
    pub vacant_rooms: usize,
    pub average_rate: f64,
    pub total_revenue: f64,
    pub adr: f64,
    pub occupancy_pct: u32,
    pub currency_symbol: String,
    pub room_type_breakdown: Vec<RoomTypeBreakdown>,
}

/// Persisted `summary_data` blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryJson {
    #[serde(rename = "Total_Rooms")]
    pub total_rooms: usize,
    #[serde(rename = "Occupied")]
    pub occupied: usize,
    #[serde(rename = "Vacant")]
    pub vacant: usize,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "ADR")]
    pub adr: f64,
    #[serde(rename = "Average_Rate")]
    pub average_rate: f64,
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_symbol() -> String {
    "$".to_string()
}

impl AuditSummary {
    pub fn has_no_occupancy(&self) -> bool {
        self.occupied_rooms == 0
    }

    pub fn summary_json(&self) -> SummaryJson {
        SummaryJson {
            total_rooms: self.total_rooms,
            occupied: self.occupied_rooms,
            vacant: self.vacant_rooms,
            revenue: self.total_revenue,
            adr: self.adr,
            average_rate: self.average_rate,
            symbol: self.currency_symbol.clone(),
        }
    }

    pub fn to_summary_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.summary_json())
    }

    /// Breakdown array, or None when there are no rooms
    pub fn room_breakdown_json(&self) -> serde_json::Result<Option<String>> {
        if self.room_type_breakdown.is_empty() {
            return Ok(None);
        }
        serde_json::to_string(&self.room_type_breakdown).map(Some)
    }

    /// Rebuild a summary from its persisted blobs
    pub fn from_summary_json(summary: &str, breakdown: Option<&str>) -> serde_json::Result<Self> {
        let s: SummaryJson = serde_json::from_str(summary)?;
        let room_type_breakdown = match breakdown {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(json)?,
            _ => Vec::new(),
        };

        Ok(AuditSummary {
            total_rooms: s.total_rooms,
            occupied_rooms: s.occupied,
            vacant_rooms: s.vacant,
            average_rate: s.average_rate,
            total_revenue: s.revenue,
            adr: s.adr,
            occupancy_pct: occupancy_pct(s.occupied, s.total_rooms),
            currency_symbol: s.symbol,
            room_type_breakdown,
        })
    }
}

/// floor(100 * occupied / total), 0 for an empty property
pub fn occupancy_pct(occupied: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((occupied.min(total) * 100) / total) as u32
}

/// Reduce canonical records to the nightly summary
pub fn summarize(records: &[CanonicalRoomRecord], currency_symbol: &str) -> AuditSummary {
    let total_rooms = records.len();
    let occupied: Vec<&CanonicalRoomRecord> = records.iter().filter(|r| r.occupied).collect();
    let occupied_rooms = occupied.len();

    let total_revenue: f64 = occupied.iter().map(|r| r.rate).sum();
    let (average_rate, adr) = if occupied_rooms > 0 {
        let mean = total_revenue / occupied_rooms as f64;
        (mean, mean)
    } else {
        (0.0, 0.0)
    };

    AuditSummary {
        total_rooms,
        occupied_rooms,
        vacant_rooms: total_rooms - occupied_rooms,
        average_rate,
        total_revenue,
        adr,
        occupancy_pct: occupancy_pct(occupied_rooms, total_rooms),
        currency_symbol: currency_symbol.to_string(),
        room_type_breakdown: breakdown(records),
    }
}

// Groups in first-seen order
fn breakdown(records: &[CanonicalRoomRecord]) -> Vec<RoomTypeBreakdown> {
    let mut groups: Vec<(RoomTypeBreakdown, f64)> = Vec::new();

    for record in records {
        let pos = match groups.iter().position(|(g, _)| g.room_type == record.room_type) {
            Some(pos) => pos,
            None => {
                groups.push((
                    RoomTypeBreakdown {
                        room_type: record.room_type.clone(),
                        total: 0,
                        occupied: 0,
                        avg_rate: 0.0,
                    },
                    0.0,
                ));
                groups.len() - 1
            }
        };

        let (group, rate_sum) = &mut groups[pos];
        group.total += 1;
        if record.occupied {
            group.occupied += 1;
        }
        *rate_sum += record.rate;
    }

    groups
        .into_iter()
        .map(|(mut group, rate_sum)| {
            group.avg_rate = rate_sum / group.total as f64;
            group
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooms() -> Vec<CanonicalRoomRecord> {
        vec![
            CanonicalRoomRecord::new("Deluxe", true, 100.0),
            CanonicalRoomRecord::new("Suite", false, 300.0),
            CanonicalRoomRecord::new("Deluxe", false, 80.0),
            CanonicalRoomRecord::new("Suite", true, 250.0),
            CanonicalRoomRecord::new("Standard", true, 60.0),
        ]
    }

    #[test]
    fn test_summarize_counts_and_revenue() {
        let summary = summarize(&rooms(), "$");

        assert_eq!(summary.total_rooms, 5);
        assert_eq!(summary.occupied_rooms, 3);
        assert_eq!(summary.vacant_rooms, 2);
        assert_eq!(summary.total_revenue, 410.0);
        assert!((summary.adr - 136.666_666).abs() < 1e-4);
        assert_eq!(summary.average_rate, summary.adr);
        assert_eq!(summary.occupancy_pct, 60);
        assert_eq!(summary.currency_symbol, "$");
    }

    #[test]
    fn test_occupancy_pct_floors() {
        assert_eq!(occupancy_pct(2, 3), 66);
        assert_eq!(occupancy_pct(1, 3), 33);
        assert_eq!(occupancy_pct(3, 3), 100);
        assert_eq!(occupancy_pct(0, 0), 0);
    }

    #[test]
    fn test_empty_property_has_zeros_not_nan() {
        let summary = summarize(&[], "€");
        assert_eq!(summary.total_rooms, 0);
        assert_eq!(summary.occupancy_pct, 0);
        assert_eq!(summary.adr, 0.0);
        assert_eq!(summary.average_rate, 0.0);
        assert!(summary.room_type_breakdown.is_empty());
        assert!(summary.has_no_occupancy());
    }

    #[test]
    fn test_no_occupied_rooms() {
        let records = vec![CanonicalRoomRecord::new("Deluxe", false, 120.0)];
        let summary = summarize(&records, "$");
        assert_eq!(summary.adr, 0.0);
        assert_eq!(summary.total_revenue, 0.0);
        assert_eq!(summary.room_type_breakdown[0].avg_rate, 120.0);
        assert!(summary.has_no_occupancy());
    }

    #[test]
    fn test_breakdown_keeps_first_seen_order_and_averages_all_rows() {
        let summary = summarize(&rooms(), "$");
        let types: Vec<&str> = summary
            .room_type_breakdown
            .iter()
            .map(|b| b.room_type.as_str())
            .collect();
        assert_eq!(types, vec!["Deluxe", "Suite", "Standard"]);

        let deluxe = &summary.room_type_breakdown[0];
        assert_eq!(deluxe.total, 2);
        assert_eq!(deluxe.occupied, 1);
        assert_eq!(deluxe.avg_rate, 90.0);

        let totals: usize = summary.room_type_breakdown.iter().map(|b| b.total).sum();
        let occupied: usize = summary.room_type_breakdown.iter().map(|b| b.occupied).sum();
        assert_eq!(totals, summary.total_rooms);
        assert_eq!(occupied, summary.occupied_rooms);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = summarize(&rooms(), "AED");
        let json: serde_json::Value = serde_json::from_str(&summary.to_summary_json().unwrap()).unwrap();
        assert_eq!(json["Total_Rooms"], 5);
        assert_eq!(json["Occupied"], 3);
        assert_eq!(json["Vacant"], 2);
        assert_eq!(json["Revenue"], 410.0);
        assert_eq!(json["symbol"], "AED");

        let rooms_json = summary.room_breakdown_json().unwrap().unwrap();
        let rooms: serde_json::Value = serde_json::from_str(&rooms_json).unwrap();
        assert_eq!(rooms[0]["Room Type"], "Deluxe");
        assert_eq!(rooms[0]["Occupied_Rooms"], 1);
    }

    #[test]
    fn test_from_summary_json_restores_summary() {
        let summary = summarize(&rooms(), "£");
        let restored = AuditSummary::from_summary_json(
            &summary.to_summary_json().unwrap(),
            summary.room_breakdown_json().unwrap().as_deref(),
        )
        .unwrap();
        assert_eq!(restored, summary);
    }

    #[test]
    fn test_from_summary_json_without_symbol() {
        let json = r#"{"Total_Rooms":4,"Occupied":1,"Vacant":3,"Revenue":90.0,"ADR":90.0,"Average_Rate":90.0}"#;
        let summary = AuditSummary::from_summary_json(json, None).unwrap();
        assert_eq!(summary.currency_symbol, "$");
        assert_eq!(summary.occupancy_pct, 25);
        assert!(summary.room_type_breakdown.is_empty());
    }
}
