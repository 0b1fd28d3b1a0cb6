//! Derived per-hostel statistics, recomputed from the collections on each call.

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostelStatistics {
    pub hostel_id: String,
    pub total_floors: usize,
    pub total_rooms: usize,
    pub occupied_rooms: usize,
    pub available_rooms: usize,
    pub maintenance_rooms: usize,
    pub total_amenities: usize,
    /// occupied / total, 0 when the hostel has no rooms.
    pub occupancy_rate: f64,
    pub average_rent: f64,
    /// Sum of base rent over occupied rooms.
    pub monthly_revenue: f64,
}

fn belongs_to(record: &Value, hostel_id: &str) -> bool {
    record.get("hostelId").and_then(Value::as_str) == Some(hostel_id)
}

fn room_status(room: &Value) -> Option<&str> {
    room.pointer("/availability/status").and_then(Value::as_str)
}

fn base_rent(room: &Value) -> f64 {
    room.pointer("/pricing/baseRent")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

pub fn hostel_statistics(hostel_id: &str, floors: &[Value], rooms: &[Value], amenities: &[Value]) -> HostelStatistics {
    let rooms: Vec<&Value> = rooms.iter().filter(|r| belongs_to(r, hostel_id)).collect();
    let count_status = |status: &str| rooms.iter().filter(|r| room_status(r) == Some(status)).count();

    let total_rooms = rooms.len();
    let occupied_rooms = count_status("occupied");
    let (occupancy_rate, average_rent) = if total_rooms == 0 {
        (0.0, 0.0)
    } else {
        let rent_sum: f64 = rooms.iter().map(|r| base_rent(r)).sum();
        (
            occupied_rooms as f64 / total_rooms as f64,
            rent_sum / total_rooms as f64,
        )
    };
    let monthly_revenue = rooms
        .iter()
        .filter(|r| room_status(r) == Some("occupied"))
        .map(|r| base_rent(r))
        .sum();

    HostelStatistics {
        hostel_id: hostel_id.to_string(),
        total_floors: floors.iter().filter(|f| belongs_to(f, hostel_id)).count(),
        total_rooms,
        occupied_rooms,
        available_rooms: count_status("available"),
        maintenance_rooms: count_status("maintenance"),
        total_amenities: amenities.iter().filter(|a| belongs_to(a, hostel_id)).count(),
        occupancy_rate,
        average_rent,
        monthly_revenue,
    }
}
