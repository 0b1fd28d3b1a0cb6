use hostel_store::{
    EntityStore, EntityType, ExportFormat, FilterOperator, FilterValue, ListOptions, SortOrder, StoreError,
};
use serde_json::{json, Value};

fn store() -> EntityStore {
    EntityStore::with_builtin_schemas().unwrap()
}

fn seeded() -> EntityStore {
    EntityStore::from_dataset(hostel_store::seed::sample().unwrap()).unwrap()
}

fn room(number: &str, status: &str, rent: u64) -> Value {
    json!({
        "hostelId": "h1",
        "floorId": "f1",
        "roomNumber": number,
        "type": "double",
        "occupancy": { "currentOccupancy": 0, "maxOccupancy": 2 },
        "pricing": { "baseRent": rent },
        "availability": { "status": status }
    })
}

fn ids(items: &[Value]) -> Vec<&str> {
    items.iter().map(|r| r["id"].as_str().unwrap()).collect()
}

#[test]
fn created_record_reads_back_unchanged() {
    let mut s = store();
    let created = s.create(EntityType::Room, room("101", "available", 4000)).unwrap();
    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(created["timestamps"]["createdAt"], created["timestamps"]["updatedAt"]);
    assert_eq!(s.read(EntityType::Room, id).unwrap(), created);
}

#[test]
fn update_overwrites_top_level_keys_and_moves_updated_at() {
    let mut s = store();
    let created = s.create(EntityType::Room, room("101", "available", 4000)).unwrap();
    let id = created["id"].as_str().unwrap();

    let updated = s
        .update(EntityType::Room, id, json!({ "availability": { "status": "reserved" } }))
        .unwrap();
    assert_eq!(updated["availability"], json!({ "status": "reserved" }));
    assert_eq!(updated["roomNumber"], "101");
    assert_eq!(updated["timestamps"]["createdAt"], created["timestamps"]["createdAt"]);
    let before = created["timestamps"]["updatedAt"].as_str().unwrap();
    let after = updated["timestamps"]["updatedAt"].as_str().unwrap();
    assert!(after > before, "{} should be after {}", after, before);
}

#[test]
fn deleted_record_is_gone() {
    let mut s = store();
    let created = s.create(EntityType::Room, room("101", "available", 4000)).unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    s.delete(EntityType::Room, &id).unwrap();
    assert!(matches!(s.read(EntityType::Room, &id), Err(StoreError::NotFound { .. })));
    assert!(matches!(s.delete(EntityType::Room, &id), Err(StoreError::NotFound { .. })));
}

#[test]
fn invalid_hostel_reports_every_violation_in_rule_order() {
    let mut s = store();
    let err = s.create(EntityType::Hostel, json!({ "name": "A" })).unwrap_err();
    assert_eq!(
        err.violations(),
        &[
            "Hostel name must be at least 2 characters long".to_string(),
            "Location is required".to_string(),
            "Capacity is required".to_string(),
            "Contact is required".to_string(),
        ]
    );
    assert!(s.is_empty());
}

#[test]
fn status_filter_uses_nested_availability() {
    let s = seeded();
    let result = s
        .list(
            EntityType::Room,
            &ListOptions::new().filter("status", FilterValue::eq("available")),
        )
        .unwrap();
    assert_eq!(ids(&result.items), vec!["room-201", "room-202", "room-203", "room-h11"]);
    assert_eq!(result.pagination.total, 4);
}

#[test]
fn second_page_of_seven() {
    let mut s = store();
    for n in 0..7 {
        s.create(EntityType::Room, room(&format!("R{}", n), "available", 1000 + n))
            .unwrap();
    }
    let all = s.list(EntityType::Room, &ListOptions::new()).unwrap().items;
    let page = s
        .list(EntityType::Room, &ListOptions::new().paginate(2, 3))
        .unwrap();
    assert_eq!(page.items, all[3..6].to_vec());
    assert_eq!(page.pagination.total, 7);
    assert_eq!(page.pagination.total_pages, 3);

    let last = s
        .list(EntityType::Room, &ListOptions::new().paginate(3, 3))
        .unwrap();
    assert_eq!(last.items.len(), 1);
}

#[test]
fn search_filter_and_sort_compose() {
    let s = seeded();
    let result = s
        .list(
            EntityType::Room,
            &ListOptions::new()
                .filter("rent", FilterValue::op(FilterOperator::Gte, 4500))
                .search("double")
                .sort_by("rent", SortOrder::Desc),
        )
        .unwrap();
    assert_eq!(ids(&result.items), vec!["room-h11", "room-102", "room-103", "room-201"]);
}

#[test]
fn unknown_filter_field_is_rejected() {
    let s = seeded();
    let err = s
        .list(EntityType::Room, &ListOptions::new().filter("colour", FilterValue::eq("blue")))
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownField { .. }));
}

#[test]
fn bulk_update_keeps_successful_items() {
    let mut s = store();
    let mut room_ids = Vec::new();
    for n in 0..5 {
        let r = s.create(EntityType::Room, room(&format!("B{}", n), "available", 3000)).unwrap();
        room_ids.push(r["id"].as_str().unwrap().to_string());
    }
    let items = room_ids
        .iter()
        .enumerate()
        .map(|(i, id)| hostel_store::BulkUpdateItem {
            id: if i == 2 { "missing".to_string() } else { id.clone() },
            data: json!({ "availability": { "status": "maintenance" } }),
        })
        .collect();

    let report = s.bulk_update(EntityType::Room, items);
    assert!(!report.success);
    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.results[2].error.as_ref().unwrap().code, "not_found");

    let maintenance = s
        .list(
            EntityType::Room,
            &ListOptions::new().filter("status", FilterValue::eq("maintenance")),
        )
        .unwrap();
    assert_eq!(maintenance.items.len(), 4);
}

#[test]
fn json_export_round_trips_collection() {
    let s = seeded();
    let file = s.export(EntityType::Amenity, ExportFormat::Json).unwrap();
    assert!(file.file_name.starts_with("amenities_"));
    assert!(file.file_name.ends_with(".json"));
    let parsed: Vec<Value> = serde_json::from_str(&file.content).unwrap();
    assert_eq!(parsed, s.collection(EntityType::Amenity).to_vec());
}

#[test]
fn csv_export_flattens_nested_fields() {
    let s = seeded();
    let file = s.export_as(EntityType::Floor, "csv").unwrap();
    let header = file.content.lines().next().unwrap();
    assert!(header.starts_with("\"id\",\"hostelId\",\"floorNumber\""));
    assert!(header.contains("\"capacity.totalRooms\""));
    assert_eq!(file.content.lines().count(), 1 + s.len(EntityType::Floor));
    assert!(matches!(
        s.export_as(EntityType::Floor, "xml"),
        Err(StoreError::UnsupportedFormat(_))
    ));
}

#[test]
fn statistics_for_seeded_hostel() {
    let s = seeded();
    let stats = s.hostel_statistics("hostel-sunrise");
    assert_eq!(stats.total_floors, 2);
    assert_eq!(stats.total_rooms, 6);
    assert_eq!(stats.occupied_rooms, 2);
    assert_eq!(stats.available_rooms, 3);
    assert_eq!(stats.maintenance_rooms, 1);
    assert_eq!(stats.total_amenities, 3);
    assert!((stats.occupancy_rate - 2.0 / 6.0).abs() < 1e-9);
    assert!((stats.average_rent - 5100.0).abs() < 1e-9);
    assert!((stats.monthly_revenue - 11300.0).abs() < 1e-9);

    let empty = s.hostel_statistics("nowhere");
    assert_eq!(empty.total_rooms, 0);
    assert_eq!(empty.occupancy_rate, 0.0);
}
