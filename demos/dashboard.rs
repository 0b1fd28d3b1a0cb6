//! Dashboard demo: seeds a store from env config, prints per-hostel statistics,
//! checks a resident in and writes room exports to the export directory.

use hostel_store::{
    DataService, EntityType, ExportFormat, FilterValue, ListOptions, SortOrder, StoreConfig,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hostel_store=info".parse()?))
        .init();

    let config = StoreConfig::from_env();
    let service = DataService::new(config.build_store()?);

    let hostels = service
        .list(EntityType::Hostel, &ListOptions::new().sort_by("name", SortOrder::Asc))
        .await
        .into_result()?;
    for hostel in &hostels {
        let id = hostel["id"].as_str().unwrap_or_default();
        let stats = service.hostel_statistics(id).await.into_result()?;
        println!(
            "{:<28} floors={} rooms={} occupied={} available={} maintenance={} occupancy={:.0}% avg rent={:.2} revenue={:.2}",
            hostel["name"].as_str().unwrap_or(id),
            stats.total_floors,
            stats.total_rooms,
            stats.occupied_rooms,
            stats.available_rooms,
            stats.maintenance_rooms,
            stats.occupancy_rate * 100.0,
            stats.average_rent,
            stats.monthly_revenue,
        );
    }

    let open = service
        .list(
            EntityType::Room,
            &ListOptions::new()
                .filter("status", FilterValue::eq("available"))
                .sort_by("rent", SortOrder::Asc)
                .paginate(1, 5),
        )
        .await;
    for notice in &open.notices {
        tracing::info!(level = ?notice.level, "{}", notice.message);
    }
    if let Some(room) = open.data.as_ref().and_then(|rooms| rooms.first()) {
        let room_id = room["id"].as_str().unwrap_or_default().to_string();
        let change = service
            .check_in(&room_id, json!({ "name": "Demo Resident", "email": "demo@example.com" }))
            .await;
        for notice in &change.notices {
            tracing::info!(level = ?notice.level, "{}", notice.message);
        }
    }

    for format in [ExportFormat::Csv, ExportFormat::Json] {
        let written = service
            .export_to_dir(EntityType::Room, format, &config.export_dir)
            .await
            .into_result()?;
        println!("wrote {}", written.display());
    }
    Ok(())
}
