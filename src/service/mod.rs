//! DataService: async result-envelope facade over the entity store.

mod crud;
pub mod occupancy;
mod validation;
pub use crud::DataService;
pub use occupancy::{check_in, check_out, OccupancyChange};
pub use validation::{validate_data, RecordValidator};
