pub mod health;
pub mod readings;

pub use health::health_check;
pub use readings::{create_reading, export_readings, get_readings};
