// Storage models
pub mod reading;

pub use reading::{NewReadingRecord, ReadingRecord};
