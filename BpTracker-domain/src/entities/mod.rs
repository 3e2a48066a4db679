// Domain entities and value objects
pub mod reading;
pub mod conversions;

// Re-export common types for easier imports
pub use reading::{CreateReadingRequest, Reading};
