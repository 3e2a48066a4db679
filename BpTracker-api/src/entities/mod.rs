// Public entities for the BP Tracker API
// This module contains data structures that are shared across the application boundary

// Blood pressure readings
pub mod readings;

// Common entities for error handling
pub mod common;

pub use common::ErrorResponse;
pub use readings::{BpReading, CreateBpReadingRequest, ReadingsQueryParams};
