pub mod readings;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use readings::{
    create_default_readings_service, ReadingsService, ReadingsServiceError, ReadingsServiceTrait,
};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use readings::create_mock_readings_service;
