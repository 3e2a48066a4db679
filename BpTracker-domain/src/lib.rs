// BP Tracker Domain
// This crate contains the business logic for the BP Tracker application

// Domain entities
pub mod entities;

// Services that implement business logic
pub mod services;

// Date range selection, resolution and state
pub mod range;

// Readings client, keyed fetch cache and dashboard session
pub mod client;

// UI-facing models
pub mod chart;
pub mod export;
pub mod form;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use bp_tracker_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
