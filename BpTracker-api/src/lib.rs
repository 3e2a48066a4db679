// BP Tracker API lib.rs
//
// HTTP layer for the BP Tracker: routes, handlers, public entities,
// configuration and OpenAPI documentation.

// Public modules
pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;
