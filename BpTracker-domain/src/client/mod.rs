//! Client side of the readings API.
//!
//! [`ReadingsSource`] is the boundary to the HTTP API, [`ReadingsQuery`] is
//! the keyed fetch cache in front of it and [`Dashboard`] wires the range
//! store, the cache, the form and the exporter into one session.

pub mod source;
pub mod query;
pub mod dashboard;

#[cfg(feature = "with-client")]
pub mod http;

pub use source::{ClientError, ReadingsSource};
pub use query::{QueryStatus, QueryTicket, ReadingsQuery, MAX_CACHED_RANGES};
pub use dashboard::{Dashboard, SubmitError};

#[cfg(feature = "with-client")]
pub use http::HttpReadingsClient;
