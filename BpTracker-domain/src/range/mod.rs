//! Date range selection for the readings chart.
//!
//! A [`RangeSelection`] is what the user picked (a trailing preset or a
//! custom pair of dates). [`resolve`] turns it into the [`ResolvedRange`]
//! used as the fetch key, and [`RangeStateStore`] owns the current
//! selection and publishes resolved range changes to subscribers.

pub mod selection;
pub mod resolver;
pub mod store;

pub use selection::{CalendarBound, CustomRange, PresetDays, RangeSelection};
pub use resolver::{bounds_from_params, parse_bound, resolve, BoundSide, RangeError, ResolvedRange};
pub use store::RangeStateStore;
