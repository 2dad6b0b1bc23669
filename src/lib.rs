//! Filter-and-aggregate core for a ride-bookings dashboard.
//!
//! [`loader`] reads the bookings CSV once into a [`types::TripTable`] of
//! completed trips; [`pipeline::aggregate`] turns that table plus a
//! [`filter::FilterSelection`] into every KPI and table the dashboard shows.
//! [`dashboard::Dashboard`] ties the two together for one session.

pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod types;
pub mod util;

pub use dashboard::Dashboard;
pub use error::LoadError;
pub use filter::{DateRange, FilterSelection};
pub use pipeline::aggregate;
pub use types::{AggregateResults, TripRecord, TripTable};
