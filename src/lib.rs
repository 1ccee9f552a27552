//! Correlation and regression statistics over traffic, transit and air-quality metrics.
//!
//! [`stats`] holds the pure statistics functions. [`analysis`] turns API
//! records into display reports, and [`manager`] drives it over a data
//! directory of API snapshots.

pub mod analysis;
pub mod config;
pub mod error;
pub mod manager;
pub mod stats;
pub mod types;

pub use error::StatsError;
pub use stats::{Correlation, LinearFit, hourly_average, linear_fit, mean, pearson_correlation};
