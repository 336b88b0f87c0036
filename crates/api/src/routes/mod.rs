//! HTTP handlers, one module per resource.

pub mod categories;
pub mod health;
pub mod metrics;
pub mod params;
pub mod properties;
pub mod transactions;
