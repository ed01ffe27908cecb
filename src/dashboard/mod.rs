//! Dashboard module
//!
//! Provides an overview page with spending totals, charts, the progress of
//! active limits and the user's points.

mod aggregation;
mod cards;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
