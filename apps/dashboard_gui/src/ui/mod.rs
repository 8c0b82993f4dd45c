//! UI layer: dashboard app shell and the trend chart.

pub mod app;
pub mod chart;

pub use app::DashboardApp;
