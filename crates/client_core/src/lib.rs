//! Query-and-pagination core for the enrolment analytics dashboard.

pub mod config;
pub mod filter_cache;
pub mod gateway;
pub mod orchestrator;
pub mod query_state;
pub mod view;

pub use config::{load_settings, load_settings_from, GatewaySettings};
pub use filter_cache::FilterCache;
pub use gateway::{Gateway, GatewayError, HttpGateway};
pub use orchestrator::{Dashboard, DashboardEvent, FetchStatus, RefreshOutcome};
pub use query_state::{QueryState, PAGE_SIZE};
pub use view::{DashboardView, ResultWindow, TableRow, TrendPoint};
