pub mod config;
pub mod matching;
pub mod models;
pub mod notify;
pub mod profile;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;
pub mod wizard;

use metrics_exporter_prometheus::PrometheusHandle;

pub struct AppState {
    pub matchmaker: services::Matchmaker,
    pub config: config::AppConfig,
    /// Installed by the binary; absent when the router is built in tests.
    pub metrics_handle: Option<PrometheusHandle>,
}
