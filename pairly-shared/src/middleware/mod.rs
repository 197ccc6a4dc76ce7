mod metrics_layer;
mod tracing_layer;

pub use metrics_layer::{init_metrics, metrics_middleware};
pub use tracing_layer::{default_filter, init_tracing, LogFormat};
