use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// JSON when `PAIRLY_ENV=production`, human-readable otherwise.
    pub fn from_env() -> Self {
        match std::env::var("PAIRLY_ENV").as_deref() {
            Ok("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// `info` globally, `debug` for the service's own crate and for tower-http.
pub fn default_filter(service_name: &str) -> String {
    format!("info,{}=debug,tower_http=debug", service_name.replace('-', "_"))
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));

    let format = LogFormat::from_env();
    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
    };

    match tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init() {
        Ok(()) => tracing::info!(service = service_name, ?format, "tracing initialized"),
        Err(e) => tracing::debug!(error = %e, "global subscriber already installed"),
    }
}
