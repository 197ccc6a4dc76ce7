use std::time::Duration;

use serde::Deserialize;

use crate::models::UserId;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db")]
    pub database_url: String,
    #[serde(default = "default_pool_size")]
    pub db_pool_size: u32,
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    #[serde(default)]
    pub telegram_bot_token: Option<String>,
    #[serde(default)]
    pub admin_id: Option<UserId>,
    #[serde(default = "default_shortlist_limit")]
    pub shortlist_limit: usize,
    #[serde(default = "default_max_interests")]
    pub max_interests: usize,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub session_sweep_interval_secs: u64,
    #[serde(default = "default_true")]
    pub report_implies_block: bool,
    #[serde(default = "default_pending_likers_limit")]
    pub pending_likers_limit: i64,
}

fn default_port() -> u16 { 3010 }
fn default_db() -> String { "pairly.db".into() }
fn default_pool_size() -> u32 { 8 }
fn default_telegram_api_url() -> String { "https://api.telegram.org".into() }
fn default_shortlist_limit() -> usize { 50 }
fn default_max_interests() -> usize { 5 }
fn default_session_ttl() -> u64 { 86_400 }
fn default_sweep_interval() -> u64 { 3_600 }
fn default_true() -> bool { true }
fn default_pending_likers_limit() -> i64 { 10 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_url: default_db(),
            db_pool_size: default_pool_size(),
            telegram_api_url: default_telegram_api_url(),
            telegram_bot_token: None,
            admin_id: None,
            shortlist_limit: default_shortlist_limit(),
            max_interests: default_max_interests(),
            session_ttl_secs: default_session_ttl(),
            session_sweep_interval_secs: default_sweep_interval(),
            report_implies_block: default_true(),
            pending_likers_limit: default_pending_likers_limit(),
        }
    }
}

impl AppConfig {
    /// Reads `PAIRLY__*` environment variables, e.g. `PAIRLY__DATABASE_URL`.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PAIRLY").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn matching(&self) -> MatchingConfig {
        MatchingConfig {
            shortlist_limit: self.shortlist_limit,
            max_interests: self.max_interests,
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            report_implies_block: self.report_implies_block,
            pending_likers_limit: self.pending_likers_limit,
            admin_id: self.admin_id,
        }
    }
}

/// The subset of configuration the matchmaking core reads.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub shortlist_limit: usize,
    pub max_interests: usize,
    pub session_ttl: Duration,
    pub report_implies_block: bool,
    pub pending_likers_limit: i64,
    pub admin_id: Option<UserId>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        AppConfig::default().matching()
    }
}
