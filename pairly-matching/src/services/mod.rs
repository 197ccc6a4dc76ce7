//! The matchmaking core: every externally visible operation is a method on [`Matchmaker`].

mod broadcasts;
mod browse;
mod likes;
mod moderation;
mod profiles;

use std::sync::Arc;

use chrono::NaiveDateTime;
use dashmap::DashMap;
use diesel::RunQueryDsl;
use tokio::sync::{Mutex, OwnedMutexGuard};

use pairly_shared::clients::db::{DbConn, DbPool};
use pairly_shared::errors::{AppError, AppResult, ErrorCode};

use crate::config::MatchingConfig;
use crate::matching::session::is_stale;
use crate::models::UserId;
use crate::notify::{Notifier, Transport};
use crate::store;

pub use broadcasts::BroadcastReport;
pub use browse::{Reaction, ReactionOutcome, ReactionSource};
pub use likes::{LikeOutcome, MatchEvent};
pub use moderation::ReportOutcome;

pub struct Matchmaker {
    pool: DbPool,
    notifier: Notifier,
    config: MatchingConfig,
    /// Serializes session-mutating operations of one user.
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl Matchmaker {
    pub fn new(pool: DbPool, transport: Arc<dyn Transport>, config: MatchingConfig) -> Self {
        Self {
            pool,
            notifier: Notifier::new(transport),
            config,
            locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    fn conn(&self) -> AppResult<DbConn> {
        self.pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection");
            AppError::from(e)
        })
    }

    async fn lock_user(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(user_id).or_default().clone();
        lock.lock_owned().await
    }

    pub fn check_database(&self) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    /// Drops sessions and reply contexts idle for longer than the configured TTL, and forgets
    /// per-user locks nobody holds.
    pub fn expire_stale_sessions(&self, now: NaiveDateTime) -> AppResult<usize> {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        let cutoff = chrono::Duration::from_std(self.config.session_ttl)
            .ok()
            .and_then(|ttl| now.checked_sub_signed(ttl));
        let Some(cutoff) = cutoff else {
            return Ok(0);
        };

        let mut conn = self.conn()?;
        let removed = store::sessions::expire_before(&mut conn, cutoff)?;
        if removed > 0 {
            tracing::info!(removed, "expired stale sessions");
        }
        Ok(removed)
    }

    fn is_stale(&self, updated_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        is_stale(updated_at, self.config.session_ttl, now)
    }
}

/// Registers help text for the counters emitted by the matchmaking operations.
pub fn describe_metrics() {
    metrics::describe_counter!("pairly_likes_total", "Likes and dislikes by outcome");
    metrics::describe_counter!("pairly_matches_total", "Pairs that became mutual");
    metrics::describe_counter!("pairly_deliveries_total", "Notification deliveries by status");
    metrics::describe_counter!("pairly_candidates_served_total", "Candidates served from shortlists");
}

fn profile_missing(user_id: UserId) -> AppError {
    AppError::new(ErrorCode::ProfileNotFound, format!("profile {user_id} not found"))
}

fn self_interaction(action: &str) -> AppError {
    AppError::new(ErrorCode::SelfInteraction, format!("cannot {action} yourself"))
}
