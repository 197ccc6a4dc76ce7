use chrono::NaiveDateTime;
use diesel::{Connection, SqliteConnection};
use serde::{Deserialize, Serialize};

use pairly_shared::errors::{AppError, AppResult, ErrorCode};

use super::likes::LikeOutcome;
use super::{profile_missing, Matchmaker};
use crate::matching::ranker::{self, RankRequest};
use crate::matching::session::{BrowseSession, BrowseStart, NextCandidate};
use crate::models::{LikerSummary, UserId};
use crate::store;

/// Upper bound on pending likers scanned when picking the next one to show.
const PENDING_SCAN_LIMIT: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionSource {
    PendingLiker,
    Browsing,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionOutcome {
    pub target: UserId,
    pub source: ReactionSource,
    /// Present for likes.
    pub like: Option<LikeOutcome>,
    /// The candidate served after a browsing reaction.
    pub next: Option<NextCandidate>,
}

impl Matchmaker {
    /// Ranks candidates for the viewer and replaces any previous browsing session.
    pub async fn start_browsing(&self, viewer_id: UserId) -> AppResult<BrowseStart> {
        let _guard = self.lock_user(viewer_id).await;
        let mut conn = self.conn()?;

        let viewer = store::profiles::find(&mut conn, viewer_id)?.ok_or_else(|| profile_missing(viewer_id))?;
        let shortlist = ranker::rank(&mut conn, &RankRequest::for_viewer(&viewer, self.config.shortlist_limit))?;

        if shortlist.is_empty() {
            store::sessions::delete(&mut conn, viewer_id)?;
            tracing::info!(viewer_id, "no candidates available");
            return Ok(BrowseStart::Empty);
        }

        let session = BrowseSession::new(viewer_id, shortlist, store::now());
        let row = session.to_row().map_err(anyhow::Error::from)?;
        store::sessions::replace(&mut conn, &row)?;

        tracing::info!(viewer_id, size = session.shortlist.len(), "browsing session started");
        Ok(BrowseStart::Ready(session.handle()))
    }

    /// Serves the candidate at the cursor and records the view.
    pub async fn next_candidate(&self, viewer_id: UserId) -> AppResult<NextCandidate> {
        let _guard = self.lock_user(viewer_id).await;
        let mut conn = self.conn()?;
        let session = self
            .load_session(&mut conn, viewer_id, store::now())?
            .ok_or_else(|| session_missing(viewer_id))?;
        self.advance_session(&mut conn, session, store::now())
    }

    /// Likes or dislikes whatever the user is currently looking at. A pending liker shown via
    /// "who liked me" takes priority over the browsing session. A browsing candidate blocked
    /// since being served gets no reaction; the session just moves on.
    pub async fn react(&self, user_id: UserId, reaction: Reaction) -> AppResult<ReactionOutcome> {
        let _guard = self.lock_user(user_id).await;
        let now = store::now();

        let pending = {
            let mut conn = self.conn()?;
            match store::sessions::find_pending_reply(&mut conn, user_id)? {
                Some(reply) => {
                    store::sessions::clear_pending_reply(&mut conn, user_id)?;
                    (!self.is_stale(reply.updated_at, now)).then_some(reply.liker_id)
                }
                None => None,
            }
        };

        if let Some(target) = pending {
            let like = self.apply_reaction(user_id, target, reaction).await?;
            return Ok(ReactionOutcome { target, source: ReactionSource::PendingLiker, like, next: None });
        }

        let session = {
            let mut conn = self.conn()?;
            self.load_session(&mut conn, user_id, now)?
        };
        let target = session
            .as_ref()
            .and_then(|s| s.last_served())
            .map(|candidate| candidate.user_id);

        let (Some(session), Some(target)) = (session, target) else {
            return Err(AppError::new(
                ErrorCode::NoActiveTarget,
                "nothing to react to: open \"who liked me\" or start browsing",
            ));
        };

        let blocked = {
            let mut conn = self.conn()?;
            store::ledger::is_blocked_between(&mut conn, user_id, target)?
        };
        let like = if blocked {
            tracing::info!(user_id, target, "served candidate is blocked now, passing over");
            None
        } else {
            self.apply_reaction(user_id, target, reaction).await?
        };
        let mut conn = self.conn()?;
        let next = self.advance_session(&mut conn, session, store::now())?;

        Ok(ReactionOutcome { target, source: ReactionSource::Browsing, like, next: Some(next) })
    }

    /// Pending likers, newest first, limited to `limit` or the configured default.
    pub async fn pending_likers(&self, user_id: UserId, limit: Option<i64>) -> AppResult<Vec<LikerSummary>> {
        let limit = limit.unwrap_or(self.config.pending_likers_limit).clamp(1, 100);
        let mut conn = self.conn()?;
        if !store::profiles::exists(&mut conn, user_id)? {
            return Err(profile_missing(user_id));
        }
        Ok(store::ledger::pending_likers(&mut conn, user_id, limit)?)
    }

    /// Shows the most recent pending liker not dismissed since their like, and remembers it as
    /// the target of the user's next reaction.
    pub async fn next_pending_liker(&self, user_id: UserId) -> AppResult<Option<LikerSummary>> {
        let _guard = self.lock_user(user_id).await;
        let mut conn = self.conn()?;
        if !store::profiles::exists(&mut conn, user_id)? {
            return Err(profile_missing(user_id));
        }

        let pending = store::ledger::pending_likers(&mut conn, user_id, PENDING_SCAN_LIMIT)?;
        let ids: Vec<UserId> = pending.iter().map(|liker| liker.user_id).collect();
        let seen = store::ledger::view_times(&mut conn, user_id, &ids)?;

        let next = pending
            .into_iter()
            .find(|liker| seen.get(&liker.user_id).map_or(true, |viewed_at| *viewed_at < liker.liked_at));

        match &next {
            Some(liker) => {
                store::sessions::set_pending_reply(&mut conn, user_id, liker.user_id, store::now())?;
                tracing::debug!(user_id, liker_id = liker.user_id, "pending liker shown");
            }
            None => store::sessions::clear_pending_reply(&mut conn, user_id)?,
        }

        Ok(next)
    }

    async fn apply_reaction(
        &self,
        user_id: UserId,
        target: UserId,
        reaction: Reaction,
    ) -> AppResult<Option<LikeOutcome>> {
        match reaction {
            Reaction::Like => Ok(Some(self.record_like_and_notify(user_id, target).await?)),
            Reaction::Dislike => {
                self.record_dislike(user_id, target)?;
                Ok(None)
            }
        }
    }

    fn load_session(
        &self,
        conn: &mut SqliteConnection,
        viewer_id: UserId,
        now: NaiveDateTime,
    ) -> AppResult<Option<BrowseSession>> {
        let Some(row) = store::sessions::find(conn, viewer_id)? else {
            return Ok(None);
        };
        let session = BrowseSession::from_row(row).map_err(anyhow::Error::from)?;

        if session.is_expired(self.config.session_ttl, now) {
            store::sessions::delete(conn, viewer_id)?;
            tracing::debug!(viewer_id, "browsing session expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn advance_session(
        &self,
        conn: &mut SqliteConnection,
        mut session: BrowseSession,
        now: NaiveDateTime,
    ) -> AppResult<NextCandidate> {
        let viewer_id = session.viewer_id;
        let candidate = loop {
            let Some(candidate) = session.advance(now) else {
                store::sessions::delete(conn, viewer_id)?;
                tracing::info!(viewer_id, "shortlist exhausted");
                return Ok(NextCandidate::Exhausted);
            };
            // Blocks recorded after ranking.
            if !store::ledger::is_blocked_between(conn, viewer_id, candidate.user_id)? {
                break candidate;
            }
            tracing::debug!(viewer_id, candidate_id = candidate.user_id, "skipping blocked candidate");
        };

        let cursor = session.cursor_value();
        conn.transaction(|conn| {
            store::ledger::record_view(conn, viewer_id, candidate.user_id, now)?;
            store::sessions::set_cursor(conn, viewer_id, cursor, now)
        })?;

        metrics::counter!("pairly_candidates_served_total").increment(1);
        tracing::debug!(viewer_id, candidate_id = candidate.user_id, cursor, "candidate served");
        Ok(NextCandidate::Candidate(candidate))
    }
}

fn session_missing(viewer_id: UserId) -> AppError {
    AppError::new(
        ErrorCode::SessionNotFound,
        format!("no active browsing session for {viewer_id}"),
    )
}
