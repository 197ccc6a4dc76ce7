use chrono::NaiveDateTime;
use serde::Serialize;

use pairly_shared::errors::{AppError, AppResult};

use super::{profile_missing, self_interaction, Matchmaker};
use crate::matching::resolver::{self, PairState};
use crate::models::{Profile, UserId};
use crate::notify::messages;
use crate::store;

/// Emitted once per pair, on the like that made it mutual.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEvent {
    pub user_a: UserId,
    pub user_b: UserId,
    pub matched_at: NaiveDateTime,
    /// How `user_a` reaches `user_b`, and the reverse.
    pub contact_of_b: String,
    pub contact_of_a: String,
    /// Users the announcement could not be delivered to.
    pub undelivered: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "event", rename_all = "snake_case")]
pub enum LikeOutcome {
    Match(MatchEvent),
    NoMatch,
}

impl Matchmaker {
    pub async fn like(&self, user_id: UserId, target_id: UserId) -> AppResult<LikeOutcome> {
        let _guard = self.lock_user(user_id).await;
        self.record_like_and_notify(user_id, target_id).await
    }

    /// Passing on a profile only marks it seen.
    pub async fn dislike(&self, user_id: UserId, target_id: UserId) -> AppResult<()> {
        let _guard = self.lock_user(user_id).await;
        self.record_dislike(user_id, target_id)
    }

    pub(super) fn record_dislike(&self, user_id: UserId, target_id: UserId) -> AppResult<()> {
        if user_id == target_id {
            return Err(self_interaction("dislike"));
        }
        let mut conn = self.conn()?;
        self.load_pair(&mut conn, user_id, target_id)?;
        store::ledger::record_view(&mut conn, user_id, target_id, store::now())?;

        metrics::counter!("pairly_likes_total", "outcome" => "dislike").increment(1);
        tracing::info!(user_id, target_id, "dislike recorded");
        Ok(())
    }

    /// Records the like durably, then notifies. Delivery problems never undo the like.
    pub(super) async fn record_like_and_notify(&self, liker_id: UserId, liked_id: UserId) -> AppResult<LikeOutcome> {
        if liker_id == liked_id {
            return Err(self_interaction("like"));
        }

        let now = store::now();
        let (liker, liked, recorded) = {
            let mut conn = self.conn()?;
            let (liker, liked) = self.load_pair(&mut conn, liker_id, liked_id)?;
            if store::ledger::is_blocked_between(&mut conn, liker_id, liked_id)? {
                return Err(AppError::forbidden("interaction with this user is blocked"));
            }
            let recorded = resolver::record_like(&mut conn, liker_id, liked_id, now)?;
            (liker, liked, recorded)
        };

        tracing::info!(
            liker_id,
            liked_id,
            new = recorded.newly_liked,
            state = ?recorded.state,
            "like recorded"
        );

        if recorded.became_mutual {
            metrics::counter!("pairly_likes_total", "outcome" => "match").increment(1);
            metrics::counter!("pairly_matches_total").increment(1);
            tracing::info!(user_a = liker_id, user_b = liked_id, "mutual match");
            return Ok(LikeOutcome::Match(self.announce_match(&liker, &liked, now).await));
        }

        if recorded.newly_liked && recorded.state != PairState::Mutual {
            metrics::counter!("pairly_likes_total", "outcome" => "new").increment(1);
            self.notifier.send(liked_id, messages::liked_by(&liker), "liked").await;
        } else {
            metrics::counter!("pairly_likes_total", "outcome" => "repeat").increment(1);
        }

        Ok(LikeOutcome::NoMatch)
    }

    /// Tells both sides about each other, concurrently and independently.
    async fn announce_match(&self, a: &Profile, b: &Profile, now: NaiveDateTime) -> MatchEvent {
        let (to_a, to_b) = tokio::join!(
            self.notifier.send(a.user_id, messages::match_announcement(b), "match"),
            self.notifier.send(b.user_id, messages::match_announcement(a), "match"),
        );

        let undelivered = [(a.user_id, to_a), (b.user_id, to_b)]
            .into_iter()
            .filter(|(_, delivered)| !delivered)
            .map(|(user_id, _)| user_id)
            .collect();

        MatchEvent {
            user_a: a.user_id,
            user_b: b.user_id,
            matched_at: now,
            contact_of_b: messages::contact_line(b),
            contact_of_a: messages::contact_line(a),
            undelivered,
        }
    }

    pub(super) fn load_pair(
        &self,
        conn: &mut diesel::SqliteConnection,
        actor_id: UserId,
        target_id: UserId,
    ) -> AppResult<(Profile, Profile)> {
        let actor = store::profiles::find(conn, actor_id)?.ok_or_else(|| profile_missing(actor_id))?;
        let target = store::profiles::find(conn, target_id)?.ok_or_else(|| profile_missing(target_id))?;
        Ok((actor, target))
    }
}
