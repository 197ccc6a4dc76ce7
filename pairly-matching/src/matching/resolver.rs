use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::models::UserId;
use crate::store::ledger;

/// Like relationship of an unordered pair, seen from the (a, b) orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairState {
    None,
    ALikesB,
    BLikesA,
    Mutual,
}

impl PairState {
    pub fn from_likes(a_likes_b: bool, b_likes_a: bool) -> Self {
        match (a_likes_b, b_likes_a) {
            (false, false) => Self::None,
            (true, false) => Self::ALikesB,
            (false, true) => Self::BLikesA,
            (true, true) => Self::Mutual,
        }
    }

    /// State after a like from `a` to `b`. `Mutual` is terminal.
    pub fn after_like_from_a(self) -> Self {
        match self {
            Self::None | Self::ALikesB => Self::ALikesB,
            Self::BLikesA | Self::Mutual => Self::Mutual,
        }
    }

    /// State after a like from `b` to `a`.
    pub fn after_like_from_b(self) -> Self {
        match self {
            Self::None | Self::BLikesA => Self::BLikesA,
            Self::ALikesB | Self::Mutual => Self::Mutual,
        }
    }
}

/// What recording one like did to the pair, oriented as (liker, liked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeRecorded {
    pub newly_liked: bool,
    pub state: PairState,
    /// True for exactly one like per pair: the one that completed the mutual pair.
    pub became_mutual: bool,
}

/// Records the like and evaluates mutuality inside one immediate transaction. SQLite admits a
/// single writer at a time, so two opposite likes landing together are serialized and the
/// second one always sees the first. The `matches` row makes the transition idempotent.
pub fn record_like(
    conn: &mut SqliteConnection,
    liker_id: UserId,
    liked_id: UserId,
    now: NaiveDateTime,
) -> QueryResult<LikeRecorded> {
    conn.immediate_transaction(|conn| {
        let newly_liked = ledger::record_like(conn, liker_id, liked_id, now)?;
        let mutual = ledger::has_mutual_like(conn, liker_id, liked_id)?;

        let became_mutual = if mutual {
            ledger::record_match(conn, liker_id, liked_id, now)?
        } else {
            false
        };

        Ok(LikeRecorded {
            newly_liked,
            state: PairState::from_likes(true, mutual),
            became_mutual,
        })
    })
}
