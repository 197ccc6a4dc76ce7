use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{LikerSummary, NewBlock, NewLike, NewMatch, NewReport, NewView, UserId};
use crate::schema::{blocks, likes, matches, profiles, reports, viewed_profiles};

// --- Likes ---

/// Upserts a like. Returns `true` only when the row did not exist before.
pub fn record_like(
    conn: &mut SqliteConnection,
    liker_id: UserId,
    liked_id: UserId,
    now: NaiveDateTime,
) -> QueryResult<bool> {
    let inserted = diesel::insert_into(likes::table)
        .values(&NewLike { liker_id, liked_id, created_at: now })
        .on_conflict((likes::liker_id, likes::liked_id))
        .do_nothing()
        .execute(conn)?;
    Ok(inserted == 1)
}

pub fn like_exists(conn: &mut SqliteConnection, liker_id: UserId, liked_id: UserId) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        likes::table
            .filter(likes::liker_id.eq(liker_id))
            .filter(likes::liked_id.eq(liked_id)),
    ))
    .get_result(conn)
}

/// Both directed likes exist. Always read from the table, never cached.
pub fn has_mutual_like(conn: &mut SqliteConnection, a: UserId, b: UserId) -> QueryResult<bool> {
    Ok(like_exists(conn, a, b)? && like_exists(conn, b, a)?)
}

/// Users who liked `target`, minus those `target` liked back or has a block with, newest first.
pub fn pending_likers(
    conn: &mut SqliteConnection,
    target: UserId,
    limit: i64,
) -> QueryResult<Vec<LikerSummary>> {
    let mut excluded: Vec<UserId> = likes::table
        .filter(likes::liker_id.eq(target))
        .select(likes::liked_id)
        .load(conn)?;
    excluded.extend(blocked_either_way(conn, target)?);

    let rows: Vec<(UserId, String, i32, String, String, NaiveDateTime)> = likes::table
        .inner_join(profiles::table)
        .filter(likes::liked_id.eq(target))
        .filter(likes::liker_id.ne_all(&excluded))
        .order((likes::created_at.desc(), likes::id.desc()))
        .limit(limit)
        .select((
            profiles::user_id,
            profiles::name,
            profiles::age,
            profiles::description,
            profiles::photo_id,
            likes::created_at,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(user_id, name, age, description, photo, liked_at)| LikerSummary {
            user_id,
            name,
            age,
            description,
            photo,
            liked_at,
        })
        .collect())
}

// --- Views ---

pub fn record_view(
    conn: &mut SqliteConnection,
    viewer_id: UserId,
    viewed_id: UserId,
    now: NaiveDateTime,
) -> QueryResult<()> {
    diesel::replace_into(viewed_profiles::table)
        .values(&NewView { viewer_id, viewed_id, viewed_at: now })
        .execute(conn)?;
    Ok(())
}

pub fn viewed_ids(conn: &mut SqliteConnection, viewer_id: UserId) -> QueryResult<Vec<UserId>> {
    viewed_profiles::table
        .filter(viewed_profiles::viewer_id.eq(viewer_id))
        .select(viewed_profiles::viewed_id)
        .load(conn)
}

/// Last time `viewer_id` was shown each of `ids`.
pub fn view_times(
    conn: &mut SqliteConnection,
    viewer_id: UserId,
    ids: &[UserId],
) -> QueryResult<HashMap<UserId, NaiveDateTime>> {
    let rows: Vec<(UserId, NaiveDateTime)> = viewed_profiles::table
        .filter(viewed_profiles::viewer_id.eq(viewer_id))
        .filter(viewed_profiles::viewed_id.eq_any(ids))
        .select((viewed_profiles::viewed_id, viewed_profiles::viewed_at))
        .load(conn)?;
    Ok(rows.into_iter().collect())
}

// --- Blocks and reports ---

pub fn record_block(
    conn: &mut SqliteConnection,
    blocker_id: UserId,
    blocked_id: UserId,
    reason: Option<&str>,
    now: NaiveDateTime,
) -> QueryResult<()> {
    diesel::replace_into(blocks::table)
        .values(&NewBlock {
            blocker_id,
            blocked_id,
            reason: reason.map(str::to_string),
            created_at: now,
        })
        .execute(conn)?;
    Ok(())
}

pub fn record_report(
    conn: &mut SqliteConnection,
    reporter_id: UserId,
    reported_id: UserId,
    reason: Option<&str>,
    now: NaiveDateTime,
) -> QueryResult<()> {
    diesel::replace_into(reports::table)
        .values(&NewReport {
            reporter_id,
            reported_id,
            reason: reason.map(str::to_string),
            created_at: now,
        })
        .execute(conn)?;
    Ok(())
}

/// Everyone `user_id` blocked plus everyone who blocked `user_id`.
pub fn blocked_either_way(conn: &mut SqliteConnection, user_id: UserId) -> QueryResult<Vec<UserId>> {
    let mut ids: Vec<UserId> = blocks::table
        .filter(blocks::blocker_id.eq(user_id))
        .select(blocks::blocked_id)
        .load(conn)?;
    let blocked_by: Vec<UserId> = blocks::table
        .filter(blocks::blocked_id.eq(user_id))
        .select(blocks::blocker_id)
        .load(conn)?;
    ids.extend(blocked_by);
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

pub fn is_blocked_between(conn: &mut SqliteConnection, a: UserId, b: UserId) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        blocks::table.filter(
            blocks::blocker_id
                .eq(a)
                .and(blocks::blocked_id.eq(b))
                .or(blocks::blocker_id.eq(b).and(blocks::blocked_id.eq(a))),
        ),
    ))
    .get_result(conn)
}

pub fn report_exists(conn: &mut SqliteConnection, reporter_id: UserId, reported_id: UserId) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(reports::table.find((reporter_id, reported_id))))
        .get_result(conn)
}

// --- Matches ---

/// Records the MUTUAL transition for the unordered pair. Returns `true` for exactly one caller.
pub fn record_match(
    conn: &mut SqliteConnection,
    a: UserId,
    b: UserId,
    now: NaiveDateTime,
) -> QueryResult<bool> {
    let inserted = diesel::insert_into(matches::table)
        .values(&NewMatch::for_pair(a, b, now))
        .on_conflict((matches::user_low, matches::user_high))
        .do_nothing()
        .execute(conn)?;
    Ok(inserted == 1)
}

pub fn is_matched(conn: &mut SqliteConnection, a: UserId, b: UserId) -> QueryResult<bool> {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    diesel::select(diesel::dsl::exists(matches::table.find((low, high))))
        .get_result(conn)
}
