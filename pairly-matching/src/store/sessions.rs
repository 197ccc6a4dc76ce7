use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{BrowseSessionRow, PendingReply, UserId};
use crate::schema::{browse_sessions, pending_replies};

// --- Browse sessions ---

/// Stores a fresh session, discarding any previous one for the viewer.
pub fn replace(conn: &mut SqliteConnection, row: &BrowseSessionRow) -> QueryResult<()> {
    diesel::replace_into(browse_sessions::table)
        .values(row)
        .execute(conn)?;
    Ok(())
}

pub fn find(conn: &mut SqliteConnection, viewer_id: UserId) -> QueryResult<Option<BrowseSessionRow>> {
    browse_sessions::table
        .find(viewer_id)
        .select(BrowseSessionRow::as_select())
        .first(conn)
        .optional()
}

pub fn set_cursor(
    conn: &mut SqliteConnection,
    viewer_id: UserId,
    cursor: i32,
    now: NaiveDateTime,
) -> QueryResult<()> {
    diesel::update(browse_sessions::table.find(viewer_id))
        .set((browse_sessions::cursor.eq(cursor), browse_sessions::updated_at.eq(now)))
        .execute(conn)?;
    Ok(())
}

pub fn delete(conn: &mut SqliteConnection, viewer_id: UserId) -> QueryResult<()> {
    diesel::delete(browse_sessions::table.find(viewer_id)).execute(conn)?;
    Ok(())
}

// --- Pending-reply context ---

pub fn set_pending_reply(
    conn: &mut SqliteConnection,
    viewer_id: UserId,
    liker_id: UserId,
    now: NaiveDateTime,
) -> QueryResult<()> {
    diesel::replace_into(pending_replies::table)
        .values(&PendingReply { viewer_id, liker_id, updated_at: now })
        .execute(conn)?;
    Ok(())
}

pub fn find_pending_reply(conn: &mut SqliteConnection, viewer_id: UserId) -> QueryResult<Option<PendingReply>> {
    pending_replies::table
        .find(viewer_id)
        .select(PendingReply::as_select())
        .first(conn)
        .optional()
}

pub fn clear_pending_reply(conn: &mut SqliteConnection, viewer_id: UserId) -> QueryResult<()> {
    diesel::delete(pending_replies::table.find(viewer_id)).execute(conn)?;
    Ok(())
}

/// Deletes sessions and reply contexts last touched before `cutoff`.
pub fn expire_before(conn: &mut SqliteConnection, cutoff: NaiveDateTime) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let sessions = diesel::delete(browse_sessions::table.filter(browse_sessions::updated_at.lt(cutoff)))
            .execute(conn)?;
        let replies = diesel::delete(pending_replies::table.filter(pending_replies::updated_at.lt(cutoff)))
            .execute(conn)?;
        Ok(sessions + replies)
    })
}
