use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{Broadcast, BroadcastStatus, NewBroadcast};
use crate::schema::broadcasts;

pub fn insert(conn: &mut SqliteConnection, broadcast: &NewBroadcast) -> QueryResult<Broadcast> {
    diesel::insert_into(broadcasts::table)
        .values(broadcast)
        .returning(Broadcast::as_returning())
        .get_result(conn)
}

pub fn find(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Broadcast>> {
    broadcasts::table
        .find(id)
        .select(Broadcast::as_select())
        .first(conn)
        .optional()
}

/// Moves a pending broadcast to its final status. `None` when it was not pending.
pub fn decide(
    conn: &mut SqliteConnection,
    id: i32,
    status: BroadcastStatus,
    now: NaiveDateTime,
) -> QueryResult<Option<Broadcast>> {
    diesel::update(
        broadcasts::table
            .find(id)
            .filter(broadcasts::status.eq(BroadcastStatus::Pending)),
    )
    .set((broadcasts::status.eq(status), broadcasts::decided_at.eq(Some(now))))
    .returning(Broadcast::as_returning())
    .get_result(conn)
    .optional()
}
