use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{Profile, ProfileChanges, ProfileRecord, UserId};
use crate::schema::profiles;

pub fn find(conn: &mut SqliteConnection, user_id: UserId) -> QueryResult<Option<Profile>> {
    profiles::table
        .find(user_id)
        .select(Profile::as_select())
        .first(conn)
        .optional()
}

pub fn exists(conn: &mut SqliteConnection, user_id: UserId) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(profiles::table.find(user_id))).get_result(conn)
}

/// Inserts or fully replaces a profile. `created_at` is kept from the first insert.
pub fn upsert(
    conn: &mut SqliteConnection,
    record: &ProfileRecord,
    now: NaiveDateTime,
) -> QueryResult<Profile> {
    diesel::insert_into(profiles::table)
        .values((record, profiles::created_at.eq(now)))
        .on_conflict(profiles::user_id)
        .do_update()
        .set(record)
        .returning(Profile::as_returning())
        .get_result(conn)
}

/// Applies a sparse edit. Returns `None` when the profile does not exist.
pub fn update(
    conn: &mut SqliteConnection,
    user_id: UserId,
    changes: &ProfileChanges,
    now: NaiveDateTime,
) -> QueryResult<Option<Profile>> {
    diesel::update(profiles::table.find(user_id))
        .set((changes, profiles::last_active.eq(now)))
        .returning(Profile::as_returning())
        .get_result(conn)
        .optional()
}

/// Refreshes `last_active` and optionally the public alias.
pub fn touch(
    conn: &mut SqliteConnection,
    user_id: UserId,
    alias: Option<&str>,
    now: NaiveDateTime,
) -> QueryResult<Option<Profile>> {
    let target = profiles::table.find(user_id);
    let query = match alias {
        Some(alias) => diesel::update(target)
            .set((profiles::last_active.eq(now), profiles::alias.eq(Some(alias))))
            .returning(Profile::as_returning())
            .get_result(conn),
        None => diesel::update(target)
            .set(profiles::last_active.eq(now))
            .returning(Profile::as_returning())
            .get_result(conn),
    };
    query.optional()
}

/// Candidate pool for ranking: everyone except the viewer and the excluded ids, optionally
/// narrowed to one gender.
pub fn candidates(
    conn: &mut SqliteConnection,
    viewer_id: UserId,
    gender: Option<crate::models::Gender>,
    excluded: &[UserId],
) -> QueryResult<Vec<Profile>> {
    let mut query = profiles::table
        .filter(profiles::user_id.ne(viewer_id))
        .filter(profiles::user_id.ne_all(excluded))
        .select(Profile::as_select())
        .into_boxed();

    if let Some(gender) = gender {
        query = query.filter(profiles::gender.eq(gender));
    }

    query.load(conn)
}
