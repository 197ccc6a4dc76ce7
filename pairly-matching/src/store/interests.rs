use std::collections::HashMap;

use diesel::prelude::*;

use crate::models::{Interest, InterestId, NewUserInterest, UserId};
use crate::schema::{interests, user_interests};

pub fn list(conn: &mut SqliteConnection) -> QueryResult<Vec<Interest>> {
    interests::table
        .select(Interest::as_select())
        .order(interests::name.asc())
        .load(conn)
}

/// The subset of `ids` present in the catalog.
pub fn existing_ids(conn: &mut SqliteConnection, ids: &[InterestId]) -> QueryResult<Vec<InterestId>> {
    interests::table
        .filter(interests::id.eq_any(ids))
        .select(interests::id)
        .load(conn)
}

/// Clear-then-add in one transaction so readers never observe a partial set.
pub fn replace_for_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
    ids: &[InterestId],
) -> QueryResult<()> {
    conn.transaction(|conn| {
        diesel::delete(user_interests::table.filter(user_interests::user_id.eq(user_id)))
            .execute(conn)?;

        if !ids.is_empty() {
            let rows: Vec<NewUserInterest> = ids
                .iter()
                .map(|&interest_id| NewUserInterest { user_id, interest_id })
                .collect();
            diesel::insert_into(user_interests::table)
                .values(&rows)
                .execute(conn)?;
        }

        Ok(())
    })
}

pub fn ids_for_user(conn: &mut SqliteConnection, user_id: UserId) -> QueryResult<Vec<InterestId>> {
    user_interests::table
        .filter(user_interests::user_id.eq(user_id))
        .select(user_interests::interest_id)
        .order(user_interests::interest_id.asc())
        .load(conn)
}

pub fn for_user(conn: &mut SqliteConnection, user_id: UserId) -> QueryResult<Vec<Interest>> {
    user_interests::table
        .inner_join(interests::table)
        .filter(user_interests::user_id.eq(user_id))
        .select(Interest::as_select())
        .order(interests::name.asc())
        .load(conn)
}

/// Distinct users holding at least one of `ids`.
pub fn users_with_any(conn: &mut SqliteConnection, ids: &[InterestId]) -> QueryResult<Vec<UserId>> {
    user_interests::table
        .filter(user_interests::interest_id.eq_any(ids))
        .select(user_interests::user_id)
        .distinct()
        .order(user_interests::user_id.asc())
        .load(conn)
}

/// Number of tags each user holds out of `tags`. Users holding none are absent.
pub fn shared_counts(
    conn: &mut SqliteConnection,
    tags: &[InterestId],
) -> QueryResult<HashMap<UserId, u32>> {
    let holders: Vec<UserId> = user_interests::table
        .filter(user_interests::interest_id.eq_any(tags))
        .select(user_interests::user_id)
        .load(conn)?;

    let mut counts = HashMap::new();
    for user_id in holders {
        *counts.entry(user_id).or_insert(0) += 1;
    }
    Ok(counts)
}
