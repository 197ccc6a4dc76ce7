//! Diesel queries over the SQLite schema. Every function takes a plain connection so callers
//! can compose several of them inside one transaction.

pub mod broadcasts;
pub mod interests;
pub mod ledger;
pub mod profiles;
pub mod sessions;

use chrono::{NaiveDateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use pairly_shared::clients::db::DbPool;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Creates missing tables and seeds the interest catalog. Safe to run on every start.
pub fn init_schema(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(SCHEMA)
}

/// Checks out one pooled connection and runs [`init_schema`] on it.
pub fn migrate(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    init_schema(&mut conn)?;
    Ok(())
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
