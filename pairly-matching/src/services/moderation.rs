use diesel::Connection;
use serde::Serialize;

use pairly_shared::errors::AppResult;

use super::{self_interaction, Matchmaker};
use crate::models::UserId;
use crate::store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub reported: UserId,
    pub blocked: bool,
}

impl Matchmaker {
    /// Files a report. With `report_implies_block` the target is blocked in the same transaction.
    pub async fn report(&self, user_id: UserId, target_id: UserId, reason: Option<String>) -> AppResult<ReportOutcome> {
        if user_id == target_id {
            return Err(self_interaction("report"));
        }

        let block = self.config.report_implies_block;
        let mut conn = self.conn()?;
        self.load_pair(&mut conn, user_id, target_id)?;

        let now = store::now();
        conn.transaction(|conn| {
            store::ledger::record_report(conn, user_id, target_id, reason.as_deref(), now)?;
            if block {
                store::ledger::record_block(conn, user_id, target_id, reason.as_deref(), now)?;
            }
            Ok::<(), diesel::result::Error>(())
        })?;

        tracing::info!(user_id, target_id, blocked = block, "report recorded");
        Ok(ReportOutcome { reported: target_id, blocked: block })
    }

    /// Hides the two users from each other in ranking and "who liked me".
    pub async fn block(&self, user_id: UserId, target_id: UserId, reason: Option<String>) -> AppResult<()> {
        if user_id == target_id {
            return Err(self_interaction("block"));
        }

        let mut conn = self.conn()?;
        self.load_pair(&mut conn, user_id, target_id)?;
        store::ledger::record_block(&mut conn, user_id, target_id, reason.as_deref(), store::now())?;

        tracing::info!(user_id, target_id, "block recorded");
        Ok(())
    }
}
