use diesel::Connection;
use serde::Serialize;

use pairly_shared::errors::{AppError, AppResult, ErrorCode};

use super::{profile_missing, Matchmaker};
use crate::models::{Broadcast, BroadcastStatus, InterestId, NewBroadcast, UserId};
use crate::notify::messages;
use crate::store;

const BODY_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub broadcast_id: i32,
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl Matchmaker {
    /// Queues a message for everyone sharing one of `interest_ids` and asks the admin to review it.
    pub async fn request_broadcast(
        &self,
        sender_id: UserId,
        body: String,
        interest_ids: Vec<InterestId>,
    ) -> AppResult<Broadcast> {
        let admin_id = self.admin_id()?;

        let body = body.trim().to_string();
        let len = body.chars().count();
        if len == 0 || len > BODY_MAX_CHARS {
            return Err(AppError::validation(format!(
                "broadcast text must be 1 to {BODY_MAX_CHARS} characters"
            )));
        }

        let mut tags: Vec<InterestId> = Vec::new();
        for id in interest_ids {
            if !tags.contains(&id) {
                tags.push(id);
            }
        }
        if tags.is_empty() {
            return Err(AppError::validation("select at least one interest"));
        }

        let (broadcast, sender, interests) = {
            let mut conn = self.conn()?;
            let sender = store::profiles::find(&mut conn, sender_id)?.ok_or_else(|| profile_missing(sender_id))?;

            let known = store::interests::existing_ids(&mut conn, &tags)?;
            if known.len() != tags.len() {
                return Err(AppError::new(ErrorCode::UnknownInterest, "unknown interest ids"));
            }

            let broadcast = store::broadcasts::insert(
                &mut conn,
                &NewBroadcast {
                    sender_id,
                    body,
                    interest_ids: serde_json::to_string(&tags).map_err(anyhow::Error::from)?,
                    status: BroadcastStatus::Pending,
                    created_at: store::now(),
                },
            )?;
            let interests: Vec<_> = store::interests::list(&mut conn)?
                .into_iter()
                .filter(|interest| tags.contains(&interest.id))
                .collect();
            (broadcast, sender, interests)
        };

        tracing::info!(broadcast_id = broadcast.id, sender_id, tags = ?tags, "broadcast requested");
        self.notifier
            .send(
                admin_id,
                messages::broadcast_review(broadcast.id, &sender, &broadcast.body, &interests),
                "broadcast_review",
            )
            .await;

        Ok(broadcast)
    }

    /// Sends an approved broadcast to every holder of its interests except the sender.
    pub async fn approve_broadcast(&self, admin_id: UserId, broadcast_id: i32) -> AppResult<BroadcastReport> {
        self.ensure_admin(admin_id)?;

        // A stored tag list that cannot be decoded leaves the broadcast pending.
        let (broadcast, sender, recipients) = {
            let mut conn = self.conn()?;
            conn.transaction::<_, AppError, _>(|conn| {
                let broadcast = self.decide(conn, broadcast_id, BroadcastStatus::Approved)?;
                let sender = store::profiles::find(conn, broadcast.sender_id)?
                    .ok_or_else(|| profile_missing(broadcast.sender_id))?;
                let tags = broadcast.interests().map_err(anyhow::Error::from)?;
                let recipients: Vec<UserId> = store::interests::users_with_any(conn, &tags)?
                    .into_iter()
                    .filter(|user_id| *user_id != broadcast.sender_id)
                    .collect();
                Ok((broadcast, sender, recipients))
            })?
        };

        let content = messages::broadcast_delivery(&sender, &broadcast.body);
        let mut delivered = 0;
        for user_id in &recipients {
            if self.notifier.send(*user_id, content.clone(), "broadcast").await {
                delivered += 1;
            }
        }

        let report = BroadcastReport {
            broadcast_id,
            recipients: recipients.len(),
            delivered,
            failed: recipients.len() - delivered,
        };
        tracing::info!(
            broadcast_id,
            recipients = report.recipients,
            delivered = report.delivered,
            failed = report.failed,
            "broadcast sent"
        );
        Ok(report)
    }

    pub async fn decline_broadcast(&self, admin_id: UserId, broadcast_id: i32) -> AppResult<Broadcast> {
        self.ensure_admin(admin_id)?;
        let mut conn = self.conn()?;
        let broadcast = self.decide(&mut conn, broadcast_id, BroadcastStatus::Declined)?;

        tracing::info!(broadcast_id, "broadcast declined");
        Ok(broadcast)
    }

    fn admin_id(&self) -> AppResult<UserId> {
        self.config
            .admin_id
            .ok_or_else(|| AppError::new(ErrorCode::AdminNotConfigured, "no admin is configured to review broadcasts"))
    }

    fn ensure_admin(&self, user_id: UserId) -> AppResult<()> {
        if self.admin_id()? != user_id {
            return Err(AppError::forbidden("only the admin can review broadcasts"));
        }
        Ok(())
    }

    fn decide(
        &self,
        conn: &mut diesel::SqliteConnection,
        broadcast_id: i32,
        status: BroadcastStatus,
    ) -> AppResult<Broadcast> {
        if store::broadcasts::find(conn, broadcast_id)?.is_none() {
            return Err(AppError::new(
                ErrorCode::BroadcastNotFound,
                format!("broadcast {broadcast_id} not found"),
            ));
        }
        store::broadcasts::decide(conn, broadcast_id, status, store::now())?.ok_or_else(|| {
            AppError::new(ErrorCode::BroadcastAlreadyDecided, "broadcast was already reviewed")
        })
    }
}
