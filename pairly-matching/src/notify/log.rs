use async_trait::async_trait;

use super::{Content, DeliveryError, Transport};
use crate::models::UserId;

/// Writes each notification to the log and keeps nothing. Used when no bot token is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    async fn deliver(&self, user_id: UserId, content: &Content) -> Result<(), DeliveryError> {
        match content {
            Content::Text(text) => tracing::info!(user_id, text = %text, "notification"),
            Content::Photo { handle, caption } => {
                tracing::info!(user_id, photo = %handle, caption = %caption, "photo notification")
            }
        }
        Ok(())
    }
}
