use async_trait::async_trait;
use pairly_shared::clients::telegram::TelegramClient;

use super::{Content, DeliveryError, Transport};
use crate::models::UserId;

#[async_trait]
impl Transport for TelegramClient {
    async fn deliver(&self, user_id: UserId, content: &Content) -> Result<(), DeliveryError> {
        match content {
            Content::Text(text) => self.send_message(user_id, text).await?,
            Content::Photo { handle, caption } => {
                if let Err(err) = self.send_photo(user_id, handle, caption).await {
                    tracing::warn!(user_id, error = %err, "photo unavailable, sending caption as text");
                    self.send_message(user_id, caption).await?;
                }
            }
        }
        Ok(())
    }
}
