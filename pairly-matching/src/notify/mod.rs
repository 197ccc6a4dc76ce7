//! Outbound messages to users. Delivery is fire-and-forget: failures are logged and counted,
//! never propagated into the ledger write that triggered them.

pub mod log;
pub mod memory;
pub mod messages;
mod telegram;

use std::sync::Arc;

use async_trait::async_trait;
use pairly_shared::clients::telegram::TelegramError;

use crate::models::UserId;

pub use self::log::LogTransport;
pub use memory::MemoryTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Photo { handle: String, caption: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("recipient {0} is unreachable")]
    Unreachable(UserId),

    #[error(transparent)]
    Telegram(#[from] TelegramError),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, user_id: UserId, content: &Content) -> Result<(), DeliveryError>;
}

#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn Transport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Delivers one message and reports whether it arrived.
    pub async fn send(&self, user_id: UserId, content: Content, kind: &'static str) -> bool {
        match self.transport.deliver(user_id, &content).await {
            Ok(()) => {
                metrics::counter!("pairly_deliveries_total", "status" => "delivered").increment(1);
                tracing::debug!(user_id, kind, "notification delivered");
                true
            }
            Err(err) => {
                metrics::counter!("pairly_deliveries_total", "status" => "failed").increment(1);
                tracing::warn!(user_id, kind, error = %err, "delivery failed");
                false
            }
        }
    }
}
