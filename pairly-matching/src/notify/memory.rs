use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::DashSet;

use super::{Content, DeliveryError, Transport};
use crate::models::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub user_id: UserId,
    pub content: Content,
}

/// Recording outbox for tests. Nothing is ever drained.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    outbox: Mutex<Vec<Delivered>>,
    unreachable: DashSet<UserId>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subsequent deliveries to `user_id` fail with `DeliveryError::Unreachable`.
    pub fn mark_unreachable(&self, user_id: UserId) {
        self.unreachable.insert(user_id);
    }

    pub fn sent(&self) -> Vec<Delivered> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn sent_to(&self, user_id: UserId) -> Vec<Content> {
        self.sent()
            .into_iter()
            .filter(|d| d.user_id == user_id)
            .map(|d| d.content)
            .collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn deliver(&self, user_id: UserId, content: &Content) -> Result<(), DeliveryError> {
        if self.unreachable.contains(&user_id) {
            return Err(DeliveryError::Unreachable(user_id));
        }

        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Delivered { user_id, content: content.clone() });
        Ok(())
    }
}
