//! Trait abstractions for runtime I/O
//!
//! The transport is the only outward seam; tests swap in a recording mock.

use crate::state_machine::Effect;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failure to hand an effect to the chat transport
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Delivers effects (menus, messages) to a conversation
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, conversation_id: &str, effect: &Effect) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn deliver(&self, conversation_id: &str, effect: &Effect) -> Result<(), TransportError> {
        (**self).deliver(conversation_id, effect).await
    }
}
