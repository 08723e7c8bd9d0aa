//! Conversation runtime executor

use super::traits::Transport;
use super::RuntimeEvent;

use crate::catalog::{MenuCatalog, ToolId};
use crate::state_machine::{transition, ConvContext, Conversation, Event};
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Owns one conversation's record and RNG and processes its events in order
pub struct ConversationRuntime<T>
where
    T: Transport + 'static,
{
    context: ConvContext,
    conversation: Conversation,
    catalog: Arc<MenuCatalog>,
    transport: Arc<T>,
    rng: StdRng,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<RuntimeEvent>,
}

impl<T> ConversationRuntime<T>
where
    T: Transport + 'static,
{
    pub fn new(
        context: ConvContext,
        catalog: Arc<MenuCatalog>,
        transport: Arc<T>,
        rng: StdRng,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            context,
            conversation: Conversation::new(),
            catalog,
            transport,
            rng,
            event_rx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(conv_id = %self.context.conversation_id, "Starting conversation runtime");

        // One event at a time, each handled to completion
        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event).await;
        }

        tracing::info!(conv_id = %self.context.conversation_id, "Conversation runtime stopped");
    }

    async fn process_event(&mut self, event: Event) {
        let conv_id = self.context.conversation_id.clone();
        let event_kind = event.kind();

        // Pure state transition
        let result = match transition(
            &self.conversation,
            &self.context,
            &self.catalog,
            &mut self.rng,
            event,
        ) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(
                    conv_id = %conv_id,
                    event = event_kind,
                    state = self.conversation.state.name(),
                    error = %e,
                    "Ignoring event"
                );
                let _ = self.broadcast_tx.send(RuntimeEvent::Ignored {
                    reason: e.to_string(),
                });
                return;
            }
        };

        let old_state = self.conversation.state;
        let effects = self.conversation.apply(result);

        if old_state != self.conversation.state {
            tracing::info!(
                conv_id = %conv_id,
                event = event_kind,
                from = old_state.name(),
                to = self.conversation.state.name(),
                tool = ?self.conversation.state.pending_tool().map(ToolId::as_str),
                "State changed"
            );
        }
        let attempts = self.conversation.scratch.invalid_attempts();
        if attempts > 0 {
            tracing::debug!(conv_id = %conv_id, attempts, "Input rejected, re-prompting");
        }

        for effect in &effects {
            if let Err(e) = self.transport.deliver(&conv_id, effect).await {
                tracing::warn!(conv_id = %conv_id, error = %e, "Failed to deliver effect");
                let _ = self.broadcast_tx.send(RuntimeEvent::DeliveryFailed {
                    message: e.to_string(),
                });
            }
        }

        let _ = self.broadcast_tx.send(RuntimeEvent::Transitioned {
            state: self.conversation.state,
            effects,
        });
    }
}
