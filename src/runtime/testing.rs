//! Mock implementations for testing
//!
//! These mocks enable integration testing without a real chat transport.

use super::traits::*;
use super::{ConversationProfile, RuntimeEvent, RuntimeManager};
use crate::catalog::MenuCatalog;
use crate::config::BotConfig;
use crate::state_machine::{Effect, Event};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Recording Transport
// ============================================================================

/// Transport that records every delivered effect
#[derive(Default)]
pub struct RecordingTransport {
    delivered: Mutex<Vec<(String, Effect)>>,
    /// When set, every delivery fails with this message
    fail_with: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        let transport = Self::default();
        *transport.fail_with.lock().unwrap() = Some(message.into());
        transport
    }

    /// Effects delivered to one conversation, in order
    pub fn effects_for(&self, conversation_id: &str) -> Vec<Effect> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == conversation_id)
            .map(|(_, effect)| effect.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(&self, conversation_id: &str, effect: &Effect) -> Result<(), TransportError> {
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(TransportError::new(message));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), effect.clone()));
        Ok(())
    }
}

// ============================================================================
// Test Harness
// ============================================================================

pub fn test_manager(transport: Arc<RecordingTransport>) -> RuntimeManager<RecordingTransport> {
    let config = BotConfig {
        rng_seed: Some(11),
        ..BotConfig::default()
    };
    RuntimeManager::new(Arc::new(MenuCatalog::standard()), transport, config)
}

/// Wait for the next processed (or ignored) event with timeout
pub async fn next_outcome(
    rx: &mut broadcast::Receiver<RuntimeEvent>,
    timeout: Duration,
) -> Option<RuntimeEvent> {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        match tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
            Ok(Ok(RuntimeEvent::DeliveryFailed { .. })) | Err(_) => continue,
            Ok(Ok(event)) => return Some(event),
            Ok(Err(_)) => return None,
        }
    }
    None
}

/// Send an event and wait until the runtime has processed it
pub async fn send_and_wait(
    manager: &RuntimeManager<RecordingTransport>,
    rx: &mut broadcast::Receiver<RuntimeEvent>,
    conversation_id: &str,
    event: Event,
) -> RuntimeEvent {
    manager
        .send_event(conversation_id, event)
        .await
        .expect("Failed to send event");
    next_outcome(rx, Duration::from_secs(2))
        .await
        .expect("Timed out waiting for the runtime")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MenuId;
    use crate::catalog::ToolId;
    use crate::state_machine::{Command, ConvState};

    fn state_of(event: &RuntimeEvent) -> ConvState {
        match event {
            RuntimeEvent::Transitioned { state, .. } => *state,
            other => panic!("Expected a transition, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_session() {
        let transport = Arc::new(RecordingTransport::new());
        let manager = test_manager(transport.clone());
        let mut rx = manager.subscribe("chat-1").await;

        let start = send_and_wait(&manager, &mut rx, "chat-1", Event::command(Command::Start)).await;
        assert_eq!(state_of(&start), ConvState::IdleMenu);

        let flip = send_and_wait(&manager, &mut rx, "chat-1", Event::select("coin_flip")).await;
        assert_eq!(state_of(&flip), ConvState::IdleMenu);

        let pick = send_and_wait(&manager, &mut rx, "chat-1", Event::select("random_number")).await;
        assert_eq!(
            state_of(&pick),
            ConvState::AwaitingInput {
                pending_tool: ToolId::RandomNumber
            }
        );

        let done = send_and_wait(&manager, &mut rx, "chat-1", Event::text("1 10")).await;
        assert_eq!(state_of(&done), ConvState::IdleMenu);

        let effects = transport.effects_for("chat-1");
        // greeting menu, coin result, prompt, number result, menu
        assert_eq!(effects.len(), 5);
        assert!(matches!(
            effects[0],
            Effect::RenderMenu {
                menu: MenuId::Root,
                ..
            }
        ));
        assert_eq!(effects[4], Effect::menu(MenuId::Root));
    }

    #[tokio::test]
    async fn test_ignored_event_keeps_state() {
        let transport = Arc::new(RecordingTransport::new());
        let manager = test_manager(transport.clone());
        let mut rx = manager.subscribe("chat-2").await;

        let outcome = send_and_wait(&manager, &mut rx, "chat-2", Event::text("hello?")).await;
        assert!(matches!(outcome, RuntimeEvent::Ignored { .. }));
        assert!(transport.effects_for("chat-2").is_empty());

        let next = send_and_wait(&manager, &mut rx, "chat-2", Event::select("dice_menu")).await;
        assert_eq!(state_of(&next), ConvState::DiceSubmenu);
    }

    #[tokio::test]
    async fn test_conversations_are_independent() {
        let transport = Arc::new(RecordingTransport::new());
        let manager = test_manager(transport.clone());
        let mut rx_a = manager.subscribe("a").await;
        let mut rx_b = manager.subscribe("b").await;

        send_and_wait(&manager, &mut rx_a, "a", Event::select("list_choice")).await;
        let b = send_and_wait(&manager, &mut rx_b, "b", Event::text("x\ny")).await;
        assert!(matches!(b, RuntimeEvent::Ignored { .. }));

        let a = send_and_wait(&manager, &mut rx_a, "a", Event::text("x\ny")).await;
        assert_eq!(state_of(&a), ConvState::IdleMenu);
        assert_eq!(manager.active_conversations().await, 2);
        assert!(transport.effects_for("b").is_empty());
    }

    #[tokio::test]
    async fn test_events_processed_in_order() {
        let transport = Arc::new(RecordingTransport::new());
        let manager = test_manager(transport.clone());
        let mut rx = manager.subscribe("ordered").await;

        // Queue without waiting; the inbox preserves order
        for event in [
            Event::select("team_divider"),
            Event::text("A\nB\nC\n\n2"),
            Event::command(Command::Help),
        ] {
            manager.send_event("ordered", event).await.unwrap();
        }
        let mut states = Vec::new();
        for _ in 0..3 {
            let outcome = next_outcome(&mut rx, Duration::from_secs(2)).await.unwrap();
            states.push(state_of(&outcome));
        }
        assert_eq!(
            states,
            vec![
                ConvState::AwaitingInput {
                    pending_tool: ToolId::TeamDivider
                },
                ConvState::IdleMenu,
                ConvState::IdleMenu,
            ]
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_still_advances_state() {
        let transport = Arc::new(RecordingTransport::failing("network down"));
        let manager = test_manager(transport);
        let mut rx = manager.subscribe("flaky").await;

        let outcome = send_and_wait(&manager, &mut rx, "flaky", Event::select("password_generator")).await;
        assert_eq!(
            state_of(&outcome),
            ConvState::AwaitingInput {
                pending_tool: ToolId::PasswordGenerator
            }
        );
    }

    #[tokio::test]
    async fn test_profile_used_in_greeting() {
        let transport = Arc::new(RecordingTransport::new());
        let manager = test_manager(transport.clone());
        let profile = ConversationProfile {
            user_name: Some("Grace".to_string()),
        };
        let handle = manager.open("named", &profile).await;
        let mut rx = handle.broadcast_tx.subscribe();
        drop(handle);

        send_and_wait(&manager, &mut rx, "named", Event::command(Command::Start)).await;
        match &transport.effects_for("named")[0] {
            Effect::RenderMenu { header_text, .. } => assert!(header_text.contains("Grace")),
            other => panic!("Expected greeting menu, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_events() {
        let transport = Arc::new(RecordingTransport::new());
        let manager = test_manager(transport.clone());

        manager.send_event("drain", Event::command(Command::Start)).await.unwrap();
        manager.send_event("drain", Event::select("yes_no")).await.unwrap();
        manager.shutdown().await;

        assert_eq!(transport.effects_for("drain").len(), 2);
        assert_eq!(manager.active_conversations().await, 0);
    }
}
