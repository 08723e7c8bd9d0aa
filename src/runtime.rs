//! Runtime for executing conversations
//!
//! Each conversation gets its own task and inbox, so its events are handled
//! strictly in order while distinct conversations run concurrently. The only
//! state shared between them is the immutable catalog and the transport.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::catalog::MenuCatalog;
use crate::config::BotConfig;
use crate::state_machine::{ConvContext, ConvState, Effect, Event};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;

/// Notifications about processed events, for observers and tests
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The event was handled; effects were handed to the transport
    Transitioned {
        state: ConvState,
        effects: Vec<Effect>,
    },
    /// No transition exists for the event in the current state
    Ignored { reason: String },
    DeliveryFailed { message: String },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Conversation {0} is no longer running")]
    ConversationClosed(String),
}

/// What the transport knows about a conversation at first contact
#[derive(Debug, Clone, Default)]
pub struct ConversationProfile {
    pub user_name: Option<String>,
}

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<RuntimeEvent>,
}

struct RuntimeEntry {
    handle: ConversationHandle,
    task: JoinHandle<()>,
}

/// Manager for all conversation runtimes
pub struct RuntimeManager<T: Transport + 'static> {
    catalog: Arc<MenuCatalog>,
    transport: Arc<T>,
    config: BotConfig,
    runtimes: RwLock<HashMap<String, RuntimeEntry>>,
}

impl<T: Transport + 'static> RuntimeManager<T> {
    pub fn new(catalog: Arc<MenuCatalog>, transport: Arc<T>, config: BotConfig) -> Self {
        Self {
            catalog,
            transport,
            config,
            runtimes: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create a runtime for a conversation.
    ///
    /// The profile only matters on first contact.
    pub async fn open(
        &self,
        conversation_id: &str,
        profile: &ConversationProfile,
    ) -> ConversationHandle {
        // Check if already running
        {
            let runtimes = self.runtimes.read().await;
            if let Some(entry) = runtimes.get(conversation_id) {
                return entry.handle.clone();
            }
        }

        let mut runtimes = self.runtimes.write().await;
        // Another caller may have won the race for the write lock
        if let Some(entry) = runtimes.get(conversation_id) {
            return entry.handle.clone();
        }

        let context = ConvContext::new(conversation_id, self.config.dice_policy)
            .with_user_name(profile.user_name.clone());

        let (event_tx, event_rx) = mpsc::channel(self.config.event_buffer);
        let (broadcast_tx, _) = broadcast::channel(128);

        let runtime = ConversationRuntime::new(
            context,
            self.catalog.clone(),
            self.transport.clone(),
            self.conversation_rng(conversation_id),
            event_rx,
            broadcast_tx.clone(),
        );

        // Start runtime in background
        let conv_id = conversation_id.to_string();
        let task = tokio::spawn(async move {
            runtime.run().await;
            tracing::debug!(conv_id = %conv_id, "Conversation task finished");
        });

        let handle = ConversationHandle {
            event_tx,
            broadcast_tx,
        };
        runtimes.insert(
            conversation_id.to_string(),
            RuntimeEntry {
                handle: handle.clone(),
                task,
            },
        );
        tracing::info!(conv_id = %conversation_id, active = runtimes.len(), "Conversation opened");

        handle
    }

    /// Send an event to a conversation, starting it on first contact
    pub async fn send_event(&self, conversation_id: &str, event: Event) -> Result<(), RuntimeError> {
        let handle = self
            .open(conversation_id, &ConversationProfile::default())
            .await;
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::ConversationClosed(conversation_id.to_string()))
    }

    /// Subscribe to conversation updates
    pub async fn subscribe(&self, conversation_id: &str) -> broadcast::Receiver<RuntimeEvent> {
        let handle = self
            .open(conversation_id, &ConversationProfile::default())
            .await;
        handle.broadcast_tx.subscribe()
    }

    pub async fn active_conversations(&self) -> usize {
        self.runtimes.read().await.len()
    }

    /// Close every inbox and wait for queued events to drain
    pub async fn shutdown(&self) {
        let entries: Vec<(String, RuntimeEntry)> = self.runtimes.write().await.drain().collect();
        for (conv_id, entry) in entries {
            drop(entry.handle);
            if let Err(e) = entry.task.await {
                tracing::error!(conv_id = %conv_id, error = %e, "Conversation task panicked");
            }
        }
    }

    /// Seeded runs get a distinct, reproducible stream per conversation
    fn conversation_rng(&self, conversation_id: &str) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                conversation_id.hash(&mut hasher);
                StdRng::seed_from_u64(seed ^ hasher.finish())
            }
            None => StdRng::from_entropy(),
        }
    }
}
