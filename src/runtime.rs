//! Runtime for executing chat flows
//!
//! Each chat gets its own `ChatRuntime` task fed through a channel. Different
//! chats proceed concurrently; events for one chat are processed in order,
//! one at a time. A runtime that sits idle is retired; the chat's session
//! lives in the store, so the next event simply starts a fresh one.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::{ChatRuntime, InboundRequest};

use crate::chain::{ChainGateway, LoggingGateway};
use crate::payload::PayloadBuilder;
use crate::render::OutboundMessage;
use crate::session::{InMemorySessionStore, SessionStore};
use crate::state_machine::Event;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, RwLock};

/// How long a chat runtime waits for its next event before retiring
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Type alias for production runtime with concrete implementations
pub type ProductionManager = FlowManager<LoggingGateway, InMemorySessionStore>;

/// Handle to a running chat runtime
#[derive(Clone)]
pub struct ChatHandle {
    pub event_tx: mpsc::Sender<InboundRequest>,
}

/// Manager for all chat runtimes
pub struct FlowManager<G, S>
where
    G: ChainGateway + 'static,
    S: SessionStore + 'static,
{
    gateway: Arc<G>,
    sessions: Arc<S>,
    payloads: Arc<PayloadBuilder>,
    chats: Arc<RwLock<HashMap<String, ChatHandle>>>,
    idle_timeout: Duration,
}

impl<G, S> FlowManager<G, S>
where
    G: ChainGateway + 'static,
    S: SessionStore + 'static,
{
    pub fn new(gateway: G, sessions: Arc<S>, payloads: PayloadBuilder) -> Self {
        Self {
            gateway: Arc::new(gateway),
            sessions,
            payloads: Arc::new(payloads),
            chats: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn sessions(&self) -> &Arc<S> {
        &self.sessions
    }

    /// Get or create the runtime for a chat
    async fn get_or_create(&self, chat_id: &str) -> ChatHandle {
        {
            let chats = self.chats.read().await;
            if let Some(handle) = chats.get(chat_id) {
                return handle.clone();
            }
        }

        let mut chats = self.chats.write().await;
        // Another event may have created it while we waited for the lock
        if let Some(handle) = chats.get(chat_id) {
            return handle.clone();
        }

        let (event_tx, event_rx) = mpsc::channel(32);
        let mut runtime = ChatRuntime::new(
            chat_id,
            self.gateway.clone(),
            self.sessions.clone(),
            self.payloads.clone(),
            event_rx,
        );

        let id = chat_id.to_string();
        let registry = self.chats.clone();
        let idle = self.idle_timeout;
        tokio::spawn(async move {
            runtime.run(idle).await;

            // Close and unregister under the map lock so no caller can pick
            // up this handle once it stops accepting events
            let mut chats = registry.write().await;
            runtime.close();
            if chats
                .get(&id)
                .is_some_and(|handle| handle.event_tx.is_closed())
            {
                chats.remove(&id);
            }
            drop(chats);
            tracing::debug!(chat_id = %id, "Chat runtime retired");
        });

        let handle = ChatHandle { event_tx };
        chats.insert(chat_id.to_string(), handle.clone());
        handle
    }

    /// Send an event to a chat and wait for its replies
    pub async fn dispatch(
        &self,
        chat_id: &str,
        event: Event,
    ) -> Result<Vec<OutboundMessage>, String> {
        // A retired runtime leaves a closed channel behind; start a new one
        for _ in 0..3 {
            let handle = self.get_or_create(chat_id).await;
            let (reply_tx, reply_rx) = oneshot::channel();
            let request = InboundRequest {
                event: event.clone(),
                reply_tx,
            };

            if handle.event_tx.send(request).await.is_err() {
                tracing::debug!(chat_id, "Chat runtime retired, restarting");
                self.remove_closed(chat_id).await;
                continue;
            }

            match reply_rx.await {
                Ok(replies) => return Ok(replies),
                // Queued just as the runtime retired; it was never handled
                Err(_) if handle.event_tx.is_closed() => {
                    tracing::debug!(chat_id, "Chat runtime retired with event queued, resending");
                    self.remove_closed(chat_id).await;
                }
                Err(_) => {
                    return Err(format!("Chat runtime for {chat_id} stopped before replying"));
                }
            }
        }

        Err(format!("Chat runtime for {chat_id} is unavailable"))
    }

    async fn remove_closed(&self, chat_id: &str) {
        let mut chats = self.chats.write().await;
        if chats
            .get(chat_id)
            .is_some_and(|handle| handle.event_tx.is_closed())
        {
            chats.remove(chat_id);
        }
    }

    /// Number of chats with a live runtime
    pub async fn active_chats(&self) -> usize {
        self.chats.read().await.len()
    }
}
