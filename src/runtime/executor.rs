//! Per-chat runtime executor

use crate::chain::ChainGateway;
use crate::payload::PayloadBuilder;
use crate::render::{self, OutboundMessage};
use crate::session::{Session, SessionStore};
use crate::state_machine::{transition, Effect, Event, FlowState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// An event for one chat plus the channel its replies go back on
#[derive(Debug)]
pub struct InboundRequest {
    pub event: Event,
    pub reply_tx: oneshot::Sender<Vec<OutboundMessage>>,
}

/// Single owner of one chat's session.
///
/// Events are handled strictly one at a time, including any chain queries
/// they trigger, so a chat's read-modify-write of its session is never
/// interleaved with another event for the same chat.
pub struct ChatRuntime<G, S>
where
    G: ChainGateway + 'static,
    S: SessionStore + 'static,
{
    chat_id: String,
    gateway: Arc<G>,
    sessions: Arc<S>,
    payloads: Arc<PayloadBuilder>,
    event_rx: mpsc::Receiver<InboundRequest>,
}

impl<G, S> ChatRuntime<G, S>
where
    G: ChainGateway + 'static,
    S: SessionStore + 'static,
{
    pub fn new(
        chat_id: impl Into<String>,
        gateway: Arc<G>,
        sessions: Arc<S>,
        payloads: Arc<PayloadBuilder>,
        event_rx: mpsc::Receiver<InboundRequest>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            gateway,
            sessions,
            payloads,
            event_rx,
        }
    }

    /// Handle requests until the channel closes or none arrives for `idle`.
    pub async fn run(&mut self, idle: Duration) {
        tracing::debug!(chat_id = %self.chat_id, "Starting chat runtime");

        while let Ok(Some(request)) = tokio::time::timeout(idle, self.event_rx.recv()).await {
            let replies = self.handle_event(request.event).await;
            // The caller may have gone away; the session is already updated
            let _ = request.reply_tx.send(replies);
        }

        tracing::debug!(chat_id = %self.chat_id, "Chat runtime idle");
    }

    /// Stop accepting requests. Anything still queued is dropped unanswered;
    /// its sender sees the closed channel and resubmits to a new runtime.
    pub fn close(&mut self) {
        self.event_rx.close();
        let mut bounced = 0;
        while let Ok(request) = self.event_rx.try_recv() {
            drop(request);
            bounced += 1;
        }
        if bounced > 0 {
            tracing::debug!(chat_id = %self.chat_id, bounced, "Returned queued events on close");
        }
    }

    /// Run one inbound event to completion and collect the replies.
    ///
    /// Every failure is converted to a rendered message here; nothing
    /// escapes to the caller.
    pub async fn handle_event(&self, event: Event) -> Vec<OutboundMessage> {
        let mut outbound = Vec::new();

        let mut state = match self.sessions.get(&self.chat_id).await {
            Ok(session) => session.map(|s| s.state).unwrap_or_default(),
            Err(e) => {
                tracing::error!(chat_id = %self.chat_id, error = %e, "Failed to load session");
                outbound.push(render::generic_error());
                return outbound;
            }
        };

        // Effects may produce follow-up events (chain results); process them in a loop
        let mut events = vec![event];

        while let Some(current) = events.pop() {
            let event_name = current.name();
            let result = match transition(&state, current) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(
                        chat_id = %self.chat_id,
                        state = state.name(),
                        event = event_name,
                        error = %e,
                        "Rejected event"
                    );
                    self.abandon_flow().await;
                    outbound.push(render::generic_error());
                    return outbound;
                }
            };

            if result.new_state != state {
                tracing::debug!(
                    chat_id = %self.chat_id,
                    from = state.name(),
                    to = result.new_state.name(),
                    "Flow transition"
                );
            }
            state = result.new_state;

            for effect in result.effects {
                match self.execute_effect(&state, effect, &mut outbound).await {
                    Ok(Some(next)) => events.push(next),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(chat_id = %self.chat_id, error = %e, "Effect failed");
                        self.abandon_flow().await;
                        outbound.push(render::generic_error());
                        return outbound;
                    }
                }
            }
        }

        outbound
    }

    async fn execute_effect(
        &self,
        state: &FlowState,
        effect: Effect,
        outbound: &mut Vec<OutboundMessage>,
    ) -> Result<Option<Event>, String> {
        match effect {
            Effect::Reply(message) => {
                outbound.push(message);
                Ok(None)
            }

            Effect::PersistSession => {
                self.sessions
                    .set(Session::new(&self.chat_id, state.clone()))
                    .await?;
                Ok(None)
            }

            Effect::TouchSession => {
                self.sessions.touch(&self.chat_id).await?;
                Ok(None)
            }

            Effect::ClearSession => {
                self.sessions.clear(&self.chat_id).await?;
                Ok(None)
            }

            Effect::FetchStrategies { purpose } => {
                let result = self.gateway.get_strategies().await;
                Ok(Some(Event::StrategiesFetched { purpose, result }))
            }

            Effect::FetchPosition { address } => {
                let (vault, resources) = tokio::join!(
                    self.gateway.get_vault_state(),
                    self.gateway.get_account_resources(&address)
                );
                Ok(Some(Event::PositionFetched { vault, resources }))
            }

            Effect::EmitPayload {
                action,
                amount,
                strategy,
            } => {
                match self
                    .payloads
                    .prepare(action.as_str(), &amount, strategy.as_ref())
                {
                    Ok(prepared) => {
                        tracing::info!(
                            chat_id = %self.chat_id,
                            action = prepared.action.as_str(),
                            function = prepared.descriptor.function(),
                            amount = %amount,
                            "Transaction payload ready"
                        );
                        outbound.push(render::payload_ready(&prepared));
                    }
                    Err(e) => {
                        tracing::error!(
                            chat_id = %self.chat_id,
                            error = %e,
                            "Unexpected action reached the payload builder"
                        );
                        self.sessions.clear(&self.chat_id).await?;
                        outbound.push(render::generic_error());
                    }
                }
                Ok(None)
            }
        }
    }

    /// Drop whatever flow was in progress after a failure
    async fn abandon_flow(&self) {
        if let Err(e) = self.sessions.clear(&self.chat_id).await {
            tracing::error!(chat_id = %self.chat_id, error = %e, "Failed to clear session");
        }
    }
}
