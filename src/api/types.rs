//! API request and response types

use crate::payload::TransactionDescriptor;
use crate::render::OutboundMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free text or a `/command` typed into the chat
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

/// Menu button press
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub data: String,
}

/// Replies produced by one inbound event, in send order
#[derive(Debug, Serialize)]
pub struct ChatEventResponse {
    pub messages: Vec<OutboundMessage>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub chat_id: String,
    /// `idle` when no flow is in progress
    pub state: &'static str,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Query string of a hand-off link
#[derive(Debug, Deserialize)]
pub struct HandOffQuery {
    pub action: Option<String>,
    pub amount: Option<String>,
    pub vault: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HandOffResponse {
    pub action: &'static str,
    pub amount: String,
    pub vault: String,
    pub payload: TransactionDescriptor,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
