//! Wire messages
//!
//! The envelope exchanged between frames, and the error surface that
//! replaces exceptions at the frame boundary.

use axvis_dom::FrameId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope posted to a frame's inbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowMessage {
    /// Sender-scoped id; responses echo it in `response_to`
    pub message_id: u64,
    /// Logical command name
    pub command: String,
    /// Frame that posted the message
    pub source: FrameId,
    /// Command payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Failure carried instead of (or alongside) a payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorMessageContent>,
    /// Present on responses: the message_id being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_to: Option<u64>,
}

impl WindowMessage {
    /// Is this a response to an earlier request?
    pub fn is_response(&self) -> bool {
        self.response_to.is_some()
    }
}

/// A failure flattened for the wire. Exceptions cannot cross a
/// serialization boundary, so this is what a remote handler's failure
/// looks like to the sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessageContent {
    /// Coarse failure category
    pub error_type: String,
    /// Human-readable description
    pub message: String,
}

impl ErrorMessageContent {
    /// Wrap a handler failure
    pub fn handler_error(message: impl Into<String>) -> Self {
        Self {
            error_type: "HandlerError".to_string(),
            message: message.into(),
        }
    }
}

/// An outbound request naming the target iframe's content window.
///
/// `frame: None` models an iframe whose content window is already gone;
/// sending to it is a silent no-op, because frames detach asynchronously
/// between enumeration and send.
#[derive(Debug, Clone)]
pub struct MessageRequest {
    pub command: String,
    pub frame: Option<FrameId>,
    pub message: Option<Value>,
}
