//! axvis Comm - Cross-frame messaging
//!
//! Frames are isolated script contexts; the only channel between them is
//! posting a serialized message to another frame's inbox. This crate
//! models that channel and layers command subscription, request/response
//! correlation, and error translation on top of it.
//!
//! Nothing but JSON text ever crosses a frame boundary. In particular,
//! errors never propagate across frames as panics or `Result`s; they are
//! flattened into [`ErrorMessageContent`] on the wire.

mod communicator;
mod hub;
mod message;

pub use communicator::{CommandHandler, FrameCommunicator, ResponseCallback, Responder};
pub use hub::{FrameMessenger, MessageHub, SharedHub};
pub use message::{ErrorMessageContent, MessageRequest, WindowMessage};

/// Messaging error
#[derive(Debug, thiserror::Error)]
pub enum CommError {
    #[error("message serialization failed: {0}")]
    Encode(#[from] serde_json::Error),
}
