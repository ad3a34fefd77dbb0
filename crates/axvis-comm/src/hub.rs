//! Message hub
//!
//! The shared post office between frame contexts. Each registered frame
//! owns an inbox of serialized envelopes; posting to an unregistered
//! frame drops the message, the same way a closed window swallows a
//! postMessage. The hub never interprets message content.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use axvis_dom::FrameId;

use crate::message::WindowMessage;
use crate::CommError;

/// Shared handle to the hub
pub type SharedHub = Rc<RefCell<MessageHub>>;

/// Per-frame inboxes of serialized envelopes
#[derive(Debug, Default)]
pub struct MessageHub {
    inboxes: HashMap<FrameId, VecDeque<String>>,
    next_frame: u64,
    next_message_id: u64,
}

impl MessageHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared, single-context handle
    pub fn shared() -> SharedHub {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Register a new frame context and allocate its id
    pub fn register(&mut self) -> FrameId {
        let frame = FrameId(self.next_frame);
        self.next_frame += 1;
        self.inboxes.insert(frame, VecDeque::new());
        frame
    }

    /// Remove a frame context; queued and future messages to it are dropped
    pub fn unregister(&mut self, frame: FrameId) {
        self.inboxes.remove(&frame);
    }

    /// Allocate a message id for correlation
    pub fn allocate_message_id(&mut self) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    /// Post a serialized envelope to a frame's inbox
    pub fn post(&mut self, target: FrameId, envelope: String) {
        match self.inboxes.get_mut(&target) {
            Some(inbox) => inbox.push_back(envelope),
            None => {
                tracing::debug!(?target, "message to unregistered frame dropped");
            }
        }
    }

    /// Take all queued envelopes for a frame, in arrival order
    pub fn drain(&mut self, frame: FrameId) -> Vec<String> {
        self.inboxes
            .get_mut(&frame)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Is any inbox non-empty?
    pub fn has_pending(&self) -> bool {
        self.inboxes.values().any(|inbox| !inbox.is_empty())
    }
}

/// The sending half of one frame's channel. Cheap to clone; safe to hand
/// to anything that needs to emit messages without owning the inbox.
#[derive(Clone)]
pub struct FrameMessenger {
    hub: SharedHub,
    frame: FrameId,
}

impl FrameMessenger {
    pub fn new(hub: SharedHub, frame: FrameId) -> Self {
        Self { hub, frame }
    }

    /// The frame this messenger sends as
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Serialize and post a request envelope. Returns the allocated
    /// message id, or None when `target` is absent (detached content
    /// window - a silent no-op).
    pub fn send_request(
        &self,
        target: Option<FrameId>,
        command: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<Option<u64>, CommError> {
        let Some(target) = target else {
            tracing::debug!(command, "send skipped: iframe has no content window");
            return Ok(None);
        };

        let mut hub = self.hub.borrow_mut();
        let message_id = hub.allocate_message_id();
        let envelope = WindowMessage {
            message_id,
            command: command.to_string(),
            source: self.frame,
            payload,
            error: None,
            response_to: None,
        };
        hub.post(target, serde_json::to_string(&envelope)?);
        Ok(Some(message_id))
    }

    /// Serialize and post a response envelope
    pub fn send_response(
        &self,
        target: FrameId,
        command: &str,
        response_to: u64,
        payload: Option<serde_json::Value>,
        error: Option<crate::ErrorMessageContent>,
    ) -> Result<(), CommError> {
        let mut hub = self.hub.borrow_mut();
        let message_id = hub.allocate_message_id();
        let envelope = WindowMessage {
            message_id,
            command: command.to_string(),
            source: self.frame,
            payload,
            error,
            response_to: Some(response_to),
        };
        hub.post(target, serde_json::to_string(&envelope)?);
        Ok(())
    }

    /// Take this frame's queued envelopes
    pub fn drain_inbox(&self) -> Vec<String> {
        self.hub.borrow_mut().drain(self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_post_drain() {
        let mut hub = MessageHub::new();
        let a = hub.register();
        let b = hub.register();
        assert_ne!(a, b);

        hub.post(b, "one".to_string());
        hub.post(b, "two".to_string());
        assert!(hub.has_pending());

        assert_eq!(hub.drain(b), vec!["one", "two"]);
        assert!(hub.drain(b).is_empty());
        assert!(!hub.has_pending());
    }

    #[test]
    fn test_post_to_unregistered_is_dropped() {
        let mut hub = MessageHub::new();
        let a = hub.register();
        hub.unregister(a);

        hub.post(a, "lost".to_string());
        assert!(!hub.has_pending());
        assert!(hub.drain(a).is_empty());
    }

    #[test]
    fn test_messenger_detached_target_is_noop() {
        let hub = MessageHub::shared();
        let frame = hub.borrow_mut().register();
        let messenger = FrameMessenger::new(hub.clone(), frame);

        let id = messenger.send_request(None, "insights.draw", None).unwrap();
        assert!(id.is_none());
        assert!(!hub.borrow().has_pending());
    }

    #[test]
    fn test_messenger_roundtrip() {
        let hub = MessageHub::shared();
        let a = hub.borrow_mut().register();
        let b = hub.borrow_mut().register();

        let messenger = FrameMessenger::new(hub.clone(), a);
        let id = messenger
            .send_request(Some(b), "insights.draw", None)
            .unwrap()
            .unwrap();

        let raw = hub.borrow_mut().drain(b);
        assert_eq!(raw.len(), 1);
        let msg: WindowMessage = serde_json::from_str(&raw[0]).unwrap();
        assert_eq!(msg.message_id, id);
        assert_eq!(msg.source, a);
        assert_eq!(msg.command, "insights.draw");
    }
}
