//! Frame communicator
//!
//! One instance per frame context. Commands route to subscribed
//! handlers; responses route back to the callback registered when the
//! request was sent. Handler failures are flattened into
//! [`ErrorMessageContent`] and posted back to the source frame.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use axvis_dom::FrameId;
use serde_json::Value;

use crate::hub::{FrameMessenger, SharedHub};
use crate::message::{ErrorMessageContent, MessageRequest, WindowMessage};
use crate::CommError;

/// Handler for an incoming command. Returning `Err` sends an error
/// response to the message source; it never unwinds across the frame
/// boundary.
pub type CommandHandler =
    dyn FnMut(Option<&Value>, Option<&ErrorMessageContent>, Responder) -> Result<(), String>;

/// Callback for the response to an outbound request. Invoked at most
/// once; a request that is never answered simply never invokes it.
pub type ResponseCallback = Box<dyn FnOnce(Option<Value>, Option<ErrorMessageContent>)>;

/// One-shot acknowledgement handle passed to command handlers.
/// Dropping it without responding is legal.
pub struct Responder {
    messenger: FrameMessenger,
    target: FrameId,
    command: String,
    respond_to: u64,
}

impl Responder {
    /// Post a response envelope back to the message source
    pub fn respond(self, payload: Option<Value>) {
        let sent = self.messenger.send_response(
            self.target,
            &self.command,
            self.respond_to,
            payload,
            None,
        );
        if let Err(err) = sent {
            tracing::debug!(%err, "response could not be serialized");
        }
    }
}

/// Per-frame command subscription and correlation state
pub struct FrameCommunicator {
    messenger: FrameMessenger,
    subscriptions: HashMap<String, Rc<RefCell<Box<CommandHandler>>>>,
    pending: HashMap<u64, ResponseCallback>,
}

impl FrameCommunicator {
    pub fn new(hub: SharedHub, frame: FrameId) -> Self {
        Self {
            messenger: FrameMessenger::new(hub, frame),
            subscriptions: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// The frame this communicator belongs to
    pub fn frame(&self) -> FrameId {
        self.messenger.frame()
    }

    /// Clone of the sending half, for collaborators that emit messages
    /// but never pump the inbox
    pub fn messenger(&self) -> FrameMessenger {
        self.messenger.clone()
    }

    /// Register the handler for a command. One handler per command;
    /// re-registering replaces the previous handler (a command is never
    /// delivered twice for one envelope).
    pub fn subscribe(&mut self, command: &str, handler: Box<CommandHandler>) {
        let previous = self
            .subscriptions
            .insert(command.to_string(), Rc::new(RefCell::new(handler)));
        if previous.is_some() {
            tracing::debug!(command, "subscription replaced");
        }
    }

    /// Fire-and-forget send. A request naming a detached content window
    /// (`frame: None`) is a silent no-op.
    pub fn send_message(&mut self, request: MessageRequest) -> Result<(), CommError> {
        self.messenger
            .send_request(request.frame, &request.command, request.message)?;
        Ok(())
    }

    /// Send and register a callback for the eventual response. The
    /// callback may never fire; nothing ever blocks waiting for it.
    pub fn send_message_with_callback(
        &mut self,
        request: MessageRequest,
        on_response: ResponseCallback,
    ) -> Result<(), CommError> {
        let id = self
            .messenger
            .send_request(request.frame, &request.command, request.message)?;
        if let Some(id) = id {
            self.pending.insert(id, on_response);
        }
        Ok(())
    }

    /// Drain this frame's inbox and dispatch every queued envelope in
    /// arrival order, each handled to completion before the next.
    /// Returns the number of envelopes processed.
    pub fn pump(&mut self) -> usize {
        let raw = self.messenger.drain_inbox();
        let mut processed = 0;

        for text in raw {
            processed += 1;
            let msg: WindowMessage = match serde_json::from_str(&text) {
                Ok(msg) => msg,
                Err(err) => {
                    tracing::debug!(%err, "malformed envelope dropped");
                    continue;
                }
            };

            if let Some(request_id) = msg.response_to {
                match self.pending.remove(&request_id) {
                    Some(callback) => callback(msg.payload, msg.error),
                    None => {
                        tracing::debug!(request_id, "response with no registered callback")
                    }
                }
                continue;
            }

            let Some(handler) = self.subscriptions.get(&msg.command).map(Rc::clone) else {
                tracing::debug!(command = %msg.command, "no subscription for command");
                continue;
            };

            let responder = Responder {
                messenger: self.messenger.clone(),
                target: msg.source,
                command: msg.command.clone(),
                respond_to: msg.message_id,
            };
            let outcome = {
                let mut handler = handler.borrow_mut();
                (&mut **handler)(msg.payload.as_ref(), msg.error.as_ref(), responder)
            };

            if let Err(description) = outcome {
                let error = ErrorMessageContent::handler_error(description);
                let sent = self.messenger.send_response(
                    msg.source,
                    &msg.command,
                    msg.message_id,
                    None,
                    Some(error),
                );
                if let Err(err) = sent {
                    tracing::debug!(%err, "error response could not be serialized");
                }
            }
        }
        processed
    }
}
