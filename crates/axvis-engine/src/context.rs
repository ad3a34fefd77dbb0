//! Frame context
//!
//! One frame's complete subsystem instance: document, communicator,
//! controller. Contexts share nothing but the message hub and the page
//! clock.

use std::cell::RefCell;
use std::rc::Rc;

use axvis_comm::{FrameCommunicator, SharedHub};
use axvis_dom::{Document, FrameId};
use axvis_draw::{DrawingController, SharedClock, VisibilityPollConfig};

/// One frame's document, communicator, and drawing controller, wired
/// together at construction. The controller subscribes to the draw
/// command during initialization, before any message can arrive.
pub struct FrameContext {
    frame: FrameId,
    document: Rc<RefCell<Document>>,
    communicator: Rc<RefCell<FrameCommunicator>>,
    controller: Rc<RefCell<DrawingController>>,
}

impl FrameContext {
    pub fn new(hub: &SharedHub, clock: &SharedClock, url: &str, poll: VisibilityPollConfig) -> Self {
        let frame = hub.borrow_mut().register();
        let mut communicator = FrameCommunicator::new(hub.clone(), frame);
        let document = Rc::new(RefCell::new(Document::new(url)));

        let controller = Rc::new(RefCell::new(DrawingController::new(
            document.clone(),
            communicator.messenger(),
            clock.clone(),
            poll,
        )));
        DrawingController::initialize(&controller, &mut communicator);

        tracing::debug!(?frame, url, "frame context created");
        Self {
            frame,
            document,
            communicator: Rc::new(RefCell::new(communicator)),
            controller,
        }
    }

    /// This context's frame id
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Shared handle to this frame's document
    pub fn document(&self) -> Rc<RefCell<Document>> {
        self.document.clone()
    }

    /// Shared handle to this frame's drawing controller
    pub fn controller(&self) -> Rc<RefCell<DrawingController>> {
        self.controller.clone()
    }

    /// Deliver this frame's queued messages, each handled to
    /// completion in arrival order. Returns how many were processed.
    pub fn pump(&self) -> usize {
        self.communicator.borrow_mut().pump()
    }

    /// Drive due visibility intervals against the page clock
    pub fn tick(&self) -> usize {
        self.controller.borrow_mut().tick()
    }

    /// Number of overlay nodes currently drawn in this frame
    pub fn overlay_count(&self) -> usize {
        self.document
            .borrow()
            .elements_with_attribute("data-rule")
            .len()
    }
}
