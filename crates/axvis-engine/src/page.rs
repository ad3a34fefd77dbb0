//! Page host
//!
//! Owns the hub, the clock, and every frame context. Plays the role of
//! the browser shell: it creates and detaches iframes, moves queued
//! messages until the page goes quiet, and advances time.

use std::cell::Cell;
use std::rc::Rc;

use axvis_comm::MessageHub;
use axvis_comm::SharedHub;
use axvis_dom::FrameId;
use axvis_draw::{
    FeatureFlagStoreData, SharedClock, VisibilityPollConfig, VisualizationConfiguration,
    VisualizationInstance, VisualizationType, VisualizationWindowMessage,
};

use crate::context::FrameContext;
use crate::EngineError;

/// A document tree of isolated frame contexts
pub struct Page {
    hub: SharedHub,
    clock: SharedClock,
    poll: VisibilityPollConfig,
    /// Index 0 is the top frame
    contexts: Vec<FrameContext>,
}

impl Page {
    pub fn new() -> Self {
        Self::with_poll(VisibilityPollConfig::default())
    }

    /// A page with a custom visibility polling configuration
    pub fn with_poll(poll: VisibilityPollConfig) -> Self {
        let hub = MessageHub::shared();
        let clock: SharedClock = Rc::new(Cell::new(0));
        let top = FrameContext::new(&hub, &clock, "https://app.test/", poll);
        Self {
            hub,
            clock,
            poll,
            contexts: vec![top],
        }
    }

    /// The top frame context
    pub fn top(&self) -> &FrameContext {
        &self.contexts[0]
    }

    /// Context of a frame, if it is part of this page
    pub fn context(&self, frame: FrameId) -> Option<&FrameContext> {
        self.contexts.iter().find(|c| c.frame() == frame)
    }

    /// Number of live frame contexts
    pub fn frame_count(&self) -> usize {
        self.contexts.len()
    }

    /// Current page clock, in ms
    pub fn now_ms(&self) -> u64 {
        self.clock.get()
    }

    /// Create an iframe element (`#element_id`) in the parent frame's
    /// document, back it with a new frame context, and link the two.
    pub fn attach_iframe(&mut self, parent: FrameId, element_id: &str) -> Result<FrameId, EngineError> {
        let document = self
            .context(parent)
            .ok_or(EngineError::UnknownFrame(parent))?
            .document();

        let child = FrameContext::new(
            &self.hub,
            &self.clock,
            &format!("https://app.test/frames/{element_id}"),
            self.poll,
        );
        let child_frame = child.frame();

        {
            let mut doc = document.borrow_mut();
            let body = doc.body();
            let iframe = doc.append_element(body, "iframe");
            doc.tree_mut().set_attribute(iframe, "id", element_id);
            doc.set_content_frame(iframe, Some(child_frame))?;
        }

        self.contexts.push(child);
        Ok(child_frame)
    }

    /// Remove an iframe (`#element_id`) from the parent frame's
    /// document and drop its context tree. Messages already queued for
    /// the removed frames are discarded.
    pub fn detach_iframe(&mut self, parent: FrameId, element_id: &str) -> Result<(), EngineError> {
        let document = self
            .context(parent)
            .ok_or(EngineError::UnknownFrame(parent))?
            .document();

        let child = {
            let mut doc = document.borrow_mut();
            let selector = format!("#{element_id}");
            let iframe = doc
                .query_selector(&selector)
                .ok_or(EngineError::ElementNotFound(selector))?;
            let child = doc.content_frame(iframe);
            doc.set_content_frame(iframe, None)?;
            doc.tree_mut().detach(iframe);
            child
        };

        if let Some(child) = child {
            self.remove_context_tree(child);
        }
        Ok(())
    }

    fn remove_context_tree(&mut self, frame: FrameId) {
        let Some(context) = self.contexts.iter().find(|c| c.frame() == frame) else {
            return;
        };
        let nested: Vec<FrameId> = {
            let document = context.document();
            let doc = document.borrow();
            doc.iframes()
                .into_iter()
                .filter_map(|node| doc.content_frame(node))
                .collect()
        };

        self.hub.borrow_mut().unregister(frame);
        self.contexts.retain(|c| c.frame() != frame);
        for child in nested {
            self.remove_context_tree(child);
        }
    }

    /// Deliver queued messages across all frames until the page goes
    /// quiet. Frame order within one round is arbitrary; within one
    /// frame, messages are handled in arrival order.
    pub fn pump(&mut self) -> usize {
        let mut total = 0;
        loop {
            let mut processed = 0;
            for context in &self.contexts {
                processed += context.pump();
            }
            if processed == 0 {
                return total;
            }
            total += processed;
        }
    }

    /// Advance the page clock, run due visibility ticks in every
    /// frame, then pump. Returns the number of drawers re-drawn.
    pub fn advance(&mut self, ms: u64) -> usize {
        self.clock.set(self.clock.get() + ms);
        let mut redrawn = 0;
        for context in &self.contexts {
            redrawn += context.tick();
        }
        self.pump();
        redrawn
    }

    /// Enable a visualization from the top frame and run the fan-out
    /// to quiescence. `element_results: None` is the data-less
    /// re-render: every frame draws with what it has and the command
    /// still reaches iframes that loaded after the scan.
    pub fn enable_visualization(
        &mut self,
        visualization_type: VisualizationType,
        step: Option<&str>,
        element_results: Option<Vec<VisualizationInstance>>,
        feature_flags: Option<FeatureFlagStoreData>,
    ) -> Result<(), EngineError> {
        let config = VisualizationConfiguration::for_type(visualization_type);
        let message = VisualizationWindowMessage {
            visualization_type,
            is_enabled: true,
            config_id: config.config_id(step),
            element_results,
            feature_flag_store_data: feature_flags,
        };

        let controller = self.top().controller();
        controller.borrow_mut().process_request(&message)?;
        self.pump();
        Ok(())
    }

    /// Disable a visualization from the top frame and run the fan-out
    /// to quiescence.
    pub fn disable_visualization(
        &mut self,
        visualization_type: VisualizationType,
        step: Option<&str>,
    ) -> Result<(), EngineError> {
        let config = VisualizationConfiguration::for_type(visualization_type);
        let message = VisualizationWindowMessage {
            visualization_type,
            is_enabled: false,
            config_id: config.config_id(step),
            element_results: None,
            feature_flag_store_data: None,
        };

        let controller = self.top().controller();
        controller.borrow_mut().process_request(&message)?;
        self.pump();
        Ok(())
    }

    /// Erase every drawer's layout in every frame
    pub fn dispose(&mut self) {
        for context in &self.contexts {
            context.controller().borrow_mut().dispose();
        }
    }

    /// Overlay nodes currently drawn across all frames
    pub fn total_overlay_count(&self) -> usize {
        self.contexts.iter().map(|c| c.overlay_count()).sum()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
