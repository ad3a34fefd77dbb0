//! Drawing controller
//!
//! Per-frame orchestrator. A visualization toggle enters at the top
//! frame, gets partitioned by owning frame, drives the local drawer for
//! current-frame results, and is forwarded as a scoped message to each
//! child iframe, whose own controller recurses the same way. Fan-out
//! depth is bounded by the document's actual iframe nesting; nothing
//! ever waits on a child's response.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use axvis_comm::FrameCommunicator;
use axvis_comm::FrameMessenger;
use axvis_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

use crate::config::{VisualizationConfiguration, VisualizationType};
use crate::drawer::{build_drawer, DrawerConfig, DrawerRegistry};
use crate::instance::{
    FeatureFlagStoreData, VisualizationInstance, FLAG_SHOW_INSTANCE_VISIBILITY,
};
use crate::results::split_results_by_frame;
use crate::visibility_checker::{VisibilityChecker, VisibilityPollConfig};
use crate::VisualizationError;

/// Command carrying visualization toggles between frames
pub const DRAW_COMMAND: &str = "insights.draw";

/// Virtual clock shared by every controller in one page, in ms
pub type SharedClock = Rc<Cell<u64>>;

/// The payload exchanged between frames for a visualization toggle.
/// `element_results` is present only on enable, and only for the frame
/// that owns them after partitioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationWindowMessage {
    pub visualization_type: VisualizationType,
    pub is_enabled: bool,
    pub config_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_results: Option<Vec<VisualizationInstance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_flag_store_data: Option<FeatureFlagStoreData>,
}

/// Per-frame drawing orchestrator.
///
/// Every known config id moves through: uninitialized (drawer
/// registered, nothing drawn) -> enabled (layout drawn, visibility
/// interval optionally running) -> disabled (layout erased, interval
/// cleared) -> enabled again on re-trigger. [`Self::dispose`] is
/// terminal.
pub struct DrawingController {
    document: Rc<RefCell<Document>>,
    messenger: FrameMessenger,
    clock: SharedClock,
    drawers: DrawerRegistry,
    visibility_checker: VisibilityChecker,
}

impl DrawingController {
    pub fn new(
        document: Rc<RefCell<Document>>,
        messenger: FrameMessenger,
        clock: SharedClock,
        poll: VisibilityPollConfig,
    ) -> Self {
        Self {
            document,
            messenger,
            clock,
            drawers: DrawerRegistry::new(),
            visibility_checker: VisibilityChecker::new(poll),
        }
    }

    /// Build the full drawer registry and subscribe to the draw
    /// command. The registry is eager: one drawer per config id for
    /// every visualization type and test step, before any message
    /// arrives.
    pub fn initialize(this: &Rc<RefCell<Self>>, communicator: &mut FrameCommunicator) {
        this.borrow_mut().build_registry();

        let weak = Rc::downgrade(this);
        communicator.subscribe(
            DRAW_COMMAND,
            Box::new(move |payload, _error, responder| {
                let Some(controller) = weak.upgrade() else {
                    return Ok(());
                };
                let Some(payload) = payload else {
                    return Err("draw message without payload".to_string());
                };
                let message: VisualizationWindowMessage = serde_json::from_value(payload.clone())
                    .map_err(|err| format!("malformed draw message: {err}"))?;
                controller
                    .borrow_mut()
                    .process_request(&message)
                    .map_err(|err| err.to_string())?;
                responder.respond(None);
                Ok(())
            }),
        );
    }

    fn build_registry(&mut self) {
        for config in VisualizationConfiguration::all() {
            for config_id in config.config_ids() {
                self.drawers
                    .register(&config_id, build_drawer(config.drawer_kind, &config_id));
            }
        }
        tracing::debug!(drawers = self.drawers.len(), "drawer registry built");
    }

    /// Single entry point for both direct top-level calls and incoming
    /// cross-frame messages.
    pub fn process_request(
        &mut self,
        message: &VisualizationWindowMessage,
    ) -> Result<(), VisualizationError> {
        if message.is_enabled {
            self.enable_visualization(message)
        } else {
            self.disable_visualization(message)
        }
    }

    fn enable_visualization(
        &mut self,
        message: &VisualizationWindowMessage,
    ) -> Result<(), VisualizationError> {
        tracing::debug!(
            config_id = %message.config_id,
            with_results = message.element_results.is_some(),
            "enable visualization"
        );

        match &message.element_results {
            Some(results) => {
                let partitions = {
                    let doc = self.document.borrow();
                    split_results_by_frame(&doc, results.clone())
                };
                for partition in partitions {
                    match partition.frame {
                        None => self.enable_current_frame(message, partition.element_results)?,
                        Some(frame) => {
                            self.forward(message, frame, Some(partition.element_results))?
                        }
                    }
                }
            }
            None => {
                // A forwarded message already scoped to this frame, or a
                // re-render with no new data. Every iframe currently in
                // the document gets the command, so frames that loaded
                // after the initial scan still draw.
                self.enable_current_frame(message, Vec::new())?;
                for frame in self.current_iframes() {
                    self.forward(message, frame, None)?;
                }
            }
        }
        Ok(())
    }

    fn enable_current_frame(
        &mut self,
        message: &VisualizationWindowMessage,
        results: Vec<VisualizationInstance>,
    ) -> Result<(), VisualizationError> {
        let flags = message.feature_flag_store_data.clone().unwrap_or_default();

        if flags
            .get(FLAG_SHOW_INSTANCE_VISIBILITY)
            .copied()
            .unwrap_or(false)
        {
            self.visibility_checker.create_visibility_checker_interval(
                self.clock.get(),
                &message.config_id,
                message.visualization_type,
                &results,
            );
        }

        let drawer = self.drawers.get_mut(&message.config_id)?;
        drawer.initialize(DrawerConfig {
            instances: results,
            feature_flags: flags,
        });
        drawer.draw_layout(&mut self.document.borrow_mut());
        Ok(())
    }

    fn disable_visualization(
        &mut self,
        message: &VisualizationWindowMessage,
    ) -> Result<(), VisualizationError> {
        tracing::debug!(config_id = %message.config_id, "disable visualization");

        let drawer = self.drawers.get_mut(&message.config_id)?;
        drawer.erase_layout(&mut self.document.borrow_mut());
        self.visibility_checker
            .clear_visibility_check(&message.config_id, message.visualization_type);

        // Every iframe present right now, regardless of which frames
        // ever drew anything; no membership history is kept.
        for frame in self.current_iframes() {
            self.forward(message, frame, None)?;
        }
        Ok(())
    }

    fn current_iframes(&self) -> Vec<NodeId> {
        self.document.borrow().iframes()
    }

    /// Forward a scoped copy of the message to one child iframe. An
    /// iframe without a content window is skipped silently; it may have
    /// detached between enumeration and send.
    fn forward(
        &self,
        message: &VisualizationWindowMessage,
        frame: NodeId,
        element_results: Option<Vec<VisualizationInstance>>,
    ) -> Result<(), VisualizationError> {
        let target = self.document.borrow().content_frame(frame);
        let scoped = VisualizationWindowMessage {
            visualization_type: message.visualization_type,
            is_enabled: message.is_enabled,
            config_id: message.config_id.clone(),
            element_results,
            feature_flag_store_data: message.feature_flag_store_data.clone(),
        };
        self.messenger
            .send_request(target, DRAW_COMMAND, Some(serde_json::to_value(&scoped)?))
            .map_err(|err| match err {
                axvis_comm::CommError::Encode(err) => VisualizationError::Encode(err),
            })?;
        Ok(())
    }

    /// Drive due visibility intervals against the current clock.
    /// Returns the number of drawers re-drawn.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.get();
        let mut doc = self.document.borrow_mut();
        self.visibility_checker
            .run_due(now, &mut doc, &mut self.drawers)
    }

    /// Erase every registered drawer's layout. Terminal: no further
    /// draw state is expected after this. Visibility intervals are not
    /// cleared here; disable owns interval teardown.
    pub fn dispose(&mut self) {
        let mut doc = self.document.borrow_mut();
        for drawer in self.drawers.values_mut() {
            drawer.erase_layout(&mut doc);
        }
        tracing::debug!("drawing controller disposed");
    }

    /// Is a visibility interval active for this config id?
    pub fn is_tracking(&self, config_id: &str) -> bool {
        self.visibility_checker.is_tracking(config_id)
    }

    /// Active visibility intervals
    pub fn active_interval_count(&self) -> usize {
        self.visibility_checker.active_count()
    }

    /// Number of registered drawers
    pub fn registered_drawer_count(&self) -> usize {
        self.drawers.len()
    }
}
