//! axvis Draw - Scan-result visualization
//!
//! Turns accessibility scan results into DOM overlays, across an
//! arbitrarily nested tree of same-origin iframes. One
//! [`DrawingController`] runs per frame context; a controller only ever
//! touches its own document and forwards scoped draw commands to its
//! direct child frames, which recurse the same way.
//!
//! Components:
//! - Result partitioning by owning frame
//! - Drawer registry (one overlay owner per config id)
//! - Interval-based visibility tracking
//! - The drawing controller state machine

mod config;
mod controller;
mod drawer;
mod instance;
mod results;
mod visibility_checker;

pub use config::{DrawerKind, VisualizationConfiguration, VisualizationType};
pub use controller::{DrawingController, SharedClock, VisualizationWindowMessage, DRAW_COMMAND};
pub use drawer::{build_drawer, Drawer, DrawerConfig, DrawerRegistry, OVERLAY_ATTR};
pub use instance::{
    FeatureFlagStoreData, FramePartition, VisualizationInstance, FLAG_SHOW_INSTANCE_VISIBILITY,
};
pub use results::split_results_by_frame;
pub use visibility_checker::{VisibilityChecker, VisibilityPollConfig};

/// Visualization error
#[derive(Debug, thiserror::Error)]
pub enum VisualizationError {
    /// The registry has no drawer for this config id. This exposes a
    /// defect in registry construction, not a runtime condition.
    #[error("no drawer registered for config '{0}'")]
    UnknownConfig(String),

    #[error("message encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
