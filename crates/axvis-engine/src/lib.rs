//! axvis Engine
//!
//! Hosts a page as a tree of isolated frame contexts, the way a browser
//! hosts a document and its same-origin iframes. Each context runs its
//! own document, frame communicator, and drawing controller; the page
//! only moves serialized messages between them and drives the shared
//! clock.
//!
//! # Example
//! ```rust,ignore
//! use axvis_engine::Page;
//! use axvis_draw::{VisualizationInstance, VisualizationType};
//!
//! let mut page = Page::new();
//! let top = page.top().frame();
//! page.attach_iframe(top, "sidebar")?;
//! page.enable_visualization(
//!     VisualizationType::Issues,
//!     None,
//!     Some(vec![VisualizationInstance::new(vec!["#sidebar", "#logo"], "image-alt")]),
//!     None,
//! )?;
//! ```

mod context;
mod page;

pub use context::FrameContext;
pub use page::Page;

// Re-export sub-crates for advanced usage
pub use axvis_comm as comm;
pub use axvis_dom as dom;
pub use axvis_draw as draw;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Page hosting error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no frame context registered for {0:?}")]
    UnknownFrame(axvis_dom::FrameId),

    #[error("no element matches '{0}'")]
    ElementNotFound(String),

    #[error(transparent)]
    Dom(#[from] axvis_dom::DomError),

    #[error(transparent)]
    Visualization(#[from] axvis_draw::VisualizationError),
}
