//! Drawers
//!
//! A drawer owns the overlay DOM for exactly one config id: it is the
//! sole writer of the nodes under its overlay container, and it is idle
//! (no overlay in the document) except between `draw_layout` and
//! `erase_layout`.

use std::collections::HashMap;

use axvis_dom::{Document, ElementLayout, NodeId, Rect};

use crate::config::DrawerKind;
use crate::instance::{FeatureFlagStoreData, VisualizationInstance};
use crate::VisualizationError;

/// Attribute marking a drawer's overlay container
pub const OVERLAY_ATTR: &str = "data-axvis-overlay";

/// Initial data handed to a drawer when its visualization is enabled
#[derive(Debug, Clone, Default)]
pub struct DrawerConfig {
    pub instances: Vec<VisualizationInstance>,
    pub feature_flags: FeatureFlagStoreData,
}

/// Overlay renderer for one config id
pub trait Drawer {
    /// Accept initial element data and flag snapshot
    fn initialize(&mut self, config: DrawerConfig);

    /// Create or replace overlay nodes for every drawable instance.
    /// Only instances with `is_visible != Some(false)` and
    /// `is_visualization_enabled != Some(false)` are rendered.
    fn draw_layout(&mut self, doc: &mut Document);

    /// Remove every overlay node this drawer owns. Idempotent; safe on
    /// an uninitialized or already-erased drawer.
    fn erase_layout(&mut self, doc: &mut Document);

    /// The tracked instances, for visibility updates
    fn instances_mut(&mut self) -> &mut [VisualizationInstance];

    /// Is an overlay currently in the document?
    fn is_drawn(&self) -> bool;
}

/// State shared by every drawer variant
struct DrawerCore {
    config_id: String,
    instances: Vec<VisualizationInstance>,
    container: Option<NodeId>,
}

impl DrawerCore {
    fn new(config_id: &str) -> Self {
        Self {
            config_id: config_id.to_string(),
            instances: Vec::new(),
            container: None,
        }
    }

    fn initialize(&mut self, config: DrawerConfig) {
        self.instances = config.instances;
    }

    fn erase(&mut self, doc: &mut Document) {
        if let Some(container) = self.container.take() {
            doc.tree_mut().detach(container);
        }
    }

    /// Drop any previous overlay and start a fresh container
    fn begin_layout(&mut self, doc: &mut Document) -> NodeId {
        self.erase(doc);
        let container = doc.append_element(doc.body(), "div");
        doc.tree_mut()
            .set_attribute(container, OVERLAY_ATTR, &self.config_id);
        self.container = Some(container);
        container
    }

    /// Resolve the drawable instances to document nodes
    fn drawable_targets(&self, doc: &Document) -> Vec<(String, NodeId)> {
        self.instances
            .iter()
            .filter(|instance| instance.should_draw())
            .filter_map(|instance| {
                let node = doc.query_selector(instance.own_selector()?)?;
                Some((instance.rule_id.clone(), node))
            })
            .collect()
    }
}

/// Boxes outlining each failing element
pub struct OutlineDrawer {
    core: DrawerCore,
}

impl OutlineDrawer {
    pub fn new(config_id: &str) -> Self {
        Self {
            core: DrawerCore::new(config_id),
        }
    }
}

impl Drawer for OutlineDrawer {
    fn initialize(&mut self, config: DrawerConfig) {
        self.core.initialize(config);
    }

    fn draw_layout(&mut self, doc: &mut Document) {
        let targets = self.core.drawable_targets(doc);
        let container = self.core.begin_layout(doc);

        for (rule_id, node) in targets {
            let bounds = doc
                .element_layout(node)
                .map(|layout| layout.bounds)
                .unwrap_or_default();
            let overlay = doc.append_element(container, "div");
            doc.tree_mut().set_attribute(overlay, "class", "axvis-outline");
            doc.tree_mut().set_attribute(overlay, "data-rule", &rule_id);
            doc.set_layout(overlay, ElementLayout::with_bounds(bounds));
        }
    }

    fn erase_layout(&mut self, doc: &mut Document) {
        self.core.erase(doc);
    }

    fn instances_mut(&mut self) -> &mut [VisualizationInstance] {
        &mut self.core.instances
    }

    fn is_drawn(&self) -> bool {
        self.core.container.is_some()
    }
}

/// Numbered badges pinned to each element's top-left corner
pub struct BadgeDrawer {
    core: DrawerCore,
}

impl BadgeDrawer {
    pub fn new(config_id: &str) -> Self {
        Self {
            core: DrawerCore::new(config_id),
        }
    }
}

impl Drawer for BadgeDrawer {
    fn initialize(&mut self, config: DrawerConfig) {
        self.core.initialize(config);
    }

    fn draw_layout(&mut self, doc: &mut Document) {
        let targets = self.core.drawable_targets(doc);
        let container = self.core.begin_layout(doc);

        for (ordinal, (rule_id, node)) in targets.into_iter().enumerate() {
            let bounds = doc
                .element_layout(node)
                .map(|layout| layout.bounds)
                .unwrap_or_default();
            let overlay = doc.append_element(container, "span");
            doc.tree_mut().set_attribute(overlay, "class", "axvis-badge");
            doc.tree_mut().set_attribute(overlay, "data-rule", &rule_id);
            doc.append_text(overlay, &(ordinal + 1).to_string());
            doc.set_layout(
                overlay,
                ElementLayout::with_bounds(Rect::new(bounds.x, bounds.y, 16.0, 16.0)),
            );
        }
    }

    fn erase_layout(&mut self, doc: &mut Document) {
        self.core.erase(doc);
    }

    fn instances_mut(&mut self) -> &mut [VisualizationInstance] {
        &mut self.core.instances
    }

    fn is_drawn(&self) -> bool {
        self.core.container.is_some()
    }
}

/// Build the drawer variant for a visualization kind
pub fn build_drawer(kind: DrawerKind, config_id: &str) -> Box<dyn Drawer> {
    match kind {
        DrawerKind::Outline => Box::new(OutlineDrawer::new(config_id)),
        DrawerKind::Badge => Box::new(BadgeDrawer::new(config_id)),
    }
}

/// Mapping from config id to its owned drawer. Entries are created once
/// at controller initialization and live for the controller's lifetime.
#[derive(Default)]
pub struct DrawerRegistry {
    drawers: HashMap<String, Box<dyn Drawer>>,
}

impl DrawerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a drawer. At most one drawer per config id; replacing
    /// an entry is logged because it indicates a setup defect.
    pub fn register(&mut self, config_id: &str, drawer: Box<dyn Drawer>) {
        if self.drawers.insert(config_id.to_string(), drawer).is_some() {
            tracing::debug!(config_id, "drawer registration replaced an existing entry");
        }
    }

    /// Look up a drawer. Failure exposes a registry-construction
    /// defect; callers propagate it rather than recovering.
    pub fn get_mut(&mut self, config_id: &str) -> Result<&mut (dyn Drawer + 'static), VisualizationError> {
        self.drawers
            .get_mut(config_id)
            .map(|d| d.as_mut())
            .ok_or_else(|| VisualizationError::UnknownConfig(config_id.to_string()))
    }

    /// Every registered drawer
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Drawer>> {
        self.drawers.values_mut()
    }

    /// Registered config ids
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.drawers.keys().map(|k| k.as_str())
    }

    pub fn contains(&self, config_id: &str) -> bool {
        self.drawers.contains_key(config_id)
    }

    pub fn len(&self) -> usize {
        self.drawers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawers.is_empty()
    }
}
