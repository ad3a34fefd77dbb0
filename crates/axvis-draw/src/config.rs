//! Visualization configuration
//!
//! The closed set of visualization types and the per-type data the
//! controller needs: config-id derivation, assessment test steps, and
//! which drawer variant renders the overlays.

use serde::{Deserialize, Serialize};

/// A category of accessibility check whose results share one rendering
/// strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationType {
    Issues,
    Headings,
    Landmarks,
    TabStops,
}

/// Which overlay renderer a visualization uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerKind {
    /// Boxes outlining each failing element
    Outline,
    /// Numbered badges pinned to each element
    Badge,
}

/// Static configuration for one visualization type
#[derive(Debug, Clone, Copy)]
pub struct VisualizationConfiguration {
    pub visualization_type: VisualizationType,
    pub key: &'static str,
    /// Assessment test steps; empty for ad-hoc visualizations
    pub test_steps: &'static [&'static str],
    pub drawer_kind: DrawerKind,
}

const CONFIGURATIONS: [VisualizationConfiguration; 4] = [
    VisualizationConfiguration {
        visualization_type: VisualizationType::Issues,
        key: "issues",
        test_steps: &[],
        drawer_kind: DrawerKind::Outline,
    },
    VisualizationConfiguration {
        visualization_type: VisualizationType::Headings,
        key: "headings",
        test_steps: &[],
        drawer_kind: DrawerKind::Badge,
    },
    VisualizationConfiguration {
        visualization_type: VisualizationType::Landmarks,
        key: "landmarks",
        test_steps: &["landmark-roles", "primary-content"],
        drawer_kind: DrawerKind::Outline,
    },
    VisualizationConfiguration {
        visualization_type: VisualizationType::TabStops,
        key: "tab-stops",
        test_steps: &["focus-order"],
        drawer_kind: DrawerKind::Badge,
    },
];

impl VisualizationConfiguration {
    /// All configured visualizations
    pub fn all() -> &'static [VisualizationConfiguration] {
        &CONFIGURATIONS
    }

    /// Configuration for a type
    pub fn for_type(visualization_type: VisualizationType) -> &'static VisualizationConfiguration {
        match visualization_type {
            VisualizationType::Issues => &CONFIGURATIONS[0],
            VisualizationType::Headings => &CONFIGURATIONS[1],
            VisualizationType::Landmarks => &CONFIGURATIONS[2],
            VisualizationType::TabStops => &CONFIGURATIONS[3],
        }
    }

    /// Derive the config id for an optional test step
    pub fn config_id(&self, step: Option<&str>) -> String {
        match step {
            Some(step) => format!("{}-{}", self.key, step),
            None => self.key.to_string(),
        }
    }

    /// Every config id this visualization contributes to the registry:
    /// the bare key for ad-hoc types, one id per test step otherwise.
    pub fn config_ids(&self) -> Vec<String> {
        if self.test_steps.is_empty() {
            vec![self.config_id(None)]
        } else {
            self.test_steps
                .iter()
                .map(|step| self.config_id(Some(step)))
                .collect()
        }
    }
}
