//! Visualization instances
//!
//! One instance is one scan finding bound to a DOM target.

use std::collections::HashMap;

use axvis_dom::NodeId;
use serde::{Deserialize, Serialize};

/// Feature flag snapshot, read at message-processing time. Immutable
/// per call; this subsystem never subscribes to flag changes.
pub type FeatureFlagStoreData = HashMap<String, bool>;

/// Flag gating interval-based instance visibility tracking
pub const FLAG_SHOW_INSTANCE_VISIBILITY: &str = "showInstanceVisibility";

/// One scan finding bound to a DOM target.
///
/// `target` is a selector path: every entry before the last selects an
/// iframe in the frame above it, the last selects the element inside
/// its own frame. Both flags are tri-state; unset means "show".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationInstance {
    pub target: Vec<String>,
    pub rule_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visualization_enabled: Option<bool>,
}

impl VisualizationInstance {
    /// Instance with unset flags
    pub fn new(target: Vec<&str>, rule_id: &str) -> Self {
        Self {
            target: target.into_iter().map(|s| s.to_string()).collect(),
            rule_id: rule_id.to_string(),
            description: String::new(),
            is_visible: None,
            is_visualization_enabled: None,
        }
    }

    /// Selector of the target inside its own frame
    pub fn own_selector(&self) -> Option<&str> {
        self.target.last().map(|s| s.as_str())
    }

    /// Should an overlay be rendered for this instance? Only an
    /// explicit `false` on either flag suppresses it.
    pub fn should_draw(&self) -> bool {
        self.is_visible != Some(false) && self.is_visualization_enabled != Some(false)
    }
}

/// One partition of scan results: `frame: None` means the current
/// document owns them, otherwise they belong to one descendant iframe
/// element.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePartition {
    pub frame: Option<NodeId>,
    pub element_results: Vec<VisualizationInstance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_draw_tristate() {
        let mut instance = VisualizationInstance::new(vec!["#a"], "image-alt");
        assert!(instance.should_draw());

        instance.is_visible = Some(true);
        instance.is_visualization_enabled = Some(true);
        assert!(instance.should_draw());

        instance.is_visible = Some(false);
        assert!(!instance.should_draw());

        instance.is_visible = None;
        instance.is_visualization_enabled = Some(false);
        assert!(!instance.should_draw());
    }

    #[test]
    fn test_own_selector_is_last_entry() {
        let instance = VisualizationInstance::new(vec!["#frame", "#inner"], "label");
        assert_eq!(instance.own_selector(), Some("#inner"));

        let empty = VisualizationInstance::new(vec![], "label");
        assert_eq!(empty.own_selector(), None);
    }

    #[test]
    fn test_serde_shape() {
        let instance = VisualizationInstance::new(vec!["#a"], "image-alt");
        let json = serde_json::to_string(&instance).unwrap();
        assert!(json.contains("\"ruleId\":\"image-alt\""));
        assert!(!json.contains("isVisible"));

        let parsed: VisualizationInstance =
            serde_json::from_str(r##"{"target":["#a"],"ruleId":"r","isVisible":true}"##).unwrap();
        assert_eq!(parsed.is_visible, Some(true));
        assert_eq!(parsed.is_visualization_enabled, None);
    }
}
