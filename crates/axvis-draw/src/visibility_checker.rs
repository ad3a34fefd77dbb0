//! Instance visibility checker
//!
//! Layout changes have no universal change notification, so visibility
//! is re-evaluated on a timer: one recurring interval per config id,
//! driven by an explicit clock so tests control time. A tick flips each
//! tracked instance's visibility flag and re-draws the owning drawer
//! when anything changed; it never re-runs a scan.

use axvis_dom::Document;

use crate::config::VisualizationType;
use crate::drawer::DrawerRegistry;
use crate::instance::VisualizationInstance;

/// Polling period and per-id jitter, in clock milliseconds
#[derive(Debug, Clone, Copy)]
pub struct VisibilityPollConfig {
    pub period_ms: u64,
    pub jitter_ms: u64,
}

impl Default for VisibilityPollConfig {
    fn default() -> Self {
        Self {
            period_ms: 600,
            jitter_ms: 50,
        }
    }
}

#[derive(Debug)]
struct TrackedInterval {
    config_id: String,
    visualization_type: VisualizationType,
    next_due_ms: u64,
}

/// Recurring visibility checks, one interval per config id
#[derive(Debug, Default)]
pub struct VisibilityChecker {
    poll: VisibilityPollConfig,
    intervals: Vec<TrackedInterval>,
}

impl VisibilityChecker {
    pub fn new(poll: VisibilityPollConfig) -> Self {
        Self {
            poll,
            intervals: Vec::new(),
        }
    }

    /// Start a recurring check for a config id. An existing interval
    /// for the same id is cleared first, so there is never more than
    /// one per id.
    pub fn create_visibility_checker_interval(
        &mut self,
        now_ms: u64,
        config_id: &str,
        visualization_type: VisualizationType,
        element_results: &[VisualizationInstance],
    ) {
        self.clear_visibility_check(config_id, visualization_type);
        tracing::debug!(
            config_id,
            tracked = element_results.len(),
            "visibility interval started"
        );
        self.intervals.push(TrackedInterval {
            config_id: config_id.to_string(),
            visualization_type,
            next_due_ms: now_ms + self.poll.period_ms + self.jitter_for(config_id),
        });
    }

    /// Stop the interval for a config id. A no-op when none exists.
    pub fn clear_visibility_check(&mut self, config_id: &str, _visualization_type: VisualizationType) {
        self.intervals.retain(|entry| entry.config_id != config_id);
    }

    /// Is an interval active for this config id?
    pub fn is_tracking(&self, config_id: &str) -> bool {
        self.intervals.iter().any(|entry| entry.config_id == config_id)
    }

    /// Number of active intervals
    pub fn active_count(&self) -> usize {
        self.intervals.len()
    }

    /// Run every interval that is due at `now_ms`. Returns the number
    /// of drawers re-drawn because an instance's visibility changed.
    pub fn run_due(
        &mut self,
        now_ms: u64,
        doc: &mut Document,
        drawers: &mut DrawerRegistry,
    ) -> usize {
        let mut redrawn = 0;
        let period = self.poll.period_ms;

        for entry in &mut self.intervals {
            if now_ms < entry.next_due_ms {
                continue;
            }
            entry.next_due_ms = now_ms + period;

            let drawer = match drawers.get_mut(&entry.config_id) {
                Ok(drawer) => drawer,
                Err(err) => {
                    tracing::debug!(%err, "visibility tick skipped");
                    continue;
                }
            };

            let viewport = doc.viewport();
            let mut changed = false;
            for instance in drawer.instances_mut() {
                let rendered = instance
                    .own_selector()
                    .and_then(|selector| doc.query_selector(selector))
                    .and_then(|node| doc.element_layout(node))
                    .map(|layout| layout.compute_state(&viewport).is_rendered())
                    .unwrap_or(false);
                if instance.is_visible != Some(rendered) {
                    instance.is_visible = Some(rendered);
                    changed = true;
                }
            }

            if changed {
                tracing::debug!(
                    config_id = %entry.config_id,
                    visualization_type = ?entry.visualization_type,
                    "visibility changed, re-drawing"
                );
                drawer.draw_layout(doc);
                redrawn += 1;
            }
        }
        redrawn
    }

    fn jitter_for(&self, config_id: &str) -> u64 {
        if self.poll.jitter_ms == 0 {
            return 0;
        }
        fnv1a(config_id) % (self.poll.jitter_ms + 1)
    }
}

/// FNV-1a, used for deterministic per-id jitter
fn fnv1a(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
