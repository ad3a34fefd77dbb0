//! Result partitioning
//!
//! Splits a flat list of scan results by the frame that owns each
//! instance's target element.

use axvis_dom::Document;

use crate::instance::{FramePartition, VisualizationInstance};

/// Partition `results` by owning frame. The split is total and
/// disjoint: every placeable instance lands in exactly one partition.
/// The current-frame partition is always first (possibly empty).
///
/// An instance whose leading selector no longer matches an iframe in
/// the document is dropped; its target is gone, so there is nothing to
/// highlight. Instances routed to an iframe are re-scoped: the leading
/// selector is stripped so the child frame resolves targets relative to
/// its own document.
pub fn split_results_by_frame(
    doc: &Document,
    results: Vec<VisualizationInstance>,
) -> Vec<FramePartition> {
    let mut partitions = vec![FramePartition {
        frame: None,
        element_results: Vec::new(),
    }];

    for mut instance in results {
        if instance.target.len() <= 1 {
            partitions[0].element_results.push(instance);
            continue;
        }

        let frame_selector = instance.target.remove(0);
        let frame = doc
            .query_selector(&frame_selector)
            .filter(|&node| doc.tree().element(node).is_some_and(|e| e.is_iframe()));
        let Some(frame) = frame else {
            tracing::debug!(
                selector = %frame_selector,
                rule = %instance.rule_id,
                "result dropped: owning iframe not in document"
            );
            continue;
        };

        match partitions.iter_mut().find(|p| p.frame == Some(frame)) {
            Some(partition) => partition.element_results.push(instance),
            None => partitions.push(FramePartition {
                frame: Some(frame),
                element_results: vec![instance],
            }),
        }
    }

    partitions
}
