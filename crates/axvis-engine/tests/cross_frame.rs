//! Integration tests - Visualization fan-out across nested frames
//!
//! Drives whole pages end to end: enable at the top frame, recursion
//! through child controllers, visibility ticks under the virtual
//! clock, disable and dispose.

use axvis_dom::{DisplayValue, ElementLayout, FrameId, Rect};
use axvis_draw::{
    FeatureFlagStoreData, VisibilityPollConfig, VisualizationInstance, VisualizationType,
    FLAG_SHOW_INSTANCE_VISIBILITY, OVERLAY_ATTR,
};
use axvis_engine::Page;

fn test_page() -> Page {
    Page::with_poll(VisibilityPollConfig {
        period_ms: 100,
        jitter_ms: 0,
    })
}

fn seed_target(page: &Page, frame: FrameId, id: &str) {
    let context = page.context(frame).expect("frame context");
    let document = context.document();
    let mut doc = document.borrow_mut();
    let body = doc.body();
    let node = doc.append_element(body, "div");
    doc.tree_mut().set_attribute(node, "id", id);
    doc.set_layout(
        node,
        ElementLayout::with_bounds(Rect::new(10.0, 10.0, 50.0, 20.0)),
    );
}

fn set_display(page: &Page, frame: FrameId, selector: &str, display: DisplayValue) {
    let context = page.context(frame).expect("frame context");
    let document = context.document();
    let mut doc = document.borrow_mut();
    let node = doc.query_selector(selector).expect("target element");
    let layout = doc.element_layout(node).expect("element layout");
    doc.set_layout(node, ElementLayout { display, ..layout });
}

fn overlay_count(page: &Page, frame: FrameId) -> usize {
    page.context(frame).expect("frame context").overlay_count()
}

fn overlay_containers(page: &Page, frame: FrameId) -> usize {
    let context = page.context(frame).expect("frame context");
    let document = context.document();
    let count = document.borrow().elements_with_attribute(OVERLAY_ATTR).len();
    count
}

fn flags_with_visibility() -> FeatureFlagStoreData {
    let mut flags = FeatureFlagStoreData::default();
    flags.insert(FLAG_SHOW_INSTANCE_VISIBILITY.to_string(), true);
    flags
}

// ============================================================================
// FAN-OUT
// ============================================================================

#[test]
fn test_enable_spans_nested_frames() {
    let mut page = test_page();
    let top = page.top().frame();
    let mid = page.attach_iframe(top, "mid").unwrap();
    let leaf = page.attach_iframe(mid, "leaf").unwrap();

    seed_target(&page, top, "t0");
    seed_target(&page, mid, "t1");
    seed_target(&page, leaf, "t2");

    page.enable_visualization(
        VisualizationType::Issues,
        None,
        Some(vec![
            VisualizationInstance::new(vec!["#t0"], "rule-top"),
            VisualizationInstance::new(vec!["#mid", "#t1"], "rule-mid"),
            VisualizationInstance::new(vec!["#mid", "#leaf", "#t2"], "rule-leaf"),
        ]),
        None,
    )
    .unwrap();

    assert_eq!(overlay_count(&page, top), 1);
    assert_eq!(overlay_count(&page, mid), 1);
    assert_eq!(overlay_count(&page, leaf), 1);
    assert_eq!(page.total_overlay_count(), 3);
}

#[test]
fn test_enable_without_results_reaches_every_frame() {
    let mut page = test_page();
    let top = page.top().frame();
    let a = page.attach_iframe(top, "a").unwrap();
    let b = page.attach_iframe(top, "b").unwrap();
    let nested = page.attach_iframe(a, "nested").unwrap();

    page.enable_visualization(VisualizationType::Headings, None, None, None)
        .unwrap();

    // No results anywhere, but every frame's drawer drew its (empty)
    // layout, including frames results never mentioned
    for frame in [top, a, b, nested] {
        assert_eq!(overlay_containers(&page, frame), 1);
        assert_eq!(overlay_count(&page, frame), 0);
    }
}

#[test]
fn test_iframe_attached_after_scan_catches_up_on_retrigger() {
    let mut page = test_page();
    let top = page.top().frame();
    seed_target(&page, top, "t0");

    page.enable_visualization(
        VisualizationType::Issues,
        None,
        Some(vec![VisualizationInstance::new(vec!["#t0"], "rule-top")]),
        None,
    )
    .unwrap();

    // A frame loads after the scan delivered its results
    let late = page.attach_iframe(top, "late").unwrap();
    assert_eq!(overlay_containers(&page, late), 0);

    // A data-less re-trigger reaches it
    page.enable_visualization(VisualizationType::Issues, None, None, None)
        .unwrap();
    assert_eq!(overlay_containers(&page, late), 1);
}

// ============================================================================
// DISABLE / DISPOSE
// ============================================================================

#[test]
fn test_disable_erases_across_frames_and_is_idempotent() {
    let mut page = test_page();
    let top = page.top().frame();
    let child = page.attach_iframe(top, "child").unwrap();
    seed_target(&page, top, "t0");
    seed_target(&page, child, "t1");

    page.enable_visualization(
        VisualizationType::Issues,
        None,
        Some(vec![
            VisualizationInstance::new(vec!["#t0"], "r0"),
            VisualizationInstance::new(vec!["#child", "#t1"], "r1"),
        ]),
        None,
    )
    .unwrap();
    assert_eq!(page.total_overlay_count(), 2);

    page.disable_visualization(VisualizationType::Issues, None).unwrap();
    assert_eq!(page.total_overlay_count(), 0);

    // Disabling again, and disabling something never enabled, are no-ops
    page.disable_visualization(VisualizationType::Issues, None).unwrap();
    page.disable_visualization(VisualizationType::Landmarks, Some("landmark-roles"))
        .unwrap();
    assert_eq!(page.total_overlay_count(), 0);
}

#[test]
fn test_dispose_erases_every_frame() {
    let mut page = test_page();
    let top = page.top().frame();
    let child = page.attach_iframe(top, "child").unwrap();
    seed_target(&page, top, "t0");
    seed_target(&page, child, "t1");

    page.enable_visualization(
        VisualizationType::Issues,
        None,
        Some(vec![
            VisualizationInstance::new(vec!["#t0"], "r0"),
            VisualizationInstance::new(vec!["#child", "#t1"], "r1"),
        ]),
        None,
    )
    .unwrap();
    page.enable_visualization(
        VisualizationType::Headings,
        None,
        Some(vec![VisualizationInstance::new(vec!["#t0"], "h0")]),
        None,
    )
    .unwrap();
    assert!(page.total_overlay_count() > 0);

    page.dispose();
    assert_eq!(page.total_overlay_count(), 0);
    assert_eq!(overlay_containers(&page, top), 0);
    assert_eq!(overlay_containers(&page, child), 0);
}

// ============================================================================
// FRAME CHURN
// ============================================================================

#[test]
fn test_detached_frame_results_are_dropped() {
    let mut page = test_page();
    let top = page.top().frame();
    page.attach_iframe(top, "doomed").unwrap();
    seed_target(&page, top, "t0");

    page.detach_iframe(top, "doomed").unwrap();
    assert_eq!(page.frame_count(), 1);

    // Results for the removed frame have nothing to highlight
    page.enable_visualization(
        VisualizationType::Issues,
        None,
        Some(vec![
            VisualizationInstance::new(vec!["#t0"], "kept"),
            VisualizationInstance::new(vec!["#doomed", "#gone"], "dropped"),
        ]),
        None,
    )
    .unwrap();

    assert_eq!(page.total_overlay_count(), 1);
}

#[test]
fn test_detach_removes_nested_contexts() {
    let mut page = test_page();
    let top = page.top().frame();
    let outer = page.attach_iframe(top, "outer").unwrap();
    page.attach_iframe(outer, "inner").unwrap();
    assert_eq!(page.frame_count(), 3);

    page.detach_iframe(top, "outer").unwrap();
    assert_eq!(page.frame_count(), 1);

    // Fan-out to a page with no iframes left still works
    page.enable_visualization(VisualizationType::Issues, None, None, None)
        .unwrap();
    assert_eq!(overlay_containers(&page, top), 1);
}

// ============================================================================
// VISIBILITY TRACKING
// ============================================================================

#[test]
fn test_visibility_transitions_under_virtual_clock() {
    let mut page = test_page();
    let top = page.top().frame();
    let child = page.attach_iframe(top, "child").unwrap();
    seed_target(&page, child, "t1");

    page.enable_visualization(
        VisualizationType::Issues,
        None,
        Some(vec![VisualizationInstance::new(vec!["#child", "#t1"], "r1")]),
        Some(flags_with_visibility()),
    )
    .unwrap();
    assert_eq!(overlay_count(&page, child), 1);

    // Target leaves layout; the next due tick hides the overlay
    set_display(&page, child, "#t1", DisplayValue::None);
    page.advance(150);
    assert_eq!(overlay_count(&page, child), 0);

    // Nothing due yet on a short advance
    set_display(&page, child, "#t1", DisplayValue::Block);
    page.advance(10);
    assert_eq!(overlay_count(&page, child), 0);

    // Target returns; the overlay comes back without a rescan
    page.advance(100);
    assert_eq!(overlay_count(&page, child), 1);
}

#[test]
fn test_visibility_tracking_stays_off_without_flag() {
    let mut page = test_page();
    let top = page.top().frame();
    seed_target(&page, top, "t0");

    page.enable_visualization(
        VisualizationType::Issues,
        None,
        Some(vec![VisualizationInstance::new(vec!["#t0"], "r0")]),
        None,
    )
    .unwrap();

    set_display(&page, top, "#t0", DisplayValue::None);
    let redrawn = page.advance(1000);

    // No interval, no re-draw; the stale overlay stays
    assert_eq!(redrawn, 0);
    assert_eq!(overlay_count(&page, top), 1);
}

// ============================================================================
// TEST STEPS
// ============================================================================

#[test]
fn test_assessment_steps_have_independent_drawers() {
    let mut page = test_page();
    let top = page.top().frame();
    seed_target(&page, top, "t0");

    page.enable_visualization(
        VisualizationType::Landmarks,
        Some("landmark-roles"),
        Some(vec![VisualizationInstance::new(vec!["#t0"], "roles")]),
        None,
    )
    .unwrap();
    page.enable_visualization(
        VisualizationType::Landmarks,
        Some("primary-content"),
        Some(vec![VisualizationInstance::new(vec!["#t0"], "primary")]),
        None,
    )
    .unwrap();
    assert_eq!(overlay_count(&page, top), 2);

    // Disabling one step leaves the other drawn
    page.disable_visualization(VisualizationType::Landmarks, Some("landmark-roles"))
        .unwrap();
    assert_eq!(overlay_count(&page, top), 1);
}
