//! axvis demo
//!
//! Builds a page with nested iframes, enables a visualization across
//! all of them, lets a visibility tick hide a vanished target, then
//! disables everything.

use anyhow::{Context, Result};
use axvis_dom::{DisplayValue, ElementLayout, FrameId, Rect};
use axvis_draw::{
    FeatureFlagStoreData, VisualizationInstance, VisualizationType, FLAG_SHOW_INSTANCE_VISIBILITY,
};
use axvis_engine::Page;
use tracing_subscriber::EnvFilter;

fn seed_target(page: &Page, frame: FrameId, id: &str, bounds: Rect) -> Result<()> {
    let context = page
        .context(frame)
        .with_context(|| format!("frame {frame:?} missing"))?;
    let document = context.document();
    let mut doc = document.borrow_mut();
    let body = doc.body();
    let node = doc.append_element(body, "div");
    doc.tree_mut().set_attribute(node, "id", id);
    doc.set_layout(node, ElementLayout::with_bounds(bounds));
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("axvis v{}", axvis_engine::VERSION);

    let mut page = Page::new();
    let top = page.top().frame();
    let article = page.attach_iframe(top, "article")?;
    let comments = page.attach_iframe(article, "comments")?;

    seed_target(&page, top, "logo", Rect::new(20.0, 20.0, 120.0, 40.0))?;
    seed_target(&page, article, "headline", Rect::new(10.0, 10.0, 300.0, 30.0))?;
    seed_target(&page, comments, "reply-form", Rect::new(10.0, 80.0, 200.0, 60.0))?;

    let mut flags = FeatureFlagStoreData::default();
    flags.insert(FLAG_SHOW_INSTANCE_VISIBILITY.to_string(), true);

    page.enable_visualization(
        VisualizationType::Issues,
        None,
        Some(vec![
            VisualizationInstance::new(vec!["#logo"], "image-alt"),
            VisualizationInstance::new(vec!["#article", "#headline"], "heading-order"),
            VisualizationInstance::new(vec!["#article", "#comments", "#reply-form"], "label"),
        ]),
        Some(flags),
    )?;
    tracing::info!(
        frames = page.frame_count(),
        overlays = page.total_overlay_count(),
        "issues enabled across the frame tree"
    );

    // The headline vanishes from layout; the next tick hides its overlay
    {
        let context = page.context(article).context("article frame missing")?;
        let document = context.document();
        let mut doc = document.borrow_mut();
        let headline = doc
            .query_selector("#headline")
            .context("headline missing")?;
        doc.set_layout(
            headline,
            ElementLayout {
                display: DisplayValue::None,
                ..ElementLayout::default()
            },
        );
    }
    let redrawn = page.advance(700);
    tracing::info!(
        redrawn,
        overlays = page.total_overlay_count(),
        "after visibility tick"
    );

    page.disable_visualization(VisualizationType::Issues, None)?;
    tracing::info!(overlays = page.total_overlay_count(), "issues disabled");

    Ok(())
}
