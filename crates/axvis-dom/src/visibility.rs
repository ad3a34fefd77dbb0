//! Element visibility
//!
//! Computes whether an element is currently rendered from its layout
//! bounds and simplified css inputs. There is no layout-change
//! notification in a document, so callers re-evaluate this on a timer.

use crate::geometry::Rect;

/// Visibility state of an element relative to a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityState {
    /// Element is fully inside the viewport.
    #[default]
    Visible,

    /// Element overlaps the viewport edge (partially visible).
    Clipped,

    /// Element has `visibility: hidden` or zero opacity.
    Hidden,

    /// Element has `display: none`.
    DisplayNone,

    /// Element is outside the viewport.
    Offscreen,
}

impl VisibilityState {
    /// Does the element produce anything a user can see?
    #[inline]
    pub fn is_rendered(&self) -> bool {
        matches!(self, VisibilityState::Visible | VisibilityState::Clipped)
    }
}

/// Simplified css display values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayValue {
    #[default]
    Block,
    Inline,
    Flex,
    None,
}

/// Css visibility values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityValue {
    #[default]
    Visible,
    Hidden,
}

/// Layout and visibility inputs for one element.
#[derive(Debug, Clone, Copy)]
pub struct ElementLayout {
    /// The element's bounds in page coordinates.
    pub bounds: Rect,

    /// Css display value (simplified).
    pub display: DisplayValue,

    /// Css visibility value.
    pub visibility: VisibilityValue,

    /// Css opacity value (0.0 to 1.0).
    pub opacity: f32,
}

impl Default for ElementLayout {
    fn default() -> Self {
        Self {
            bounds: Rect::default(),
            display: DisplayValue::Block,
            visibility: VisibilityValue::Visible,
            opacity: 1.0,
        }
    }
}

impl ElementLayout {
    /// Layout with bounds and default css inputs
    pub fn with_bounds(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Compute visibility state relative to a viewport.
    pub fn compute_state(&self, viewport: &Rect) -> VisibilityState {
        // display: none takes priority
        if self.display == DisplayValue::None {
            return VisibilityState::DisplayNone;
        }

        // visibility: hidden
        if self.visibility == VisibilityValue::Hidden {
            return VisibilityState::Hidden;
        }

        // Zero opacity is effectively hidden
        if self.opacity <= 0.0 {
            return VisibilityState::Hidden;
        }

        // Offscreen or zero-size
        if !viewport.intersects(&self.bounds) {
            return VisibilityState::Offscreen;
        }

        if !viewport.contains(&self.bounds) {
            return VisibilityState::Clipped;
        }

        VisibilityState::Visible
    }
}
