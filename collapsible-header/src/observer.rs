use crate::{RootMargin, VisibilityEntry, VisibilityOptions};

/// Visible fraction of the condensing toolbar at which headers swap.
pub const VISIBILITY_THRESHOLD: f64 = 0.25;

/// Edge drift (px) between an entry's intersection and bounding rects that marks a page
/// transition in progress.
const TRANSITION_EDGE_DRIFT: f64 = 5.0;

/// Observer configuration for the condensing header's first toolbar.
///
/// The root is shrunk from the top by the primary header's height, so the threshold line sits
/// right below the primary header.
pub fn visibility_options(primary_header_height: f64, threshold: f64) -> VisibilityOptions {
    VisibilityOptions {
        threshold,
        root_margin: RootMargin::top(-primary_header_height.max(0.0)),
    }
}

/// What a visibility entry means for the two headers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolbarVisibility {
    /// `true` while the condensing toolbar is mostly visible; the condensing header is then the
    /// active one, otherwise the primary header is.
    pub condensing_visible: bool,
    /// Opacity for the primary header's first toolbar background. `None` removes the override.
    pub background_opacity: Option<f64>,
}

impl ToolbarVisibility {
    pub fn primary_active(&self) -> bool {
        !self.condensing_visible
    }
}

/// Interprets an observer entry.
///
/// Returns `None` for entries that must not change state: a hidden page (nothing intersects and
/// the root has no area) or a page mid-transition (the toolbar is sliding horizontally).
pub fn evaluate_visibility(entry: &VisibilityEntry, threshold: f64) -> Option<ToolbarVisibility> {
    let intersection = entry.intersection_rect;
    let intersection_area = intersection.area();
    let root_area = entry.root_bounds.map(|r| r.area()).unwrap_or(0.0);

    if intersection_area == 0.0 && root_area == 0.0 && entry.root_bounds.is_some() {
        ctrace!("evaluate_visibility: page hidden");
        return None;
    }

    let left_drift = (intersection.left() - entry.bounding_rect.left()).abs();
    let right_drift = (intersection.right() - entry.bounding_rect.right()).abs();
    if intersection_area > 0.0
        && (left_drift >= TRANSITION_EDGE_DRIFT || right_drift >= TRANSITION_EDGE_DRIFT)
    {
        ctrace!(left_drift, right_drift, "evaluate_visibility: page transitioning");
        return None;
    }

    let ratio = entry.intersection_ratio.clamp(0.0, 1.0);
    let condensing_visible = entry.is_intersecting && ratio >= threshold;

    let background_opacity = if condensing_visible {
        let fade = 1.0 - threshold;
        let opacity = if fade > 0.0 {
            ((1.0 - ratio) / fade).clamp(0.0, 1.0)
        } else {
            1.0
        };
        (opacity < 1.0).then_some(opacity)
    } else {
        Some(1.0)
    };

    Some(ToolbarVisibility {
        condensing_visible,
        background_opacity,
    })
}
