use crate::host::classes;
use crate::{HeaderIndex, HeaderTree, HeaderTreeMut, MirrorPair};

/// Fraction of the large title consumed by scrolling, in `[0, 1]`.
///
/// Shrinking starts once the toolbars below the title (`remaining_height`) have scrolled away,
/// and completes after a further `title_height`.
pub fn title_progress(scroll_top: f64, remaining_height: f64, title_height: f64) -> f64 {
    let consumed = scroll_top - remaining_height;
    if title_height <= 0.0 {
        return if consumed > 0.0 { 1.0 } else { 0.0 };
    }
    (consumed / title_height).clamp(0.0, 1.0)
}

/// Scale for the mirrored title: `1.0` at the top, `min_scale` once the title is consumed.
pub fn title_scale(progress: f64, min_scale: f64) -> f64 {
    let min_scale = min_scale.clamp(0.0, 1.0);
    (1.0 - (1.0 - min_scale) * progress.clamp(0.0, 1.0)).clamp(min_scale, 1.0)
}

/// Values read from the tree during the measurement phase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub remaining_height: f64,
    pub title_height: f64,
    /// Original title text, when it differs from the mirror's.
    pub title_text: Option<String>,
}

/// Style state derived from one scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollFrame {
    pub scale: f64,
    /// Opacity of the mirrored title.
    pub opacity: f64,
    pub border_visible: bool,
}

/// Mirrors the scroll position into title scale, title opacity and border state.
///
/// The bridge only holds node handles. [`ScrollBridge::measure`] reads, [`ScrollBridge::apply`]
/// writes; the controller runs them in separate scheduler phases.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollBridge<N> {
    pub scroll_element: N,
    /// Condensing toolbars after the first.
    pub trailing_toolbars: Vec<N>,
    /// Element whose height the title consumes while shrinking.
    pub title_extent: N,
    /// Primary header's last toolbar background.
    pub border_target: Option<N>,
    pub title_mirror: Option<MirrorPair<N>>,
    pub min_scale: f64,
}

impl<N: Clone + PartialEq> ScrollBridge<N> {
    pub fn new(
        scroll_element: N,
        condensing: &HeaderIndex<N>,
        primary: &HeaderIndex<N>,
        title_mirror: Option<MirrorPair<N>>,
        min_scale: f64,
    ) -> Self {
        let first = condensing.first_toolbar();
        Self {
            scroll_element,
            trailing_toolbars: condensing
                .trailing_toolbars()
                .iter()
                .map(|t| t.element.clone())
                .collect(),
            title_extent: first.title.clone().unwrap_or_else(|| first.element.clone()),
            border_target: primary.last_toolbar().background.clone(),
            title_mirror,
            min_scale,
        }
    }

    pub fn measure<T>(&self, tree: &T) -> ScrollMetrics
    where
        T: HeaderTree<Node = N>,
    {
        let title_text = self.title_mirror.as_ref().and_then(|m| {
            let text = tree.text_content(&m.original);
            (text != tree.text_content(&m.clone)).then_some(text)
        });
        ScrollMetrics {
            scroll_top: tree.scroll_top(&self.scroll_element),
            remaining_height: self
                .trailing_toolbars
                .iter()
                .map(|t| tree.client_height(t))
                .sum(),
            title_height: tree.client_height(&self.title_extent),
            title_text,
        }
    }

    pub fn frame(&self, metrics: &ScrollMetrics) -> ScrollFrame {
        let progress = title_progress(
            metrics.scroll_top,
            metrics.remaining_height,
            metrics.title_height,
        );
        ScrollFrame {
            scale: title_scale(progress, self.min_scale),
            opacity: progress,
            border_visible: metrics.scroll_top > 0.0,
        }
    }

    pub fn apply<T>(&self, host: &mut T, frame: &ScrollFrame, title_text: Option<&str>)
    where
        T: HeaderTreeMut<Node = N>,
    {
        if let Some(border) = &self.border_target {
            host.set_class(border, classes::TOOLBAR_BORDER_VISIBLE, frame.border_visible);
        }
        let Some(mirror) = &self.title_mirror else {
            return;
        };
        let scale = frame.scale;
        let transform = format!("scale3d({scale}, {scale}, 1)");
        let opacity = frame.opacity.to_string();
        host.set_style(&mirror.clone, "transform-origin", Some("left center"));
        host.set_style(&mirror.clone, "transform", Some(&transform));
        host.set_style(&mirror.clone, "opacity", Some(&opacity));
        if let Some(text) = title_text {
            host.set_text_content(&mirror.clone, text);
        }
    }
}
