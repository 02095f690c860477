use core::fmt;
use core::str::FromStr;

use crate::ParseCollapseModeError;
use crate::host::tags;
use crate::observer::VISIBILITY_THRESHOLD;

/// The `collapse` option of a header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CollapseMode {
    /// No collapsing.
    #[default]
    None,
    /// Collapse into the primary header when the style mode allows it.
    Condense,
}

impl CollapseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Condense => "condense",
        }
    }
}

impl FromStr for CollapseMode {
    type Err = ParseCollapseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(Self::None),
            "condense" => Ok(Self::Condense),
            other => Err(ParseCollapseModeError(other.to_owned())),
        }
    }
}

impl fmt::Display for CollapseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform style the page is rendered with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StyleMode {
    #[default]
    Ios,
    Md,
}

impl StyleMode {
    /// Only the iOS style has a large title to condense.
    pub fn supports_condense(self) -> bool {
        matches!(self, Self::Ios)
    }
}

/// Configuration for [`crate::CollapsibleHeader`].
#[derive(Clone, Debug, PartialEq)]
pub struct CollapseOptions {
    pub collapse: CollapseMode,
    pub mode: StyleMode,

    /// Smallest scale applied to the mirrored title once the large title is fully consumed.
    pub min_title_scale: f64,

    /// Visible fraction of the condensing toolbar below which the primary header takes over.
    pub visibility_threshold: f64,

    /// Tags cloned from the condensing header into the primary header.
    pub mirror_tags: Vec<String>,
}

impl Default for CollapseOptions {
    fn default() -> Self {
        Self {
            collapse: CollapseMode::None,
            mode: StyleMode::Ios,
            min_title_scale: 0.5,
            visibility_threshold: VISIBILITY_THRESHOLD,
            mirror_tags: vec![tags::TITLE.to_owned(), tags::BACK_BUTTON.to_owned()],
        }
    }
}

impl CollapseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with `collapse = condense` and everything else at its default.
    pub fn condense() -> Self {
        Self::default().with_collapse(CollapseMode::Condense)
    }

    /// Whether collapsing was requested and the style mode allows it.
    pub fn is_collapse_enabled(&self) -> bool {
        self.collapse == CollapseMode::Condense && self.mode.supports_condense()
    }

    pub fn with_collapse(mut self, collapse: CollapseMode) -> Self {
        self.collapse = collapse;
        self
    }

    pub fn with_mode(mut self, mode: StyleMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the minimum title scale, clamped to `[0, 1]`.
    pub fn with_min_title_scale(mut self, min_title_scale: f64) -> Self {
        self.min_title_scale = min_title_scale.clamp(0.0, 1.0);
        self
    }

    /// Sets the visibility threshold, clamped to `[0, 1]`.
    pub fn with_visibility_threshold(mut self, threshold: f64) -> Self {
        self.visibility_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_mirror_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mirror_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}
