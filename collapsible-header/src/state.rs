/// Lifecycle state of a [`crate::CollapsibleHeader`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollapseState {
    /// Collapsing not requested, not supported by the style mode, or not available on the host.
    #[default]
    Disabled,
    /// Collapsing requested, but the subsystems are not wired yet.
    Uninitialized,
    /// Scroll bridge, visibility observer and mirrors are live.
    Active,
}

impl CollapseState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A lightweight, serializable snapshot of a controller.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollapseSnapshot {
    pub state: CollapseState,
    /// `None` unless the controller is active.
    pub primary_active: Option<bool>,
    pub condensing_active: Option<bool>,
    /// Number of live mirror clones.
    pub mirrors: usize,
}
