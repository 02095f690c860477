/// Reasons the collapsing effect could not be set up.
///
/// None of these are fatal: the header keeps its non-collapsing rendering and the controller
/// retries on the next update.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CollapseError {
    /// No scrollable content region was found next to the condensing header.
    #[error("no scrollable content region found for the condensing header")]
    MissingScrollContainer,

    /// The page has no header that could act as the primary header.
    #[error("no primary header found on the page")]
    MissingPrimaryHeader,

    /// A header index was requested for a header without toolbars.
    #[error("header contains no toolbars")]
    NoToolbarsFound,

    /// The host cannot observe visibility thresholds.
    #[error("visibility observation is not available on this host")]
    ObserverUnavailable,
}

impl CollapseError {
    /// Whether a later update can succeed without the options changing.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ObserverUnavailable)
    }
}

/// Returned when parsing an unknown `collapse` value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown collapse mode `{0}` (expected `none` or `condense`)")]
pub struct ParseCollapseModeError(pub String);
