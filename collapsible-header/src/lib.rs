//! A headless engine for iOS-style collapsing headers.
//!
//! A page shows two headers: a compact *primary* header pinned at the top, and a *condensing*
//! header that lives inside the scrollable content and carries an enlarged title. As the content
//! scrolls, the large title shrinks and slides behind the primary header, which then takes over
//! and shows a mirrored copy of the title.
//!
//! This crate owns the coordination logic only:
//! - header indexing ([`HeaderIndex`])
//! - scroll-driven title scaling and border state ([`ScrollBridge`])
//! - threshold-based toolbar visibility ([`evaluate_visibility`])
//! - element mirroring between headers ([`ElementMirror`])
//! - the lifecycle state machine tying them together ([`CollapsibleHeader`])
//!
//! It is UI-agnostic. A DOM/TUI/GUI layer is expected to provide:
//! - tree reads and writes ([`HeaderTree`], [`HeaderTreeMut`])
//! - scroll listeners and a visibility-threshold observer ([`EventSource`])
//! - a way to find the scroll container and primary header ([`LocateCollapsibleContext`])
//!
//! Style reads and writes are batched through a [`FrameScheduler`]; the host calls
//! [`CollapsibleHeader::flush`] once per animation frame.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod controller;
mod error;
mod host;
mod index;
mod mirror;
mod observer;
mod options;
mod scheduler;
mod scroll;
mod state;
mod subscription;
mod types;


pub use controller::CollapsibleHeader;
pub use error::{CollapseError, ParseCollapseModeError};
pub use host::{
    CollapseHost, CollapsibleContext, EventSource, HeaderTree, HeaderTreeMut,
    LocateCollapsibleContext, classes, tags,
};
pub use index::{HeaderIndex, ToolbarIndex};
pub use mirror::{ElementMirror, MirrorPair};
pub use observer::{
    ToolbarVisibility, VISIBILITY_THRESHOLD, evaluate_visibility, visibility_options,
};
pub use options::{CollapseMode, CollapseOptions, StyleMode};
pub use scheduler::{FlushStats, FrameScheduler, WriteQueue};
pub use scroll::{ScrollBridge, ScrollFrame, ScrollMetrics, title_progress, title_scale};
pub use state::{CollapseSnapshot, CollapseState};
pub use subscription::{ObserverSubscription, ScrollSubscription, Subscriptions};
pub use types::{ListenerId, ObserverId, Rect, RootMargin, VisibilityEntry, VisibilityOptions};
