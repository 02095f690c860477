//! An in-memory host for the `collapsible-header` crate.
//!
//! The `collapsible-header` crate is UI-agnostic and only talks to its host through traits. This
//! crate provides a small, framework-neutral host that is useful for demos, tests and headless
//! adapters:
//!
//! - [`Document`]: a node tree with block layout, scroll offsets and a simulated
//!   visibility-threshold observer
//! - [`PageLocator`]: finds a condensing header's scroll container and primary header by page
//! - [`Driver`]: pumps document events into the controller and flushes frames
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod document;
mod driver;
mod locate;


pub use document::{Document, DocumentEvent, NodeId};
pub use driver::Driver;
pub use locate::{COLLAPSE_ATTRIBUTE, CONTENT, PAGE, PageLocator};
