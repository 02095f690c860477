use collapsible_header::{
    CollapseError, CollapseOptions, CollapseSnapshot, CollapseState, CollapsibleHeader,
    FlushStats, HeaderTree, ObserverId, VisibilityEntry,
};

use crate::{Document, DocumentEvent, NodeId, PageLocator};

/// Owns a [`Document`] and the controller for one condensing header, and moves events between
/// them.
///
/// Adapters drive it by calling:
/// - `update()` after building the page or changing options
/// - `scroll_to(offset)` for user scrolling
/// - `pump()` after mutating the document directly
#[derive(Debug)]
pub struct Driver {
    document: Document,
    controller: CollapsibleHeader<Document, PageLocator>,
}

impl Driver {
    pub fn new(document: Document, header: NodeId, options: CollapseOptions) -> Self {
        Self {
            document,
            controller: CollapsibleHeader::new(header, options, PageLocator::new()),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access to the tree. Call [`Driver::pump`] afterwards so queued events are handled.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn controller(&self) -> &CollapsibleHeader<Document, PageLocator> {
        &self.controller
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn set_options(&mut self, options: CollapseOptions) {
        self.controller.set_options(options);
    }

    /// Runs one controller lifecycle step and delivers whatever it triggered.
    pub fn update(&mut self) -> Result<CollapseState, CollapseError> {
        let state = self.controller.update(&mut self.document)?;
        self.pump();
        Ok(state)
    }

    /// Re-indexes both headers after the page structure changed.
    pub fn rebuild(&mut self) -> Result<(), CollapseError> {
        self.controller.rebuild(&mut self.document)?;
        self.pump();
        Ok(())
    }

    /// Dispatches queued document events, then flushes one frame.
    pub fn pump(&mut self) -> FlushStats {
        let mut batch: Vec<VisibilityEntry> = Vec::new();
        let mut batch_observer: Option<ObserverId> = None;
        for event in self.document.take_events() {
            match event {
                DocumentEvent::Scroll(listener) => {
                    self.controller.on_scroll(listener);
                }
                DocumentEvent::Visibility(observer, entry) => {
                    if batch_observer.is_some_and(|o| o != observer) {
                        self.flush_visibility(batch_observer, &mut batch);
                    }
                    batch_observer = Some(observer);
                    batch.push(entry);
                }
            }
        }
        self.flush_visibility(batch_observer, &mut batch);
        self.controller.flush(&mut self.document)
    }

    fn flush_visibility(
        &mut self,
        observer: Option<ObserverId>,
        batch: &mut Vec<VisibilityEntry>,
    ) {
        if let Some(observer) = observer {
            if !batch.is_empty() {
                self.controller.on_visibility(observer, &batch[..]);
            }
        }
        batch.clear();
    }

    /// Scrolls the content, as a user would, and delivers the resulting events. Returns the
    /// applied (clamped) offset, or `0.0` when nothing is wired.
    pub fn scroll_to(&mut self, offset: f64) -> f64 {
        let Some(&scroll_element) = self.controller.scroll_element() else {
            return 0.0;
        };
        let applied = self.document.set_scroll_top(scroll_element, offset);
        self.pump();
        applied
    }

    pub fn scroll_top(&self) -> f64 {
        self.controller
            .scroll_element()
            .map(|n| HeaderTree::scroll_top(&self.document, n))
            .unwrap_or(0.0)
    }

    /// Tears the controller down, as when the header leaves the page.
    pub fn detach(&mut self) {
        self.controller.detach(&mut self.document);
        // Drop entries that raced the teardown.
        self.document.take_events();
    }

    pub fn state(&self) -> CollapseState {
        self.controller.state()
    }

    pub fn snapshot(&self) -> CollapseSnapshot {
        self.controller.snapshot()
    }
}
