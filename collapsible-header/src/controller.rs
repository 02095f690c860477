use core::fmt;
use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::host::classes;
use crate::observer::{evaluate_visibility, visibility_options};
use crate::{
    CollapseError, CollapseHost, CollapseOptions, CollapseSnapshot, CollapseState, ElementMirror,
    FlushStats, FrameScheduler, HeaderIndex, ListenerId, LocateCollapsibleContext, ObserverId,
    ObserverSubscription, ScrollBridge, ScrollSubscription, Subscriptions, VisibilityEntry,
    WriteQueue,
};

/// Everything that exists only while collapsing is active.
#[derive(Debug)]
struct Wired<N> {
    scroll_element: N,
    primary: HeaderIndex<N>,
    condensing: HeaderIndex<N>,
    mirrors: ElementMirror<N>,
    /// Shared with a pending scroll frame, which reads it when the frame is flushed.
    bridge: Rc<RefCell<ScrollBridge<N>>>,
    subscriptions: Subscriptions,
    /// Target and primary header height the observer was created with.
    observed: (N, f64),
}

/// Coordinates a condensing header with its page's primary header.
///
/// This type does not hold any UI objects beyond node handles. Adapters drive it by calling:
/// - `update(host)` when the header is attached or its options change
/// - `on_scroll` / `on_visibility` when the host reports events for the registered ids
/// - `flush(host)` once per animation frame to apply batched reads/writes
/// - `detach(host)` when the header leaves the tree
///
/// ```text
/// Disabled <-> Uninitialized -> Active -> Disabled
/// ```
pub struct CollapsibleHeader<H: CollapseHost, L> {
    header: H::Node,
    options: CollapseOptions,
    locator: L,
    state: CollapseState,
    wired: Option<Wired<H::Node>>,
    observer_unavailable: bool,
    scroll_frame_pending: bool,
    scheduler: FrameScheduler<H>,
}

impl<H, L> CollapsibleHeader<H, L>
where
    H: CollapseHost + 'static,
    L: LocateCollapsibleContext<H>,
{
    /// Creates a controller for the condensing header `header`. Nothing is wired until
    /// [`CollapsibleHeader::update`] runs.
    pub fn new(header: H::Node, options: CollapseOptions, locator: L) -> Self {
        Self {
            header,
            options,
            locator,
            state: CollapseState::Disabled,
            wired: None,
            observer_unavailable: false,
            scroll_frame_pending: false,
            scheduler: FrameScheduler::new(),
        }
    }

    pub fn header(&self) -> &H::Node {
        &self.header
    }

    pub fn options(&self) -> &CollapseOptions {
        &self.options
    }

    /// Replaces the options. Eligibility changes take effect on the next `update`.
    ///
    /// The title scale bound applies to an active controller on the next flush; the visibility
    /// threshold only applies to observers created afterwards.
    pub fn set_options(&mut self, options: CollapseOptions) {
        self.observer_unavailable = false;
        let rescale = match &self.wired {
            Some(wired) => {
                wired.bridge.borrow_mut().min_scale = options.min_title_scale;
                true
            }
            None => false,
        };
        self.options = options;
        if rescale {
            self.schedule_scroll_frame();
        }
    }

    pub fn state(&self) -> CollapseState {
        self.state
    }

    /// Runs one lifecycle step.
    ///
    /// Errors are soft: the controller stays `Uninitialized` and the next update retries. A host
    /// without visibility observation degrades to `Disabled` until the options are replaced.
    pub fn update(&mut self, host: &mut H) -> Result<CollapseState, CollapseError> {
        if !self.options.is_collapse_enabled() || self.observer_unavailable {
            if self.wired.is_some() {
                self.teardown(host);
            }
            self.state = CollapseState::Disabled;
            return Ok(self.state);
        }

        if self.wired.is_some() {
            return Ok(self.state);
        }

        self.state = CollapseState::Uninitialized;
        match self.setup(host) {
            Ok(wired) => {
                cdebug!(
                    toolbars = wired.condensing.toolbars().len(),
                    mirrors = wired.mirrors.len(),
                    "CollapsibleHeader: active"
                );
                self.wired = Some(wired);
                self.state = CollapseState::Active;
                self.schedule_scroll_frame();
                Ok(self.state)
            }
            Err(CollapseError::ObserverUnavailable) => {
                cwarn!("CollapsibleHeader: visibility observation unavailable, disabling");
                self.observer_unavailable = true;
                self.state = CollapseState::Disabled;
                Ok(self.state)
            }
            Err(err) => {
                cwarn!(error = %err, "CollapsibleHeader: setup skipped");
                Err(err)
            }
        }
    }

    fn setup(&mut self, host: &mut H) -> Result<Wired<H::Node>, CollapseError> {
        let context = self.locator.locate(&*host, &self.header)?;
        let mut primary = HeaderIndex::build(&*host, &context.primary_header)?;
        let mut condensing = HeaderIndex::build(&*host, &self.header)?;
        let (observer, observed) = self.observe(host, &primary, &condensing)?;
        let subscriptions = Subscriptions {
            scroll: ScrollSubscription::listen(host, &context.scroll_element),
            observer,
        };

        let mut mirrors = ElementMirror::new();
        mirrors.sync(host, &condensing, &primary, &self.options.mirror_tags);

        primary.is_active = false;
        condensing.is_active = true;
        host.set_class(&primary.element, classes::HEADER_ACTIVE, false);
        host.set_class(&condensing.element, classes::HEADER_ACTIVE, true);
        host.set_class(&primary.element, classes::HEADER_COLLAPSE_MAIN, true);

        let bridge = ScrollBridge::new(
            context.scroll_element.clone(),
            &condensing,
            &primary,
            mirrors.title().cloned(),
            self.options.min_title_scale,
        );

        Ok(Wired {
            scroll_element: context.scroll_element,
            primary,
            condensing,
            mirrors,
            bridge: Rc::new(RefCell::new(bridge)),
            subscriptions,
            observed,
        })
    }

    /// Observes the condensing header's first toolbar, with the root shrunk by the primary
    /// header's current height.
    fn observe(
        &self,
        host: &mut H,
        primary: &HeaderIndex<H::Node>,
        condensing: &HeaderIndex<H::Node>,
    ) -> Result<(ObserverSubscription, (H::Node, f64)), CollapseError> {
        let target = condensing.first_toolbar().element.clone();
        let primary_height = host.client_height(&primary.element);
        let options = visibility_options(primary_height, self.options.visibility_threshold);
        let id = host
            .observe_visibility(&target, &options)
            .ok_or(CollapseError::ObserverUnavailable)?;
        Ok((ObserverSubscription::new(id), (target, primary_height)))
    }

    fn teardown(&mut self, host: &mut H) {
        let Some(mut wired) = self.wired.take() else {
            return;
        };
        wired.subscriptions.dispose(host);
        self.scheduler.clear();
        self.scroll_frame_pending = false;

        wired.mirrors.clear(host);
        host.set_class(&wired.primary.element, classes::HEADER_COLLAPSE_MAIN, false);
        host.set_class(&wired.primary.element, classes::HEADER_ACTIVE, false);
        host.set_class(&wired.condensing.element, classes::HEADER_ACTIVE, false);
        let border = wired.bridge.borrow().border_target.clone();
        if let Some(border) = &border {
            host.set_class(border, classes::TOOLBAR_BORDER_VISIBLE, false);
        }
        cdebug!("CollapsibleHeader: torn down");
    }

    /// Tears everything down and returns to `Disabled`.
    pub fn detach(&mut self, host: &mut H) {
        self.teardown(host);
        self.state = CollapseState::Disabled;
    }

    /// Re-indexes both headers after a structural change and re-syncs mirrors.
    ///
    /// Active flags and the scroll listener are kept. The observer is recreated when the
    /// condensing header's first toolbar or the primary header's height changed; if the host
    /// refuses, the controller tears down and stays `Disabled` until the options are replaced.
    /// Does nothing unless active.
    pub fn rebuild(&mut self, host: &mut H) -> Result<(), CollapseError> {
        let Some(wired) = &self.wired else {
            return Ok(());
        };
        let mut primary = HeaderIndex::build(&*host, &wired.primary.element)?;
        let mut condensing = HeaderIndex::build(&*host, &wired.condensing.element)?;
        primary.is_active = wired.primary.is_active;
        condensing.is_active = wired.condensing.is_active;

        let (target, height) = &wired.observed;
        let moved = *target != condensing.first_toolbar().element
            || *height != host.client_height(&primary.element);
        let observer = if moved {
            match self.observe(host, &primary, &condensing) {
                Ok(observer) => Some(observer),
                Err(err) => {
                    cwarn!(error = %err, "CollapsibleHeader: re-observe failed, disabling");
                    self.observer_unavailable = true;
                    self.detach(host);
                    return Err(err);
                }
            }
        } else {
            None
        };

        let Some(wired) = &mut self.wired else {
            return Ok(());
        };
        if let Some((observer, observed)) = observer {
            let stale = mem::replace(&mut wired.subscriptions.observer, observer);
            stale.dispose(host);
            wired.observed = observed;
            cdebug!("CollapsibleHeader: observer moved");
        }

        wired
            .mirrors
            .sync(host, &condensing, &primary, &self.options.mirror_tags);
        *wired.bridge.borrow_mut() = ScrollBridge::new(
            wired.scroll_element.clone(),
            &condensing,
            &primary,
            wired.mirrors.title().cloned(),
            self.options.min_title_scale,
        );
        wired.primary = primary;
        wired.condensing = condensing;
        self.schedule_scroll_frame();
        Ok(())
    }

    /// Ensures mirrors exist for every configured tag and drops those whose original is gone.
    /// Idempotent; returns the number of clones created.
    pub fn sync_mirrors(&mut self, host: &mut H) -> usize {
        let Some(wired) = &mut self.wired else {
            return 0;
        };
        let created = wired.mirrors.sync(
            host,
            &wired.condensing,
            &wired.primary,
            &self.options.mirror_tags,
        );
        let title = wired.mirrors.title().cloned();
        let title_changed = {
            let mut bridge = wired.bridge.borrow_mut();
            let changed = bridge.title_mirror != title;
            bridge.title_mirror = title;
            changed
        };
        if created > 0 || title_changed {
            self.schedule_scroll_frame();
        }
        created
    }

    /// Handles a scroll event from the host. Returns `false` for unknown or stale listeners.
    pub fn on_scroll(&mut self, listener: ListenerId) -> bool {
        match &self.wired {
            Some(wired) if wired.subscriptions.scroll.id() == listener => {}
            _ => {
                ctrace!(?listener, "CollapsibleHeader: ignoring scroll event");
                return false;
            }
        }
        self.schedule_scroll_frame();
        true
    }

    /// Handles a batch of observer entries. The most recent entry decides.
    ///
    /// The active flags change immediately; the matching class writes run on the next flush.
    /// Returns `true` when the entry was applied.
    pub fn on_visibility(&mut self, observer: ObserverId, entries: &[VisibilityEntry]) -> bool {
        let Some(wired) = &mut self.wired else {
            return false;
        };
        if wired.subscriptions.observer.id() != observer {
            ctrace!(?observer, "CollapsibleHeader: ignoring stale observer");
            return false;
        }
        let Some(entry) = entries.last() else {
            return false;
        };
        let Some(visibility) = evaluate_visibility(entry, self.options.visibility_threshold)
        else {
            return false;
        };

        let primary_active = visibility.primary_active();
        ctrace!(
            ratio = entry.intersection_ratio,
            primary_active,
            "CollapsibleHeader: visibility"
        );
        wired.primary.is_active = primary_active;
        wired.condensing.is_active = !primary_active;

        let primary = wired.primary.element.clone();
        let condensing = wired.condensing.element.clone();
        let background = wired.primary.first_toolbar().background.clone();
        self.scheduler.write(move |host: &mut H| {
            host.set_class(&primary, classes::HEADER_ACTIVE, primary_active);
            host.set_class(&condensing, classes::HEADER_ACTIVE, !primary_active);
            if let Some(background) = &background {
                let opacity = visibility.background_opacity.map(|o| o.to_string());
                host.set_style(background, "--opacity", opacity.as_deref());
            }
        });
        true
    }

    fn schedule_scroll_frame(&mut self) {
        if self.scroll_frame_pending {
            return;
        }
        let Some(wired) = &self.wired else {
            return;
        };
        let bridge = Rc::clone(&wired.bridge);
        self.scroll_frame_pending = true;
        self.scheduler.read(move |host: &H, writes: &mut WriteQueue<H>| {
            let (metrics, frame) = {
                let current = bridge.borrow();
                let metrics = current.measure(host);
                let frame = current.frame(&metrics);
                (metrics, frame)
            };
            ctrace!(
                scroll_top = metrics.scroll_top,
                scale = frame.scale,
                border = frame.border_visible,
                "CollapsibleHeader: scroll frame"
            );
            let title_text = metrics.title_text;
            writes.push(move |host: &mut H| {
                bridge.borrow().apply(host, &frame, title_text.as_deref());
            });
        });
    }

    /// Applies pending work: all reads first, then all writes.
    pub fn flush(&mut self, host: &mut H) -> FlushStats {
        self.scroll_frame_pending = false;
        self.scheduler.flush(host)
    }

    pub fn scheduler(&self) -> &FrameScheduler<H> {
        &self.scheduler
    }

    pub fn primary_index(&self) -> Option<&HeaderIndex<H::Node>> {
        self.wired.as_ref().map(|w| &w.primary)
    }

    pub fn condensing_index(&self) -> Option<&HeaderIndex<H::Node>> {
        self.wired.as_ref().map(|w| &w.condensing)
    }

    pub fn mirrors(&self) -> Option<&ElementMirror<H::Node>> {
        self.wired.as_ref().map(|w| &w.mirrors)
    }

    pub fn scroll_element(&self) -> Option<&H::Node> {
        self.wired.as_ref().map(|w| &w.scroll_element)
    }

    pub fn scroll_listener(&self) -> Option<ListenerId> {
        self.wired.as_ref().map(|w| w.subscriptions.scroll.id())
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.wired.as_ref().map(|w| w.subscriptions.observer.id())
    }

    pub fn snapshot(&self) -> CollapseSnapshot {
        CollapseSnapshot {
            state: self.state,
            primary_active: self.wired.as_ref().map(|w| w.primary.is_active),
            condensing_active: self.wired.as_ref().map(|w| w.condensing.is_active),
            mirrors: self.wired.as_ref().map(|w| w.mirrors.len()).unwrap_or(0),
        }
    }
}

impl<H: CollapseHost, L> fmt::Debug for CollapsibleHeader<H, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollapsibleHeader")
            .field("header", &self.header)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("wired", &self.wired)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
