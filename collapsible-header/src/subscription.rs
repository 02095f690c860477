use crate::{EventSource, ListenerId, ObserverId};

/// An owned scroll listener registration. Dispose it to unregister.
#[must_use = "dropping a subscription without disposing it leaks the host listener"]
#[derive(Debug, PartialEq, Eq)]
pub struct ScrollSubscription {
    id: ListenerId,
}

impl ScrollSubscription {
    pub fn listen<H: EventSource>(host: &mut H, scroll_element: &H::Node) -> Self {
        Self {
            id: host.listen_scroll(scroll_element),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn dispose<H: EventSource>(self, host: &mut H) {
        host.remove_scroll_listener(self.id);
    }
}

/// An owned visibility observer registration. Dispose it to disconnect.
#[must_use = "dropping a subscription without disposing it leaks the host observer"]
#[derive(Debug, PartialEq, Eq)]
pub struct ObserverSubscription {
    id: ObserverId,
}

impl ObserverSubscription {
    pub fn new(id: ObserverId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn dispose<H: EventSource>(self, host: &mut H) {
        host.disconnect_observer(self.id);
    }
}

/// The pair of registrations held by an active controller. Both are released together.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscriptions {
    pub scroll: ScrollSubscription,
    pub observer: ObserverSubscription,
}

impl Subscriptions {
    pub fn dispose<H: EventSource>(self, host: &mut H) {
        self.observer.dispose(host);
        self.scroll.dispose(host);
    }
}
