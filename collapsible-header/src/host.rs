use core::fmt;

use crate::{CollapseError, ListenerId, ObserverId, VisibilityOptions};

/// Tag names the engine looks for inside headers.
pub mod tags {
    pub const HEADER: &str = "header";
    pub const TOOLBAR: &str = "toolbar";
    pub const TOOLBAR_BACKGROUND: &str = "toolbar-background";
    pub const TITLE: &str = "title";
    pub const BACK_BUTTON: &str = "back-button";
}

/// Class names written by the engine. These are the only style-facing signals it produces
/// besides inline transform/opacity on mirrored titles.
pub mod classes {
    /// Present on a header root while that header is the visually dominant one.
    pub const HEADER_ACTIVE: &str = "header-collapse-active";
    /// Present on the primary header once collapsing is wired up.
    pub const HEADER_COLLAPSE_MAIN: &str = "header-collapse-main";
    /// Present on the primary header's last toolbar background once content has scrolled.
    pub const TOOLBAR_BORDER_VISIBLE: &str = "toolbar-border-visible";
    /// Marks a node as a mirror so header indexing skips it.
    pub const MIRROR: &str = "cloned-element";
}

/// Read access to the host's element tree.
///
/// Node handles are expected to be cheap to clone (ids, refcounted pointers).
pub trait HeaderTree {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// Descendants of `root` (excluding `root`) with the given tag, in document order.
    fn descendants_by_tag(&self, root: &Self::Node, tag: &str) -> Vec<Self::Node>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Rendered height in pixels.
    fn client_height(&self, node: &Self::Node) -> f64;

    /// Current vertical scroll offset of a scroll container.
    fn scroll_top(&self, scroll_element: &Self::Node) -> f64;

    fn text_content(&self, node: &Self::Node) -> String;

    /// First descendant with `tag` that is not a mirror.
    fn find_original(&self, root: &Self::Node, tag: &str) -> Option<Self::Node> {
        self.descendants_by_tag(root, tag)
            .into_iter()
            .find(|n| !self.has_class(n, classes::MIRROR))
    }
}

/// Write access to the host's element tree.
pub trait HeaderTreeMut: HeaderTree {
    fn set_class(&mut self, node: &Self::Node, class: &str, enabled: bool);

    /// Sets an inline style property, or removes it when `value` is `None`.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: Option<&str>);

    fn set_text_content(&mut self, node: &Self::Node, text: &str);

    /// Deep-clones `node`. The clone is detached until appended.
    fn clone_node(&mut self, node: &Self::Node) -> Self::Node;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Detaches `node` from its parent.
    fn remove(&mut self, node: &Self::Node);
}

/// Event registration primitives provided by the host.
///
/// The host later reports events by calling [`crate::CollapsibleHeader::on_scroll`] and
/// [`crate::CollapsibleHeader::on_visibility`] with the returned ids.
pub trait EventSource: HeaderTree {
    fn listen_scroll(&mut self, scroll_element: &Self::Node) -> ListenerId;

    fn remove_scroll_listener(&mut self, id: ListenerId);

    /// Starts observing `target`. Returns `None` when the host has no observation primitive.
    fn observe_visibility(
        &mut self,
        target: &Self::Node,
        options: &VisibilityOptions,
    ) -> Option<ObserverId>;

    fn disconnect_observer(&mut self, id: ObserverId);
}

/// Everything the controller needs from a host.
pub trait CollapseHost: HeaderTreeMut + EventSource {}

impl<T: HeaderTreeMut + EventSource> CollapseHost for T {}

/// Elements the condensing header collaborates with.
#[derive(Clone, Debug, PartialEq)]
pub struct CollapsibleContext<N> {
    pub scroll_element: N,
    pub primary_header: N,
}

/// Finds the scroll container and primary header belonging to a condensing header.
///
/// Closures of the form `Fn(&T, &T::Node) -> Result<CollapsibleContext<T::Node>, CollapseError>`
/// implement this trait, which is convenient for tests.
pub trait LocateCollapsibleContext<T: HeaderTree> {
    fn locate(
        &self,
        tree: &T,
        header: &T::Node,
    ) -> Result<CollapsibleContext<T::Node>, CollapseError>;
}

impl<T, F> LocateCollapsibleContext<T> for F
where
    T: HeaderTree,
    F: Fn(&T, &T::Node) -> Result<CollapsibleContext<T::Node>, CollapseError>,
{
    fn locate(
        &self,
        tree: &T,
        header: &T::Node,
    ) -> Result<CollapsibleContext<T::Node>, CollapseError> {
        self(tree, header)
    }
}
