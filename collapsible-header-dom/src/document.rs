use std::collections::{BTreeMap, BTreeSet, VecDeque};

use collapsible_header::{
    EventSource, HeaderTree, HeaderTreeMut, ListenerId, ObserverId, Rect, VisibilityEntry,
    VisibilityOptions, classes,
};

/// Handle to a node in a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

/// An event queued by the document for the driver to dispatch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DocumentEvent {
    Scroll(ListenerId),
    Visibility(ObserverId, VisibilityEntry),
}

#[derive(Clone, Debug, Default)]
struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: BTreeSet<String>,
    styles: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    text: String,
    /// Explicit block height. `None` sizes the node to its children.
    height: Option<f64>,
    scroll_top: f64,
    translate_x: f64,
}

#[derive(Clone, Debug)]
struct Listener {
    id: ListenerId,
    target: NodeId,
}

#[derive(Clone, Debug)]
struct Observer {
    id: ObserverId,
    target: NodeId,
    options: VisibilityOptions,
    /// `(is_intersecting, above_threshold)` as of the last reported entry.
    last: Option<(bool, bool)>,
}

/// An in-memory node tree with block layout, scroll offsets and a visibility observer.
///
/// Layout is deliberately simple: every child is a full-width block stacked below its preceding
/// siblings, shifted up by its parent's `scroll_top` and sideways by its own translation. The
/// viewport is the observation root.
///
/// Scroll and visibility changes are not delivered directly; they are queued as
/// [`DocumentEvent`]s and drained with [`Document::take_events`].
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    viewport: Rect,
    hidden: bool,
    next_id: u64,
    listeners: Vec<Listener>,
    observers: Vec<Observer>,
    observers_supported: bool,
    events: VecDeque<DocumentEvent>,
}

impl Document {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        let root = NodeData {
            tag: "document".to_owned(),
            height: Some(viewport_height),
            ..NodeData::default()
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            viewport: Rect::new(0.0, 0.0, viewport_width, viewport_height),
            hidden: false,
            next_id: 0,
            listeners: Vec::new(),
            observers: Vec::new(),
            observers_supported: true,
            events: VecDeque::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: tag.to_owned(),
            ..NodeData::default()
        });
        id
    }

    /// Creates an element and appends it to `parent`.
    pub fn element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.attach(parent, id);
        id
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn set_height(&mut self, node: NodeId, height: f64) {
        self.nodes[node.0].height = Some(height.max(0.0));
    }

    /// Block height: the explicit height, or the sum of the children's heights.
    pub fn height(&self, node: NodeId) -> f64 {
        let data = &self.nodes[node.0];
        match data.height {
            Some(h) => h,
            None => data.children.iter().map(|&c| self.height(c)).sum(),
        }
    }

    /// Height of the content laid out inside `node`.
    pub fn content_height(&self, node: NodeId) -> f64 {
        self.nodes[node.0]
            .children
            .iter()
            .map(|&c| self.height(c))
            .sum()
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attributes
            .insert(name.to_owned(), value.to_owned());
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(name).map(String::as_str)
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = text.to_owned();
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.contains(class)
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes[node.0].styles.get(property).map(String::as_str)
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if self.nodes[n.0].tag == tag {
                return Some(n);
            }
            cur = self.nodes[n.0].parent;
        }
        None
    }

    /// First descendant of `root` with the given tag, in document order.
    pub fn first_descendant(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        for &child in &self.nodes[root.0].children {
            if self.nodes[child.0].tag == tag {
                return Some(child);
            }
            if let Some(found) = self.first_descendant(child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// Whether `node` is connected to the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains_node(self.root, node)
    }

    /// Nodes carrying the mirror class, in document order.
    pub fn mirrors(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.root, &mut |n| {
            if self.has_class(n, classes::MIRROR) {
                out.push(n);
            }
        });
        out
    }

    /// Largest valid `scroll_top` for `node`.
    pub fn max_scroll_top(&self, node: NodeId) -> f64 {
        (self.content_height(node) - self.height(node)).max(0.0)
    }

    /// Scrolls `node`, clamped to its scroll range. Queues scroll events when the offset changes
    /// and re-evaluates every observer. Returns the applied offset.
    pub fn set_scroll_top(&mut self, node: NodeId, scroll_top: f64) -> f64 {
        let clamped = scroll_top.clamp(0.0, self.max_scroll_top(node));
        let data = &mut self.nodes[node.0];
        if data.scroll_top == clamped {
            return clamped;
        }
        data.scroll_top = clamped;
        dtrace!(node = node.0, scroll_top = clamped, "Document: scrolled");

        let ids: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|l| l.target == node)
            .map(|l| l.id)
            .collect();
        self.events.extend(ids.into_iter().map(DocumentEvent::Scroll));
        self.refresh_observers();
        clamped
    }

    /// Shifts `node` horizontally, as a page transition would.
    pub fn set_translate_x(&mut self, node: NodeId, x: f64) {
        self.nodes[node.0].translate_x = x;
        self.refresh_observers();
    }

    /// Simulates the page being hidden: the observation root collapses to nothing.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.refresh_observers();
    }

    /// Hosts without a visibility observer refuse every `observe_visibility` call.
    pub fn set_observers_supported(&mut self, supported: bool) {
        self.observers_supported = supported;
    }

    pub fn scroll_listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Drains queued events in the order they occurred.
    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        self.events.drain(..).collect()
    }

    /// Position of `node` on screen.
    pub fn layout_rect(&self, node: NodeId) -> Rect {
        let data = &self.nodes[node.0];
        let Some(parent) = data.parent else {
            return Rect::new(data.translate_x, 0.0, self.viewport.width, self.height(node));
        };
        let outer = self.layout_rect(parent);
        let preceding: f64 = self.nodes[parent.0]
            .children
            .iter()
            .take_while(|&&c| c != node)
            .map(|&c| self.height(c))
            .sum();
        Rect::new(
            outer.x + data.translate_x,
            outer.y + preceding - self.nodes[parent.0].scroll_top,
            outer.width,
            self.height(node),
        )
    }

    /// Re-evaluates every observer and queues an entry for each whose state crossed the
    /// threshold since its last report.
    pub fn refresh_observers(&mut self) {
        for i in 0..self.observers.len() {
            let observer = &self.observers[i];
            let entry = self.entry_for(observer.target, &observer.options);
            let state = (
                entry.is_intersecting,
                entry.intersection_ratio >= observer.options.threshold,
            );
            if self.observers[i].last == Some(state) {
                continue;
            }
            self.observers[i].last = Some(state);
            let id = self.observers[i].id;
            dtrace!(
                observer = id.0,
                ratio = entry.intersection_ratio,
                "Document: visibility entry"
            );
            self.events.push_back(DocumentEvent::Visibility(id, entry));
        }
    }

    fn entry_for(&self, target: NodeId, options: &VisibilityOptions) -> VisibilityEntry {
        let root_bounds = if self.hidden {
            Rect::default()
        } else {
            options.root_margin.apply(self.viewport)
        };
        let bounding_rect = self.layout_rect(target);
        let attached = self.is_attached(target);
        let intersection_rect = if attached {
            bounding_rect.intersection(&root_bounds)
        } else {
            Rect::default()
        };
        let area = bounding_rect.area();
        let intersection_ratio = if area > 0.0 {
            (intersection_rect.area() / area).clamp(0.0, 1.0)
        } else {
            0.0
        };
        VisibilityEntry {
            is_intersecting: intersection_rect.area() > 0.0,
            intersection_ratio,
            intersection_rect,
            bounding_rect,
            root_bounds: Some(root_bounds),
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    fn contains_node(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes[n.0].parent;
        }
        false
    }

    fn walk(&self, node: NodeId, f: &mut impl FnMut(NodeId)) {
        for &child in &self.nodes[node.0].children {
            f(child);
            self.walk(child, f);
        }
    }

    fn deep_clone(&mut self, node: NodeId) -> NodeId {
        let mut data = self.nodes[node.0].clone();
        let children = std::mem::take(&mut data.children);
        data.parent = None;
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        for child in children {
            let copy = self.deep_clone(child);
            self.attach(id, copy);
        }
        id
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let data = &self.nodes[node.0];
        out.push_str(&data.text);
        for &child in &data.children {
            self.collect_text(child, out);
        }
    }
}

impl HeaderTree for Document {
    type Node = NodeId;

    fn descendants_by_tag(&self, root: &NodeId, tag: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(*root, &mut |n| {
            if self.nodes[n.0].tag == tag {
                out.push(n);
            }
        });
        out
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        Document::has_class(self, *node, class)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.contains_node(*ancestor, *node)
    }

    fn client_height(&self, node: &NodeId) -> f64 {
        self.height(*node)
    }

    fn scroll_top(&self, scroll_element: &NodeId) -> f64 {
        self.nodes[scroll_element.0].scroll_top
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.collect_text(*node, &mut out);
        out
    }
}

impl HeaderTreeMut for Document {
    fn set_class(&mut self, node: &NodeId, class: &str, enabled: bool) {
        let classes = &mut self.nodes[node.0].classes;
        if enabled {
            classes.insert(class.to_owned());
        } else {
            classes.remove(class);
        }
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: Option<&str>) {
        let styles = &mut self.nodes[node.0].styles;
        match value {
            Some(v) => {
                styles.insert(property.to_owned(), v.to_owned());
            }
            None => {
                styles.remove(property);
            }
        }
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[node.0].text = text.to_owned();
    }

    fn clone_node(&mut self, node: &NodeId) -> NodeId {
        self.deep_clone(*node)
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.attach(*parent, *child);
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }
}

impl EventSource for Document {
    fn listen_scroll(&mut self, scroll_element: &NodeId) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listeners.push(Listener {
            id,
            target: *scroll_element,
        });
        ddebug!(listener = id.0, "Document: scroll listener added");
        id
    }

    fn remove_scroll_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|l| l.id != id);
    }

    fn observe_visibility(
        &mut self,
        target: &NodeId,
        options: &VisibilityOptions,
    ) -> Option<ObserverId> {
        if !self.observers_supported {
            return None;
        }
        let id = ObserverId(self.next_id());
        self.observers.push(Observer {
            id,
            target: *target,
            options: *options,
            last: None,
        });
        ddebug!(observer = id.0, "Document: observer added");
        // Observers report the initial state right away.
        self.refresh_observers();
        Some(id)
    }

    fn disconnect_observer(&mut self, id: ObserverId) {
        self.observers.retain(|o| o.id != id);
        self.events.retain(|e| !matches!(e, DocumentEvent::Visibility(o, _) if *o == id));
    }
}
