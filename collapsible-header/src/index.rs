use crate::host::{classes, tags};
use crate::{CollapseError, HeaderTree};

/// A toolbar inside a header.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolbarIndex<N> {
    pub element: N,
    /// Background/border decoration node.
    pub background: Option<N>,
    /// Scalable title. Only the first toolbar of a header carries one.
    pub title: Option<N>,
}

/// A snapshot of a header's toolbars.
///
/// The index is a pure read of the tree at build time; rebuild it after structural changes.
/// [`HeaderIndex::build`] is the only constructor, so the toolbar list is never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderIndex<N> {
    pub element: N,
    toolbars: Vec<ToolbarIndex<N>>,
    pub is_active: bool,
}

impl<N: Clone + PartialEq> HeaderIndex<N> {
    /// Indexes `header`, skipping mirror nodes.
    ///
    /// Fails with [`CollapseError::NoToolbarsFound`] when the header has no toolbars.
    pub fn build<T>(tree: &T, header: &N) -> Result<Self, CollapseError>
    where
        T: HeaderTree<Node = N>,
    {
        let toolbars: Vec<ToolbarIndex<N>> = tree
            .descendants_by_tag(header, tags::TOOLBAR)
            .into_iter()
            .filter(|el| !tree.has_class(el, classes::MIRROR))
            .enumerate()
            .map(|(i, element)| {
                let background = tree
                    .descendants_by_tag(&element, tags::TOOLBAR_BACKGROUND)
                    .into_iter()
                    .next();
                let title = if i == 0 {
                    tree.find_original(&element, tags::TITLE)
                } else {
                    None
                };
                ToolbarIndex {
                    element,
                    background,
                    title,
                }
            })
            .collect();

        if toolbars.is_empty() {
            cdebug!("HeaderIndex::build: header has no toolbars");
            return Err(CollapseError::NoToolbarsFound);
        }

        Ok(Self {
            element: header.clone(),
            toolbars,
            is_active: true,
        })
    }

    /// Toolbars in document order. Never empty.
    pub fn toolbars(&self) -> &[ToolbarIndex<N>] {
        &self.toolbars
    }

    pub fn first_toolbar(&self) -> &ToolbarIndex<N> {
        &self.toolbars[0]
    }

    pub fn last_toolbar(&self) -> &ToolbarIndex<N> {
        &self.toolbars[self.toolbars.len() - 1]
    }

    /// Toolbars after the first; their combined height is the "remaining height".
    pub fn trailing_toolbars(&self) -> &[ToolbarIndex<N>] {
        &self.toolbars[1..]
    }

    /// The scalable title of the first toolbar, if any.
    pub fn title(&self) -> Option<&N> {
        self.first_toolbar().title.as_ref()
    }

    /// Position of the toolbar containing `node`.
    pub fn toolbar_position<T>(&self, tree: &T, node: &N) -> Option<usize>
    where
        T: HeaderTree<Node = N>,
    {
        self.toolbars
            .iter()
            .position(|t| tree.contains(&t.element, node))
    }
}
