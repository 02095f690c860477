use collapsible_header::{
    CollapseError, CollapseMode, CollapsibleContext, HeaderTree, LocateCollapsibleContext, tags,
};

use crate::{Document, NodeId};

/// Tag of the container that scopes a page's headers and content.
pub const PAGE: &str = "page";
/// Tag of a page's scrollable content region.
pub const CONTENT: &str = "content";
/// Attribute carrying a header's [`CollapseMode`].
pub const COLLAPSE_ATTRIBUTE: &str = "collapse";

/// Locates the scroll container and primary header within the condensing header's page.
///
/// - the page is the nearest `page` ancestor
/// - the scroll container is the page's first `content` descendant
/// - the primary header is the page's first header that is not itself condensing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageLocator;

impl PageLocator {
    pub fn new() -> Self {
        Self
    }

    fn is_condensing(document: &Document, header: NodeId) -> bool {
        document
            .attribute(header, COLLAPSE_ATTRIBUTE)
            .and_then(|v| v.parse::<CollapseMode>().ok())
            == Some(CollapseMode::Condense)
    }
}

impl LocateCollapsibleContext<Document> for PageLocator {
    fn locate(
        &self,
        document: &Document,
        header: &NodeId,
    ) -> Result<CollapsibleContext<NodeId>, CollapseError> {
        let page = document
            .parent(*header)
            .and_then(|p| document.closest(p, PAGE))
            .ok_or(CollapseError::MissingScrollContainer)?;
        let scroll_element = document
            .first_descendant(page, CONTENT)
            .ok_or(CollapseError::MissingScrollContainer)?;
        let primary_header = document
            .descendants_by_tag(&page, tags::HEADER)
            .into_iter()
            .find(|&h| h != *header && !Self::is_condensing(document, h))
            .ok_or(CollapseError::MissingPrimaryHeader)?;

        Ok(CollapsibleContext {
            scroll_element,
            primary_header,
        })
    }
}
