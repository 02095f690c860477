use crate::host::{classes, tags};
use crate::{HeaderIndex, HeaderTreeMut};

/// An original element in the condensing header and its copy in the primary header.
#[derive(Clone, Debug, PartialEq)]
pub struct MirrorPair<N> {
    pub tag: String,
    pub original: N,
    pub clone: N,
}

/// Owns the mirrored copies placed in the primary header.
///
/// Clones are tracked explicitly as [`MirrorPair`]s; the tree is never scanned for previous
/// clones. Clones are only ever mutated through this type and the scroll bridge.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementMirror<N> {
    pairs: Vec<MirrorPair<N>>,
}

impl<N> Default for ElementMirror<N> {
    fn default() -> Self {
        Self { pairs: Vec::new() }
    }
}

impl<N: Clone + PartialEq> ElementMirror<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairs(&self) -> &[MirrorPair<N>] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pair(&self, tag: &str) -> Option<&MirrorPair<N>> {
        self.pairs.iter().find(|p| p.tag == tag)
    }

    /// The mirrored title, if one was created.
    pub fn title(&self) -> Option<&MirrorPair<N>> {
        self.pair(tags::TITLE)
    }

    /// Ensures one clone per tag in `tags` whose original exists in the condensing header.
    ///
    /// Each clone is appended to the primary toolbar at the same position as the toolbar
    /// holding the original (or the primary's last toolbar when it has fewer). Calling this
    /// again is a no-op for pairs whose original is unchanged; a pair whose original was
    /// replaced is re-cloned, and a pair whose original is gone is dropped along with its clone.
    /// Returns the number of clones created.
    pub fn sync<T>(
        &mut self,
        host: &mut T,
        condensing: &HeaderIndex<N>,
        primary: &HeaderIndex<N>,
        tags: &[String],
    ) -> usize
    where
        T: HeaderTreeMut<Node = N>,
    {
        let mut created = 0usize;
        for tag in tags {
            let Some(original) = host.find_original(&condensing.element, tag) else {
                if let Some(pos) = self.pairs.iter().position(|p| &p.tag == tag) {
                    let orphan = self.pairs.remove(pos);
                    host.remove(&orphan.clone);
                    cdebug!(tag = tag.as_str(), "ElementMirror::sync: original gone");
                }
                continue;
            };

            if let Some(pos) = self.pairs.iter().position(|p| &p.tag == tag) {
                if self.pairs[pos].original == original {
                    continue;
                }
                let stale = self.pairs.remove(pos);
                host.remove(&stale.clone);
            }

            let position = condensing.toolbar_position(&*host, &original).unwrap_or(0);
            let target = primary
                .toolbars()
                .get(position)
                .unwrap_or_else(|| primary.last_toolbar());

            let clone = host.clone_node(&original);
            host.set_class(&clone, classes::MIRROR, true);
            host.append_child(&target.element, &clone);
            cdebug!(tag = tag.as_str(), position, "ElementMirror::sync: cloned");

            self.pairs.push(MirrorPair {
                tag: tag.clone(),
                original,
                clone,
            });
            created += 1;
        }
        created
    }

    /// Removes every clone from the tree.
    pub fn clear<T>(&mut self, host: &mut T)
    where
        T: HeaderTreeMut<Node = N>,
    {
        for pair in self.pairs.drain(..) {
            host.remove(&pair.clone);
        }
    }

    /// Whether `node` is one of the tracked clones.
    pub fn is_clone(&self, node: &N) -> bool {
        self.pairs.iter().any(|p| &p.clone == node)
    }
}
