//! Playlist tree
//!
//! Directories and files merged into one forest of [`Node`]s stored in a
//! flat arena. Parent links are indices, so absolute paths are rebuilt by
//! walking up without back-pointers.
//!
//! Playable items are implicitly numbered `0..item_count()` in pre-order
//! (top-level nodes first, then their children). The numbering and the
//! cached counts behind it are invalidated by every mutation and rebuilt
//! lazily on the next read.

mod format;
mod node;

pub use format::HEADER;
pub use node::{join_path, split_path, Node, NodeId, ROOT_NAME, SEPARATOR};

use crate::error::{CanopyError, Result};
use node::is_valid_name;
use std::cell::OnceCell;

/// Hierarchical item collection
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,

    /// Playable items per subtree, indexed by arena slot
    counts: OnceCell<Vec<usize>>,
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the forest has no nodes at all
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of nodes, playable or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level nodes in insertion order
    pub fn top_level(&self) -> &[NodeId] {
        &self.roots
    }

    /// Get a node by id
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree snapshot.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a node by id, `None` if the id is out of range
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Children of `id` in insertion order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Insert an item path, creating intermediate directory nodes
    ///
    /// Inserting the same path twice reuses the existing nodes. Returns the
    /// node of the last segment, now playable.
    pub fn insert_item(&mut self, path: &str) -> Result<NodeId> {
        let segments = split_path(path)?;

        let mut current = None;
        for segment in segments {
            let next = match self.child_named(current, segment) {
                Some(id) => id,
                None => self.push_node(current, segment),
            };
            current = Some(next);
        }

        let Some(id) = current else {
            return Err(CanopyError::invalid_path(path, "path has no segments"));
        };
        self.nodes[id.0].playable = true;
        self.nodes_changed();
        Ok(id)
    }

    /// Follow `segments` from the top level
    ///
    /// Returns `None` as soon as a segment is missing at its level.
    pub fn descendant<S: AsRef<str>>(&self, segments: &[S]) -> Option<NodeId> {
        self.descend(None, segments)
    }

    /// Follow `segments` starting below `node`
    pub fn descendant_of<S: AsRef<str>>(&self, node: NodeId, segments: &[S]) -> Option<NodeId> {
        self.descend(Some(node), segments)
    }

    /// Look up a node by its absolute path
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let segments = split_path(path).ok()?;
        self.descendant(&segments)
    }

    /// Mark a node as playable or not
    pub fn set_playable(&mut self, id: NodeId, playable: bool) {
        if self.nodes[id.0].playable != playable {
            self.nodes[id.0].playable = playable;
            self.nodes_changed();
        }
    }

    /// Remove `id` and its whole subtree
    ///
    /// Invalidates every `NodeId` obtained before the call.
    pub fn remove(&mut self, id: NodeId) {
        match self.nodes[id.0].parent {
            Some(parent) => self.nodes[parent.0].children.retain(|&child| child != id),
            None => self.roots.retain(|&root| root != id),
        }
        self.compact();
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.nodes_changed();
    }

    /// Remove non-playable nodes that have no playable descendant
    ///
    /// Playable nodes always survive, childless or not. Returns how many
    /// nodes were removed; a second call returns 0.
    pub fn clean_up(&mut self) -> usize {
        let before = self.nodes.len();

        let roots = std::mem::take(&mut self.roots);
        let kept: Vec<NodeId> = roots.into_iter().filter(|&root| self.prune(root)).collect();
        self.roots = kept;
        self.compact();

        before - self.nodes.len()
    }

    /// Drop cached counts after direct structural changes
    ///
    /// Every mutating method already calls this; it stays public for callers
    /// that want to force a recount.
    pub fn nodes_changed(&mut self) {
        self.counts.take();
    }

    /// Number of playable items in the forest
    pub fn item_count(&self) -> usize {
        let counts = self.subtree_counts();
        self.roots.iter().map(|root| counts[root.0]).sum()
    }

    /// Number of playable items in the subtree rooted at `id`
    pub fn subtree_item_count(&self, id: NodeId) -> usize {
        self.subtree_counts()[id.0]
    }

    /// Node of the playable item with pre-order number `item`
    ///
    /// Descends by cached subtree counts instead of flattening the forest.
    pub fn item_node(&self, item: usize) -> Option<NodeId> {
        let counts = self.subtree_counts();
        let mut remaining = item;
        let mut level: &[NodeId] = &self.roots;

        'descend: loop {
            for &id in level {
                let count = counts[id.0];
                if remaining >= count {
                    remaining -= count;
                    continue;
                }

                let node = &self.nodes[id.0];
                if node.playable {
                    if remaining == 0 {
                        return Some(id);
                    }
                    remaining -= 1;
                }
                level = &node.children;
                continue 'descend;
            }
            return None;
        }
    }

    /// Absolute path of the playable item with pre-order number `item`
    pub fn item_path(&self, item: usize) -> Option<String> {
        self.item_node(item).map(|id| self.absolute_path(id))
    }

    /// Absolute path of a node
    pub fn absolute_path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            names.push(node.name.as_str());
            current = node.parent;
        }
        join_path(names.into_iter().rev())
    }

    /// Pre-order walk over every node
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(self, &self.roots)
    }

    /// Absolute paths of all playable items, in pre-order
    pub fn items(&self) -> impl Iterator<Item = String> + '_ {
        self.playable_paths(self.preorder())
    }

    /// Collect all playable item paths into any container
    ///
    /// ```
    /// use canopy_core::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert_item("music/b.mp3").unwrap();
    /// tree.insert_item("music/a.mp3").unwrap();
    ///
    /// let items: Vec<String> = tree.all_items();
    /// assert_eq!(items, ["music/b.mp3", "music/a.mp3"]);
    /// ```
    pub fn all_items<C: FromIterator<String>>(&self) -> C {
        self.items().collect()
    }

    /// Playable item paths inside the subtree rooted at `id`, `id` included
    pub fn items_under(&self, id: NodeId) -> Vec<String> {
        self.playable_paths(Preorder::new(self, &[id])).collect()
    }

    fn playable_paths<'a>(&'a self, walk: Preorder<'a>) -> impl Iterator<Item = String> + 'a {
        walk.filter(move |&id| self.nodes[id.0].playable)
            .map(move |id| self.absolute_path(id))
    }

    fn descend<S: AsRef<str>>(&self, start: Option<NodeId>, segments: &[S]) -> Option<NodeId> {
        let mut current = start;
        for segment in segments {
            current = Some(self.child_named(current, segment.as_ref())?);
        }
        current
    }

    fn siblings(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(id) => &self.nodes[id.0].children,
            None => &self.roots,
        }
    }

    fn child_named(&self, parent: Option<NodeId>, name: &str) -> Option<NodeId> {
        self.siblings(parent)
            .iter()
            .copied()
            .find(|&id| self.nodes[id.0].name == name)
    }

    /// Append a new non-playable node under `parent`
    pub(crate) fn push_node(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        debug_assert!(is_valid_name(name, parent.is_none()));
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, parent));
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes_changed();
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Drop dead branches below `id`; returns whether `id` itself survives
    fn prune(&mut self, id: NodeId) -> bool {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let kept: Vec<NodeId> = children
            .into_iter()
            .filter(|&child| self.prune(child))
            .collect();

        let node = &mut self.nodes[id.0];
        node.children = kept;
        node.playable || !node.children.is_empty()
    }

    /// Rebuild the arena from the reachable nodes, in pre-order
    fn compact(&mut self) {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut roots = Vec::with_capacity(self.roots.len());
        for &root in &self.roots {
            roots.push(self.copy_subtree(root, None, &mut nodes));
        }
        self.nodes = nodes;
        self.roots = roots;
        self.nodes_changed();
    }

    fn copy_subtree(&self, id: NodeId, parent: Option<NodeId>, out: &mut Vec<Node>) -> NodeId {
        let source = &self.nodes[id.0];
        let new_id = NodeId(out.len());
        out.push(Node {
            name: source.name.clone(),
            playable: source.playable,
            parent,
            children: Vec::with_capacity(source.children.len()),
        });
        for &child in &source.children {
            let copied = self.copy_subtree(child, Some(new_id), out);
            out[new_id.0].children.push(copied);
        }
        new_id
    }

    fn subtree_counts(&self) -> &[usize] {
        self.counts.get_or_init(|| {
            let mut counts = vec![0; self.nodes.len()];
            for &root in &self.roots {
                self.count_into(root, &mut counts);
            }
            counts
        })
    }

    fn count_into(&self, id: NodeId, counts: &mut [usize]) -> usize {
        let node = &self.nodes[id.0];
        let mut total = usize::from(node.playable);
        for &child in &node.children {
            total += self.count_into(child, counts);
        }
        counts[id.0] = total;
        total
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        forests_equal(self, &self.roots, other, &other.roots)
    }
}

impl Eq for Tree {}

fn forests_equal(a: &Tree, a_ids: &[NodeId], b: &Tree, b_ids: &[NodeId]) -> bool {
    a_ids.len() == b_ids.len()
        && a_ids.iter().zip(b_ids).all(|(&x, &y)| {
            let (left, right) = (&a.nodes[x.0], &b.nodes[y.0]);
            left.name == right.name
                && left.playable == right.playable
                && forests_equal(a, &left.children, b, &right.children)
        })
}

/// Pre-order iterator over node ids
pub struct Preorder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Preorder<'a> {
    fn new(tree: &'a Tree, start: &[NodeId]) -> Self {
        Self {
            tree,
            stack: start.iter().rev().copied().collect(),
        }
    }
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id.0].children.iter().rev().copied());
        Some(id)
    }
}
