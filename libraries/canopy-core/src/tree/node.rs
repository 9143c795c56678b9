//! Arena node types and path segment helpers

use crate::error::{CanopyError, Result};
use std::fmt;

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Name of the top-level node standing for the filesystem root of an
/// absolute Unix path
pub const ROOT_NAME: &str = "/";

/// Index of a node inside a [`Tree`](super::Tree) arena
///
/// Only valid for the tree (and snapshot) it was obtained from. `remove`,
/// `clean_up` and `clear` compact the arena and invalidate older ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Get the arena index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// One segment of the playlist tree
///
/// A playable leaf is one queueable item. Interior nodes may be playable
/// too: the path is then both a file and the root of a subtree.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) playable: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_owned(),
            playable: false,
            parent,
            children: Vec::new(),
        }
    }

    /// Path segment of this node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this exact path is a queueable item
    pub fn is_playable(&self) -> bool {
        self.playable
    }

    /// Parent node, `None` for top-level nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Split an item path into tree segments
///
/// A leading separator becomes the [`ROOT_NAME`] segment, trailing
/// separators are ignored. Empty segments and line breaks are rejected.
///
/// ```
/// use canopy_core::tree::split_path;
///
/// assert_eq!(split_path("/music/a.mp3").unwrap(), vec!["/", "music", "a.mp3"]);
/// assert_eq!(split_path("C:/music/").unwrap(), vec!["C:", "music"]);
/// assert!(split_path("music//a.mp3").is_err());
/// ```
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(CanopyError::invalid_path(path, "path is empty"));
    }
    if path.contains(['\n', '\r']) {
        return Err(CanopyError::invalid_path(path, "path contains a line break"));
    }

    let mut segments = Vec::new();
    let rest = match path.strip_prefix(SEPARATOR) {
        Some(rest) => {
            segments.push(ROOT_NAME);
            rest
        }
        None => path,
    };

    let rest = rest.trim_end_matches(SEPARATOR);
    if rest.is_empty() {
        return Ok(segments);
    }

    for segment in rest.split(SEPARATOR) {
        if segment.is_empty() {
            return Err(CanopyError::invalid_path(path, "path contains an empty segment"));
        }
        segments.push(segment);
    }

    Ok(segments)
}

/// Join segments back into an item path
///
/// Never doubles a separator, so `["/", "music"]` gives `/music`.
pub fn join_path<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut path = String::new();
    for segment in segments {
        if !path.is_empty() && !path.ends_with(SEPARATOR) {
            path.push(SEPARATOR);
        }
        path.push_str(segment);
    }
    path
}

/// Whether `name` may be stored as a node name at the given level
pub(crate) fn is_valid_name(name: &str, top_level: bool) -> bool {
    if name.is_empty() || name.contains(['\n', '\r']) {
        return false;
    }
    if name.contains(SEPARATOR) {
        return top_level && name == ROOT_NAME;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_relative_path() {
        assert_eq!(split_path("a/b/c").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn split_rejects_bad_input() {
        assert!(split_path("").is_err());
        assert!(split_path("a//b").is_err());
        assert!(split_path("a\nb").is_err());
    }

    #[test]
    fn bare_root_is_single_segment() {
        assert_eq!(split_path("/").unwrap(), vec!["/"]);
    }

    #[test]
    fn join_round_trips_split() {
        for path in ["/music/a.mp3", "C:/videos/b.mkv", "single"] {
            let segments = split_path(path).unwrap();
            assert_eq!(join_path(segments), path);
        }
    }

    #[test]
    fn root_name_only_valid_at_top_level() {
        assert!(is_valid_name("/", true));
        assert!(!is_valid_name("/", false));
        assert!(!is_valid_name("a/b", true));
        assert!(!is_valid_name("", false));
        assert!(is_valid_name("with\ttab", false));
    }
}
