//! Line-oriented playlist format
//!
//! ```text
//! canopy-tree 1
//! 0	-	/
//! 1	-	music
//! 2	+	a.mp3
//! ```
//!
//! One line per node in pre-order: depth, `+`/`-` playable flag and name,
//! separated by tabs. The name is the rest of the line, so it may contain
//! tabs. A line's depth is at most one more than the previous line's.

use super::{NodeId, Tree};
use crate::atomic::write_atomic;
use crate::error::{CanopyError, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::debug;

/// First line of every persisted playlist
pub const HEADER: &str = "canopy-tree 1";

const PLAYABLE: &str = "+";
const NOT_PLAYABLE: &str = "-";

impl Tree {
    /// Serialize the forest
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "{HEADER}")?;
        for &root in self.top_level() {
            self.write_node(&mut writer, root, 0)?;
        }
        Ok(())
    }

    fn write_node<W: Write>(&self, writer: &mut W, id: NodeId, depth: usize) -> io::Result<()> {
        let node = self.node(id);
        let flag = if node.playable { PLAYABLE } else { NOT_PLAYABLE };
        writeln!(writer, "{depth}\t{flag}\t{}", node.name)?;
        for &child in &node.children {
            self.write_node(writer, child, depth + 1)?;
        }
        Ok(())
    }

    /// Parse a forest written by [`Tree::write_to`]
    ///
    /// Fails on the first malformed line; nothing partial is returned.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        match lines.next().transpose()? {
            Some(header) if header.trim_end_matches('\r') == HEADER => {}
            Some(_) => return Err(CanopyError::parse(1, "unknown playlist header")),
            None => return Err(CanopyError::parse(1, "missing playlist header")),
        }

        let mut tree = Tree::new();
        let mut ancestors: Vec<NodeId> = Vec::new();
        let mut blank_at = None;

        for (index, line) in lines.enumerate() {
            let number = index + 2;
            let line = line?;
            let line = line.strip_suffix('\r').unwrap_or(&line);

            if line.is_empty() {
                blank_at.get_or_insert(number);
                continue;
            }
            if let Some(blank) = blank_at {
                return Err(CanopyError::parse(blank, "blank line inside playlist"));
            }

            let mut fields = line.splitn(3, '\t');
            let depth: usize = fields
                .next()
                .and_then(|field| field.parse().ok())
                .ok_or_else(|| CanopyError::parse(number, "invalid depth"))?;
            let playable = match fields.next() {
                Some(PLAYABLE) => true,
                Some(NOT_PLAYABLE) => false,
                _ => return Err(CanopyError::parse(number, "invalid playable flag")),
            };
            let name = fields
                .next()
                .ok_or_else(|| CanopyError::parse(number, "missing node name"))?;

            if depth > ancestors.len() {
                return Err(CanopyError::parse(
                    number,
                    format!("depth jumps from {} to {depth}", ancestors.len()),
                ));
            }
            ancestors.truncate(depth);
            let parent = ancestors.last().copied();

            if !super::node::is_valid_name(name, parent.is_none()) {
                return Err(CanopyError::parse(number, format!("invalid node name {name:?}")));
            }

            let id = tree.push_node(parent, name);
            tree.node_mut(id).playable = playable;
            ancestors.push(id);
        }

        Ok(tree)
    }

    /// Persist the forest to `path`, replacing it atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, |writer| self.write_to(writer))?;
        debug!(
            path = %path.display(),
            items = self.item_count(),
            "Saved playlist"
        );
        Ok(())
    }

    /// Load a forest from `path`
    ///
    /// A failed load yields an error, never a partially filled tree; callers
    /// should fall back to an empty tree.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let tree = Self::read_from(BufReader::new(file))?;
        debug!(
            path = %path.display(),
            items = tree.item_count(),
            "Loaded playlist"
        );
        Ok(tree)
    }
}
