//! Virtual File System
//!
//! A pure in-memory tree of directories and files with a current-directory cursor.
//! Nodes live in an arena addressed by [`NodeId`]; each node knows its parent and
//! directories keep their children keyed by name in creation order.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::path;
use super::types::*;

const ROOT: NodeId = NodeId(0);

/// Where a copy or move lands: the directory receiving the node and the name it gets there.
struct Placement {
    source: NodeId,
    parent: NodeId,
    name: String,
}

/// In-memory virtual file system.
///
/// Single-threaded by design: one instance per session. Wrap it in a mutex
/// if several callers have to share one tree.
#[derive(Debug, Clone)]
pub struct VirtualFilesystem {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    cwd: String,
}

impl VirtualFilesystem {
    /// Create a filesystem holding only the root directory, with the cursor at `/`.
    pub fn new() -> Self {
        let root = Node {
            name: "/".to_string(),
            modified: Utc::now(),
            parent: None,
            content: NodeContent::Directory(IndexMap::new()),
        };
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            cwd: "/".to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // Arena plumbing
    // ------------------------------------------------------------------------

    pub(crate) fn slot(&self, id: NodeId) -> &Node {
        self.nodes[id.0].as_ref().expect("node id refers to a freed slot")
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.0].as_mut().expect("node id refers to a freed slot")
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Release a node and everything below it.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes[current.0].take() {
                if let Some(children) = node.children() {
                    stack.extend(children.values().copied());
                }
                self.free.push(current.0);
            }
        }
    }

    /// Insert `entry` (and its subtree) under `parent` as `name`.
    ///
    /// The top node is stamped with `modified`; descendants keep their own timestamps.
    /// The caller guarantees `parent` is a directory without a child called `name`.
    pub(crate) fn graft(
        &mut self,
        parent: NodeId,
        name: String,
        entry: &Entry,
        modified: DateTime<Utc>,
    ) -> NodeId {
        let content = match entry {
            Entry::File { content, .. } => NodeContent::File(content.clone()),
            Entry::Directory { .. } => NodeContent::Directory(IndexMap::new()),
        };
        let id = self.alloc(Node {
            name: name.clone(),
            modified,
            parent: Some(parent),
            content,
        });
        self.link(parent, name, id);
        for child in entry.children() {
            self.graft(id, child.name().to_string(), child, child.modified());
        }
        id
    }

    /// Attach `id` under `parent`. An existing sibling with the same name is never replaced.
    fn link(&mut self, parent: NodeId, name: String, id: NodeId) {
        if let Some(children) = self.slot_mut(parent).children_mut() {
            let linked = *children.entry(name).or_insert(id);
            debug_assert_eq!(linked, id, "sibling name already taken");
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let (parent, name) = {
            let node = self.slot(id);
            (node.parent, node.name.clone())
        };
        if let Some(parent) = parent {
            if let Some(children) = self.slot_mut(parent).children_mut() {
                if children.get(&name) == Some(&id) {
                    children.shift_remove(&name);
                }
            }
        }
    }

    pub(crate) fn set_root_modified(&mut self, modified: DateTime<Utc>) {
        self.slot_mut(ROOT).modified = modified;
    }

    // ------------------------------------------------------------------------
    // Cursor and path helpers
    // ------------------------------------------------------------------------

    /// The current working directory.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub(crate) fn set_cwd(&mut self, cwd: String) {
        self.cwd = cwd;
    }

    /// Normalize `path` against the current directory.
    pub fn normalize(&self, path: &str) -> String {
        path::normalize(path, &self.cwd)
    }

    /// Base name of `path` after normalization.
    pub fn basename(&self, path: &str) -> String {
        path::basename(&self.normalize(path)).to_string()
    }

    /// Path of the directory containing `path`, after normalization.
    pub fn parent_path(&self, path: &str) -> String {
        path::dirname(&self.normalize(path)).to_string()
    }

    /// Whether two paths name the same location.
    pub fn is_same_file(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }

    // ------------------------------------------------------------------------
    // Resolution and queries
    // ------------------------------------------------------------------------

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(self, ROOT)
    }

    /// View of a node by handle, or `None` if the handle is stale.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        match self.nodes.get(id.0) {
            Some(Some(_)) => Some(NodeRef::new(self, id)),
            _ => None,
        }
    }

    fn resolve_id(&self, path: &str) -> FsResult<NodeId> {
        let normalized = self.normalize(path);
        if normalized == "/" {
            return Ok(ROOT);
        }

        let mut current = ROOT;
        for segment in normalized[1..].split('/') {
            let node = self.slot(current);
            let children = match &node.content {
                NodeContent::Directory(children) => children,
                NodeContent::File(_) => {
                    trace!(path = %normalized, through = %node.name, "cannot traverse a file");
                    return Err(FsError::new(ErrorKind::NotADirectory, node.name.clone()));
                }
            };
            current = match children.get(segment) {
                Some(&child) => child,
                None => {
                    trace!(path = %normalized, missing = segment, "path does not resolve");
                    return Err(FsError::new(ErrorKind::NotFound, segment));
                }
            };
        }
        Ok(current)
    }

    /// Walk the tree along `path`.
    ///
    /// Fails with `NotADirectory` (cause = the file's name) when a file sits in the
    /// middle of the path, or `NotFound` (cause = the missing segment).
    pub fn resolve(&self, path: &str) -> FsResult<NodeRef<'_>> {
        self.resolve_id(path).map(|id| NodeRef::new(self, id))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve_id(path).is_ok()
    }

    pub fn is_file(&self, path: &str) -> bool {
        matches!(self.resolve(path), Ok(node) if node.is_file())
    }

    pub fn is_directory(&self, path: &str) -> bool {
        matches!(self.resolve(path), Ok(node) if node.is_directory())
    }

    /// Content of the file at `path`.
    pub fn read_file_content(&self, path: &str) -> FsResult<&str> {
        let normalized = self.normalize(path);
        match self.resolve_id(&normalized) {
            Ok(id) => match &self.slot(id).content {
                NodeContent::File(content) => Ok(content.as_str()),
                NodeContent::Directory(_) => Err(FsError::new(ErrorKind::NotARegularFile, normalized)),
            },
            Err(_) => Err(FsError::new(ErrorKind::NotFound, normalized)),
        }
    }

    /// Children of the directory at `path`, in creation order.
    pub fn read_directory_content(&self, path: &str) -> FsResult<Vec<NodeRef<'_>>> {
        let normalized = self.normalize(path);
        match self.resolve(&normalized) {
            Ok(node) if node.is_directory() => Ok(node.children().collect()),
            Ok(_) => Err(FsError::new(ErrorKind::NotADirectory, normalized)),
            Err(_) => Err(FsError::new(ErrorKind::NotFound, normalized)),
        }
    }

    /// Directory that would contain `path`.
    pub fn get_parent(&self, path: &str) -> FsResult<NodeRef<'_>> {
        let parent = self.parent_path(path);
        self.directory_at(&parent).map(|id| NodeRef::new(self, id))
    }

    /// Resolve a path that must name a directory; failures are reported against `normalized`.
    fn directory_at(&self, normalized: &str) -> FsResult<NodeId> {
        match self.resolve_id(normalized) {
            Ok(id) if self.slot(id).node_type() == NodeType::Directory => Ok(id),
            Ok(_) => Err(FsError::new(ErrorKind::NotADirectory, normalized)),
            Err(_) => Err(FsError::new(ErrorKind::NotFound, normalized)),
        }
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    fn create_node(&mut self, dir_path: &str, name: &str, content: NodeContent) -> FsResult<NodeId> {
        let dir = self.normalize(dir_path);
        if name.is_empty() {
            return Err(FsError::new(ErrorKind::NoFilename, dir));
        }
        if !path::is_valid_name(name) {
            return Err(FsError::new(ErrorKind::InvalidName, name));
        }
        let full = path::join(&dir, name);
        if self.exists(&full) {
            return Err(FsError::new(ErrorKind::FileAlreadyExists, full));
        }
        let parent = self.directory_at(&dir)?;
        // Path lookup trims whitespace, so compare the exact key as well.
        if self.slot(parent).children().is_some_and(|children| children.contains_key(name)) {
            return Err(FsError::new(ErrorKind::FileAlreadyExists, full));
        }

        let id = self.alloc(Node {
            name: name.to_string(),
            modified: Utc::now(),
            parent: Some(parent),
            content,
        });
        self.link(parent, name.to_string(), id);
        Ok(id)
    }

    /// Create a file called `name` inside the directory `dir_path`.
    pub fn create_file(&mut self, dir_path: &str, name: &str, content: &str) -> FsResult<NodeRef<'_>> {
        let id = self.create_node(dir_path, name, NodeContent::File(content.to_string()))?;
        let node = NodeRef::new(self, id);
        debug!(path = %node.path(), bytes = content.len(), "created file");
        Ok(node)
    }

    /// Create an empty directory called `name` inside the directory `dir_path`.
    pub fn create_directory(&mut self, dir_path: &str, name: &str) -> FsResult<NodeRef<'_>> {
        let id = self.create_node(dir_path, name, NodeContent::Directory(IndexMap::new()))?;
        let node = NodeRef::new(self, id);
        debug!(path = %node.path(), "created directory");
        Ok(node)
    }

    /// Create the directory at `path` and any missing ancestors. Existing directories are fine.
    pub fn create_directory_all(&mut self, path: &str) -> FsResult<NodeRef<'_>> {
        let normalized = self.normalize(path);
        let mut current = "/".to_string();
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            let next = path::join(&current, segment);
            match self.resolve_id(&next) {
                Ok(id) if self.slot(id).node_type() == NodeType::Directory => {}
                Ok(_) => return Err(FsError::new(ErrorKind::NotADirectory, next)),
                Err(_) => {
                    self.create_directory(&current, segment)?;
                }
            }
            current = next;
        }
        self.resolve(&normalized)
    }

    /// Overwrite (or append to) the file at `path`, creating it if it does not exist.
    pub fn write_file(&mut self, path: &str, content: &str, append: bool) -> FsResult<NodeRef<'_>> {
        let normalized = self.normalize(path);
        let id = match self.resolve_id(&normalized) {
            Ok(id) => id,
            Err(_) => {
                let dir = path::dirname(&normalized).to_string();
                let name = path::basename(&normalized).to_string();
                return self.create_file(&dir, &name, content);
            }
        };

        let node = self.slot_mut(id);
        match &mut node.content {
            NodeContent::File(existing) => {
                if append {
                    existing.push_str(content);
                } else {
                    *existing = content.to_string();
                }
                node.modified = Utc::now();
            }
            NodeContent::Directory(_) => {
                return Err(FsError::new(ErrorKind::NotARegularFile, normalized));
            }
        }
        debug!(path = %normalized, append, bytes = content.len(), "wrote file");
        Ok(NodeRef::new(self, id))
    }

    /// Remove the node at `path` (with its whole subtree) and hand it back detached.
    pub fn delete(&mut self, path: &str) -> FsResult<Entry> {
        let normalized = self.normalize(path);
        if normalized == "/" {
            return Err(FsError::new(ErrorKind::RootProhibited, normalized));
        }
        let id = self
            .resolve_id(&normalized)
            .map_err(|_| FsError::new(ErrorKind::NotFound, normalized.clone()))?;

        let entry = NodeRef::new(self, id).to_entry();
        self.unlink(id);
        self.release(id);
        debug!(path = %normalized, "deleted");
        Ok(entry)
    }

    // ------------------------------------------------------------------------
    // Compound operations
    // ------------------------------------------------------------------------

    /// Validation shared by `copy` and `rename`.
    ///
    /// A missing destination names the new node; an existing destination must be a
    /// directory, which receives the node under the source's own name.
    fn place(&self, source: &str, destination: &str) -> FsResult<Placement> {
        let source_path = self.normalize(source);
        let destination_path = self.normalize(destination);

        if source_path == "/" {
            return Err(FsError::new(ErrorKind::RootProhibited, source_path));
        }
        let source_id = self
            .resolve_id(&source_path)
            .map_err(|_| FsError::new(ErrorKind::NotFound, source_path.clone()))?;
        if source_path == destination_path {
            return Err(FsError::new(ErrorKind::SameFile, source_path));
        }

        match self.resolve_id(&destination_path) {
            Err(_) => {
                let parent = self.directory_at(path::dirname(&destination_path))?;
                let name = path::basename(&destination_path).to_string();
                if !path::is_valid_name(&name) {
                    return Err(FsError::new(ErrorKind::InvalidName, name));
                }
                Ok(Placement { source: source_id, parent, name })
            }
            Ok(id) => {
                let target = self.slot(id);
                let children = target
                    .children()
                    .ok_or_else(|| FsError::new(ErrorKind::NotADirectory, destination_path.clone()))?;
                let name = self.slot(source_id).name.clone();
                if children.contains_key(&name) {
                    return Err(FsError::new(
                        ErrorKind::FileAlreadyExists,
                        path::join(&destination_path, &name),
                    ));
                }
                Ok(Placement { source: source_id, parent: id, name })
            }
        }
    }

    /// Copy `source` to `destination`.
    ///
    /// Directories are copied deeply: the copy shares nothing with the original.
    /// The new top node gets a fresh timestamp; nodes below it keep theirs.
    pub fn copy(&mut self, source: &str, destination: &str) -> FsResult<NodeRef<'_>> {
        let placement = self.place(source, destination)?;
        // Snapshot first so copying a directory into its own subtree terminates.
        let entry = NodeRef::new(self, placement.source).to_entry();
        let id = self.graft(placement.parent, placement.name, &entry, Utc::now());
        let node = NodeRef::new(self, id);
        debug!(from = %entry.path(), to = %node.path(), "copied");
        Ok(node)
    }

    /// Move `source` to `destination`.
    ///
    /// Same placement rules and result as a copy followed by deleting the source,
    /// but the node is relinked instead of rebuilt. Moving a directory into its own
    /// subtree fails with `SameFile`.
    #[doc(alias = "move")]
    pub fn rename(&mut self, source: &str, destination: &str) -> FsResult<NodeRef<'_>> {
        let placement = self.place(source, destination)?;
        let source_path = NodeRef::new(self, placement.source).path();
        let parent_path = NodeRef::new(self, placement.parent).path();
        if path::is_within(&parent_path, &source_path) {
            return Err(FsError::new(ErrorKind::SameFile, source_path));
        }

        self.unlink(placement.source);
        {
            let node = self.slot_mut(placement.source);
            node.name = placement.name.clone();
            node.parent = Some(placement.parent);
            node.modified = Utc::now();
        }
        self.link(placement.parent, placement.name, placement.source);

        let node = NodeRef::new(self, placement.source);
        debug!(from = %source_path, to = %node.path(), "moved");
        Ok(node)
    }

    /// Move the cursor to the directory at `path` and return its normalized form.
    pub fn change_directory(&mut self, path: &str) -> FsResult<String> {
        let normalized = self.normalize(path);
        self.directory_at(&normalized)?;
        debug!(cwd = %normalized, "changed directory");
        self.cwd = normalized.clone();
        Ok(normalized)
    }
}

impl Default for VirtualFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
