//! File System Types
//!
//! Node model, error taxonomy and node views for the virtual file system.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::path;
use super::virtual_fs::VirtualFilesystem;

/// Kinds of failure an operation on the filesystem can report.
///
/// The set is closed: every fallible operation maps its failure onto one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    NotARegularFile,
    NotADirectory,
    FileAlreadyExists,
    SameFile,
    InvalidName,
    RootProhibited,
    NoFilename,
}

impl ErrorKind {
    /// Human readable message, as printed by the terminal commands.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "No such file or directory",
            ErrorKind::NotARegularFile => "Not a regular file",
            ErrorKind::NotADirectory => "Not a directory",
            ErrorKind::FileAlreadyExists => "File or directory already exists",
            ErrorKind::SameFile => "Source and destination are the same",
            ErrorKind::InvalidName => {
                "Invalid file name, must be at least one character long and cannot contain \\ / : * ? \" < > | '"
            }
            ErrorKind::RootProhibited => "You cannot perform this operation on the root directory",
            ErrorKind::NoFilename => "Missing file or directory name",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// File system error: what went wrong and the path, name or segment that caused it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{cause}: {kind}")]
pub struct FsError {
    pub kind: ErrorKind,
    pub cause: String,
}

impl FsError {
    pub fn new(kind: ErrorKind, cause: impl Into<String>) -> Self {
        Self { kind, cause: cause.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }
}

/// Result type returned by every fallible filesystem operation.
pub type FsResult<T> = Result<T, FsError>;

/// Stable handle to a node slot inside a [`VirtualFilesystem`].
///
/// Handles are only meaningful for the filesystem that issued them and go stale
/// once the node is deleted or the tree is replaced by `deserialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Directory,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::File => f.write_str("file"),
            NodeType::Directory => f.write_str("directory"),
        }
    }
}

/// Payload of a node, tagged by its type.
#[derive(Debug, Clone)]
pub(crate) enum NodeContent {
    File(String),
    /// Children keyed by name, in creation order.
    Directory(IndexMap<String, NodeId>),
}

/// A node as stored in the arena.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub name: String,
    pub modified: DateTime<Utc>,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    pub content: NodeContent,
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self.content {
            NodeContent::File(_) => NodeType::File,
            NodeContent::Directory(_) => NodeType::Directory,
        }
    }

    pub fn children(&self) -> Option<&IndexMap<String, NodeId>> {
        match &self.content {
            NodeContent::Directory(children) => Some(children),
            NodeContent::File(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut IndexMap<String, NodeId>> {
        match &mut self.content {
            NodeContent::Directory(children) => Some(children),
            NodeContent::File(_) => None,
        }
    }
}

/// Borrowed view of a live node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    fs: &'a VirtualFilesystem,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(fs: &'a VirtualFilesystem, id: NodeId) -> Self {
        Self { fs, id }
    }

    fn node(&self) -> &'a Node {
        self.fs.slot(self.id)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    pub fn node_type(&self) -> NodeType {
        self.node().node_type()
    }

    pub fn is_file(&self) -> bool {
        self.node_type() == NodeType::File
    }

    pub fn is_directory(&self) -> bool {
        self.node_type() == NodeType::Directory
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.node().modified
    }

    /// Absolute path of the containing directory. The root is its own parent.
    pub fn parent_path(&self) -> String {
        match self.node().parent {
            Some(parent) => NodeRef::new(self.fs, parent).path(),
            None => "/".to_string(),
        }
    }

    /// Absolute normalized path of this node.
    pub fn path(&self) -> String {
        let mut names = Vec::new();
        let mut current = self.id;
        while let Some(parent) = self.fs.slot(current).parent {
            names.push(self.fs.slot(current).name.as_str());
            current = parent;
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// File content, or `None` for a directory.
    pub fn content(&self) -> Option<&'a str> {
        match &self.node().content {
            NodeContent::File(content) => Some(content.as_str()),
            NodeContent::Directory(_) => None,
        }
    }

    /// Children in creation order. Empty for files.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let fs = self.fs;
        self.node()
            .children()
            .into_iter()
            .flat_map(|children| children.values())
            .map(move |&id| NodeRef::new(fs, id))
    }

    pub fn child(&self, name: &str) -> Option<NodeRef<'a>> {
        self.node()
            .children()
            .and_then(|children| children.get(name))
            .map(|&id| NodeRef::new(self.fs, id))
    }

    /// Depth-first pre-order walk below this node, paired with the depth (children are depth 1).
    pub fn descendants(&self) -> Vec<(usize, NodeRef<'a>)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, NodeRef<'a>)> = self.children().map(|c| (1, c)).collect();
        stack.reverse();
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            let mut children: Vec<_> = node.children().map(|c| (depth + 1, c)).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Detached deep copy of this node and its subtree.
    pub fn to_entry(&self) -> Entry {
        let node = self.node();
        let parent = self.parent_path();
        match &node.content {
            NodeContent::File(content) => Entry::File {
                name: node.name.clone(),
                modified: node.modified,
                parent,
                content: content.clone(),
            },
            NodeContent::Directory(_) => Entry::Directory {
                name: node.name.clone(),
                modified: node.modified,
                parent,
                content: self.children().map(|c| c.to_entry()).collect(),
            },
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("type", &self.node_type())
            .field("path", &self.path())
            .finish()
    }
}

/// Owned, detached node tree.
///
/// This is the shape nodes take outside the filesystem: the value returned by
/// `delete` and the element type of the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    File {
        name: String,
        modified: DateTime<Utc>,
        parent: String,
        content: String,
    },
    Directory {
        name: String,
        modified: DateTime<Utc>,
        parent: String,
        content: Vec<Entry>,
    },
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::File { name, .. } | Entry::Directory { name, .. } => name,
        }
    }

    pub fn modified(&self) -> DateTime<Utc> {
        match self {
            Entry::File { modified, .. } | Entry::Directory { modified, .. } => *modified,
        }
    }

    pub fn parent(&self) -> &str {
        match self {
            Entry::File { parent, .. } | Entry::Directory { parent, .. } => parent,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Entry::File { .. } => NodeType::File,
            Entry::Directory { .. } => NodeType::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File { .. })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Entry::File { content, .. } => Some(content.as_str()),
            Entry::Directory { .. } => None,
        }
    }

    pub fn children(&self) -> &[Entry] {
        match self {
            Entry::Directory { content, .. } => content.as_slice(),
            Entry::File { .. } => &[],
        }
    }

    /// Absolute path the entry had (or would have) in its tree.
    pub fn path(&self) -> String {
        if self.is_directory() && self.name() == "/" {
            return "/".to_string();
        }
        path::join(self.parent(), self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
