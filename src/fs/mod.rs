//! File System Module
//!
//! The in-memory virtual filesystem behind the terminal:
//! - path: normalization and name rules
//! - types: nodes, views and the error taxonomy
//! - virtual_fs: the tree and its operations
//! - snapshot: JSON serialization of the whole tree

pub mod path;
pub mod snapshot;
pub mod types;
pub mod virtual_fs;

pub use snapshot::SnapshotError;
pub use types::*;
pub use virtual_fs::VirtualFilesystem;
