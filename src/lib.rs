//! fakefs - an in-memory virtual filesystem with a small terminal on top
//!
//! The [`fs`] module holds the tree itself: path normalization, resolution,
//! queries, mutations, copy/move and JSON snapshots. [`commands`] and [`shell`]
//! drive it the way a user at a prompt would; [`seed`] loads initial content.

pub mod commands;
pub mod fs;
pub mod seed;
pub mod shell;

pub use fs::{Entry, ErrorKind, FsError, FsResult, NodeId, NodeRef, NodeType, SnapshotError, VirtualFilesystem};
pub use shell::{Shell, ShellOptions};
