//! Snapshot serialization
//!
//! The whole tree as JSON: an array holding the root node, each node an object
//! `{"type", "name", "modified", "parent", "content"}` whose `content` is a string
//! for files and an array of nodes for directories.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use super::path;
use super::types::Entry;
use super::virtual_fs::VirtualFilesystem;

/// Snapshot errors. Unlike [`super::FsError`] these are not part of normal operation.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot must hold exactly one root node, found {0}")]
    RootCount(usize),

    #[error("snapshot root must be a directory named '/'")]
    InvalidRoot,

    #[error("invalid node name '{name}' under '{parent}'")]
    InvalidName { parent: String, name: String },

    #[error("duplicate node '{path}'")]
    Duplicate { path: String },
}

impl VirtualFilesystem {
    /// The full tree as a compact JSON string.
    pub fn serialize(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&[self.root().to_entry()])?)
    }

    /// The full tree as indented JSON.
    pub fn serialize_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&[self.root().to_entry()])?)
    }

    /// Build a filesystem from a snapshot. The cursor starts at `/`.
    pub fn from_snapshot(text: &str) -> Result<Self, SnapshotError> {
        let mut roots: Vec<Entry> = serde_json::from_str(text)?;
        if roots.len() != 1 {
            return Err(SnapshotError::RootCount(roots.len()));
        }
        let root = roots.remove(0);
        if !root.is_directory() || root.name() != "/" {
            return Err(SnapshotError::InvalidRoot);
        }
        validate_children(&root, "/")?;

        // Stored `parent` strings are not trusted; they are rebuilt from the nesting.
        let mut fs = VirtualFilesystem::new();
        fs.set_root_modified(root.modified());
        let root_id = fs.root().id();
        for child in root.children() {
            fs.graft(root_id, child.name().to_string(), child, child.modified());
        }
        Ok(fs)
    }

    /// Replace the whole tree with the one described by `text`.
    ///
    /// The current tree is left untouched if the snapshot is rejected. The cursor is
    /// kept when it still names a directory in the new tree, otherwise it goes back to `/`.
    pub fn deserialize(&mut self, text: &str) -> Result<(), SnapshotError> {
        let mut loaded = match Self::from_snapshot(text) {
            Ok(fs) => fs,
            Err(e) => {
                warn!(error = %e, "rejected snapshot");
                return Err(e);
            }
        };
        if loaded.is_directory(self.cwd()) {
            loaded.set_cwd(self.cwd().to_string());
        }
        *self = loaded;
        debug!(cwd = %self.cwd(), "loaded snapshot");
        Ok(())
    }
}

fn validate_children(entry: &Entry, dir: &str) -> Result<(), SnapshotError> {
    let mut seen = HashSet::new();
    for child in entry.children() {
        if !path::is_valid_name(child.name()) {
            return Err(SnapshotError::InvalidName {
                parent: dir.to_string(),
                name: child.name().to_string(),
            });
        }
        let child_path = path::join(dir, child.name());
        if !seen.insert(child.name()) {
            return Err(SnapshotError::Duplicate { path: child_path });
        }
        validate_children(child, &child_path)?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VirtualFilesystem {
        let mut fs = VirtualFilesystem::new();
        fs.create_directory("/", "docs").unwrap();
        fs.create_file("/docs", "a.txt", "hi\n\"quoted\"").unwrap();
        fs.create_directory("/docs", "empty").unwrap();
        fs.create_file("/", "readme.md", "# readme").unwrap();
        fs
    }

    #[test]
    fn test_round_trip_is_exact() {
        let fs = sample();
        let text = fs.serialize().unwrap();
        let restored = VirtualFilesystem::from_snapshot(&text).unwrap();
        assert_eq!(restored.root().to_entry(), fs.root().to_entry());
        assert_eq!(restored.serialize().unwrap(), text);
    }

    #[test]
    fn test_pretty_round_trip() {
        let fs = sample();
        let restored = VirtualFilesystem::from_snapshot(&fs.serialize_pretty().unwrap()).unwrap();
        assert_eq!(restored.root().to_entry(), fs.root().to_entry());
    }

    #[test]
    fn test_serialized_shape() {
        let fs = sample();
        let value: serde_json::Value = serde_json::from_str(&fs.serialize().unwrap()).unwrap();
        let root = &value[0];
        assert_eq!(root["type"], "directory");
        assert_eq!(root["name"], "/");
        assert_eq!(root["parent"], "/");
        let docs = &root["content"][0];
        assert_eq!(docs["name"], "docs");
        assert_eq!(docs["content"][0]["parent"], "/docs");
        assert_eq!(docs["content"][0]["content"], "hi\n\"quoted\"");
        assert_eq!(root["content"][1]["type"], "file");
    }

    #[test]
    fn test_deserialize_replaces_tree() {
        let source = sample();
        let mut fs = VirtualFilesystem::new();
        fs.create_file("/", "old.txt", "").unwrap();
        fs.deserialize(&source.serialize().unwrap()).unwrap();
        assert!(!fs.exists("/old.txt"));
        assert_eq!(fs.read_file_content("/docs/a.txt").unwrap(), "hi\n\"quoted\"");
        // the loaded tree is fully operational
        fs.copy("/docs", "/copy").unwrap();
        assert!(fs.is_directory("/copy/empty"));
    }

    #[test]
    fn test_deserialize_cursor_handling() {
        let source = sample();
        let text = source.serialize().unwrap();

        let mut fs = sample();
        fs.change_directory("/docs").unwrap();
        fs.deserialize(&text).unwrap();
        assert_eq!(fs.cwd(), "/docs");

        let mut fs = VirtualFilesystem::new();
        fs.create_directory("/", "elsewhere").unwrap();
        fs.change_directory("/elsewhere").unwrap();
        fs.deserialize(&text).unwrap();
        assert_eq!(fs.cwd(), "/");
    }

    #[test]
    fn test_parent_strings_are_rebuilt() {
        let text = r#"[{"type":"directory","name":"/","modified":"2024-01-01T00:00:00Z","parent":"/","content":[
            {"type":"directory","name":"a","modified":"2024-01-01T00:00:00Z","parent":"/wrong","content":[
                {"type":"file","name":"f","modified":"2024-01-01T00:00:00Z","parent":"/nowhere","content":"x"}
            ]}
        ]}]"#;
        let fs = VirtualFilesystem::from_snapshot(text).unwrap();
        assert_eq!(fs.resolve("/a/f").unwrap().parent_path(), "/a");
        assert_eq!(fs.resolve("/a").unwrap().parent_path(), "/");
    }

    #[test]
    fn test_malformed_input_keeps_state() {
        let mut fs = sample();
        let err = fs.deserialize("{not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Json(_)));
        assert!(fs.exists("/docs/a.txt"));
    }

    #[test]
    fn test_rejects_bad_structure() {
        assert!(matches!(
            VirtualFilesystem::from_snapshot("[]"),
            Err(SnapshotError::RootCount(0))
        ));

        let file_root = r#"[{"type":"file","name":"/","modified":"2024-01-01T00:00:00Z","parent":"/","content":""}]"#;
        assert!(matches!(
            VirtualFilesystem::from_snapshot(file_root),
            Err(SnapshotError::InvalidRoot)
        ));

        let dup = r#"[{"type":"directory","name":"/","modified":"2024-01-01T00:00:00Z","parent":"/","content":[
            {"type":"file","name":"x","modified":"2024-01-01T00:00:00Z","parent":"/","content":""},
            {"type":"directory","name":"x","modified":"2024-01-01T00:00:00Z","parent":"/","content":[]}
        ]}]"#;
        assert!(matches!(
            VirtualFilesystem::from_snapshot(dup),
            Err(SnapshotError::Duplicate { path }) if path == "/x"
        ));

        let bad_name = r#"[{"type":"directory","name":"/","modified":"2024-01-01T00:00:00Z","parent":"/","content":[
            {"type":"file","name":"a/b","modified":"2024-01-01T00:00:00Z","parent":"/","content":""}
        ]}]"#;
        assert!(matches!(
            VirtualFilesystem::from_snapshot(bad_name),
            Err(SnapshotError::InvalidName { .. })
        ));

        let file_with_children = r#"[{"type":"directory","name":"/","modified":"2024-01-01T00:00:00Z","parent":"/","content":[
            {"type":"file","name":"f","modified":"2024-01-01T00:00:00Z","parent":"/","content":[]}
        ]}]"#;
        assert!(matches!(
            VirtualFilesystem::from_snapshot(file_with_children),
            Err(SnapshotError::Json(_))
        ));
    }
}
