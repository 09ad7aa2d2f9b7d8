//! Seed listings
//!
//! A flat description of initial content (`dirs` and `files`, each entry naming the
//! directory it lives in) and the code that feeds it into a [`VirtualFilesystem`].
//! Listings come from JSON or from walking a directory on the real disk.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::fs::{path, FsError, VirtualFilesystem};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("cannot read seed source: {0}")]
    Io(#[from] io::Error),

    #[error("malformed seed listing: {0}")]
    Json(#[from] serde_json::Error),
}

/// A directory to create: `name` inside the directory `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedDir {
    pub path: String,
    pub name: String,
}

/// A file to create: `name` inside the directory `path`, holding `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedListing {
    pub dirs: Vec<SeedDir>,
    pub files: Vec<SeedFile>,
}

/// Outcome of applying a listing.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub created: usize,
    pub failures: Vec<FsError>,
}

impl SeedListing {
    pub fn from_json(text: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Walk `root` on the real disk. Its contents map onto `/`; entries are visited by name.
    ///
    /// Files that are not valid UTF-8 are skipped.
    pub fn from_dir(root: &Path) -> Result<Self, SeedError> {
        let mut listing = SeedListing::default();
        walk(root, "/", &mut listing)?;
        debug!(
            root = %root.display(),
            dirs = listing.dirs.len(),
            files = listing.files.len(),
            "listed seed directory"
        );
        Ok(listing)
    }

    /// Create every listed directory, then every listed file.
    ///
    /// Directories go shallowest first so parents exist before their children.
    /// Entries the filesystem rejects are logged and reported; the rest still load.
    pub fn apply(&self, fs: &mut VirtualFilesystem) -> SeedReport {
        let mut report = SeedReport::default();

        let mut dirs: Vec<&SeedDir> = self.dirs.iter().collect();
        dirs.sort_by_key(|dir| depth(&dir.path));

        for dir in dirs {
            match fs.create_directory(&dir.path, &dir.name) {
                Ok(_) => report.created += 1,
                Err(e) => {
                    warn!(path = %dir.path, name = %dir.name, error = %e, "skipped seed directory");
                    report.failures.push(e);
                }
            }
        }

        for file in &self.files {
            match fs.create_file(&file.path, &file.name, &file.content) {
                Ok(_) => report.created += 1,
                Err(e) => {
                    warn!(path = %file.path, name = %file.name, error = %e, "skipped seed file");
                    report.failures.push(e);
                }
            }
        }

        report
    }
}

fn depth(dir: &str) -> usize {
    path::normalize(dir, "/").split('/').filter(|s| !s.is_empty()).count()
}

fn walk(dir: &Path, virtual_dir: &str, listing: &mut SeedListing) -> Result<(), SeedError> {
    let mut entries = std::fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            listing.dirs.push(SeedDir {
                path: virtual_dir.to_string(),
                name: name.clone(),
            });
            walk(&entry.path(), &path::join(virtual_dir, &name), listing)?;
        } else if file_type.is_file() {
            match std::fs::read_to_string(entry.path()) {
                Ok(content) => listing.files.push(SeedFile {
                    path: virtual_dir.to_string(),
                    name,
                    content,
                }),
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(file = %entry.path().display(), "skipped non UTF-8 seed file");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::ErrorKind;

    #[test]
    fn test_from_json() {
        let listing = SeedListing::from_json(
            r#"{"dirs":[{"path":"/","name":"docs"}],"files":[{"path":"/docs","name":"a.md","content":"hi"}]}"#,
        )
        .unwrap();
        assert_eq!(listing.dirs, vec![SeedDir { path: "/".into(), name: "docs".into() }]);
        assert_eq!(listing.files[0].content, "hi");

        let empty = SeedListing::from_json("{}").unwrap();
        assert_eq!(empty, SeedListing::default());

        assert!(matches!(SeedListing::from_json("[1"), Err(SeedError::Json(_))));
    }

    #[test]
    fn test_apply_orders_directories_by_depth() {
        let listing = SeedListing {
            dirs: vec![
                SeedDir { path: "/a/b".into(), name: "c".into() },
                SeedDir { path: "/".into(), name: "a".into() },
                SeedDir { path: "/a".into(), name: "b".into() },
            ],
            files: vec![SeedFile { path: "/a/b/c".into(), name: "f.txt".into(), content: "x".into() }],
        };
        let mut fs = VirtualFilesystem::new();
        let report = listing.apply(&mut fs);
        assert_eq!(report.created, 4);
        assert!(report.failures.is_empty());
        assert_eq!(fs.read_file_content("/a/b/c/f.txt").unwrap(), "x");
    }

    #[test]
    fn test_apply_reports_rejected_entries() {
        let listing = SeedListing {
            dirs: vec![SeedDir { path: "/".into(), name: "bad:name".into() }],
            files: vec![
                SeedFile { path: "/".into(), name: "ok.txt".into(), content: String::new() },
                SeedFile { path: "/".into(), name: "ok.txt".into(), content: String::new() },
                SeedFile { path: "/ghost".into(), name: "x".into(), content: String::new() },
            ],
        };
        let mut fs = VirtualFilesystem::new();
        let report = listing.apply(&mut fs);
        assert_eq!(report.created, 1);
        let kinds: Vec<ErrorKind> = report.failures.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![ErrorKind::InvalidName, ErrorKind::FileAlreadyExists, ErrorKind::NotFound]
        );
    }

    #[test]
    fn test_from_dir() {
        let root = std::env::temp_dir().join(format!("fakefs-seed-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("guide/deep")).unwrap();
        std::fs::write(root.join("index.md"), "# index").unwrap();
        std::fs::write(root.join("guide/deep/page.md"), "page").unwrap();

        let listing = SeedListing::from_dir(&root).unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        assert_eq!(
            listing.dirs,
            vec![
                SeedDir { path: "/".into(), name: "guide".into() },
                SeedDir { path: "/guide".into(), name: "deep".into() },
            ]
        );

        let mut fs = VirtualFilesystem::new();
        listing.apply(&mut fs);
        assert_eq!(fs.read_file_content("/index.md").unwrap(), "# index");
        assert_eq!(fs.read_file_content("/guide/deep/page.md").unwrap(), "page");
    }
}
