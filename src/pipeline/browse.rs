//! Directory listing for the interactive file selector.
//!
//! Only the pure part lives here: reading a directory and turning it into an
//! ordered list of navigable entries, with files filtered to the supported
//! invoice formats. The key-reading loop that walks these listings sits in
//! the CLI binary, so this logic stays unit-testable without a terminal.
//!
//! Ordering matches what a user scanning for a file expects: the parent
//! first, then subdirectories sorted by name, then matching files sorted by
//! name. Hidden entries (dot-prefixed) are skipped.

use crate::error::InvoiceError;
use crate::pipeline::input::is_supported_file;
use std::path::{Path, PathBuf};

/// One selectable row in the directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseEntry {
    /// Navigate to the parent directory. Absent at the filesystem root.
    Parent(PathBuf),
    /// Navigate into a subdirectory.
    Dir(PathBuf),
    /// A selectable invoice file (supported extension).
    File(PathBuf),
}

impl BrowseEntry {
    /// The display label for this entry, as shown in the menu.
    pub fn label(&self) -> String {
        match self {
            BrowseEntry::Parent(_) => "../".to_string(),
            BrowseEntry::Dir(p) => format!("{}/", file_name(p)),
            BrowseEntry::File(p) => file_name(p),
        }
    }

    /// The path this entry points at.
    pub fn path(&self) -> &Path {
        match self {
            BrowseEntry::Parent(p) | BrowseEntry::Dir(p) | BrowseEntry::File(p) => p,
        }
    }
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}

/// List a directory as ordered browse entries.
///
/// Subdirectories come first (all of them — navigation must not be blocked
/// by the file filter), then files with supported extensions. Entries whose
/// names start with `.` are omitted.
pub fn list_entries(dir: &Path) -> Result<Vec<BrowseEntry>, InvoiceError> {
    let read = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => InvoiceError::PermissionDenied {
            path: dir.to_path_buf(),
        },
        _ => InvoiceError::FileNotFound {
            path: dir.to_path_buf(),
        },
    })?;

    let mut dirs: Vec<PathBuf> = Vec::new();
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in read.flatten() {
        let path = entry.path();
        let name = file_name(&path);
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            dirs.push(path);
        } else if is_supported_file(&path) {
            files.push(path);
        }
    }

    dirs.sort();
    files.sort();

    let mut entries = Vec::with_capacity(1 + dirs.len() + files.len());
    if let Some(parent) = dir.parent() {
        entries.push(BrowseEntry::Parent(parent.to_path_buf()));
    }
    entries.extend(dirs.into_iter().map(BrowseEntry::Dir));
    entries.extend(files.into_iter().map(BrowseEntry::File));

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn filters_and_orders_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        std::fs::create_dir(root.join("scans")).unwrap();
        std::fs::create_dir(root.join("archive")).unwrap();
        touch(&root.join("b.png"));
        touch(&root.join("a.pdf"));
        touch(&root.join("notes.txt"));
        touch(&root.join("README.md"));

        let entries = list_entries(root).unwrap();
        let labels: Vec<String> = entries.iter().map(|e| e.label()).collect();

        assert_eq!(labels, vec!["../", "archive/", "scans/", "a.pdf", "b.png"]);
    }

    #[test]
    fn skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        std::fs::create_dir(root.join(".git")).unwrap();
        touch(&root.join(".hidden.png"));
        touch(&root.join("visible.jpg"));

        let entries = list_entries(root).unwrap();
        let labels: Vec<String> = entries.iter().map(|e| e.label()).collect();
        assert!(labels.contains(&"visible.jpg".to_string()));
        assert!(!labels.iter().any(|l| l.contains("hidden")));
        assert!(!labels.iter().any(|l| l.contains(".git")));
    }

    #[test]
    fn directories_survive_the_file_filter() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        // Directory with no matching files must still be navigable.
        std::fs::create_dir(root.join("empty")).unwrap();
        touch(&root.join("ignored.csv"));

        let entries = list_entries(root).unwrap();
        assert!(entries
            .iter()
            .any(|e| matches!(e, BrowseEntry::Dir(p) if p.ends_with("empty"))));
        assert!(!entries
            .iter()
            .any(|e| matches!(e, BrowseEntry::File(_))));
    }

    #[test]
    fn missing_directory_errors() {
        let err = list_entries(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, InvoiceError::FileNotFound { .. }));
    }
}
