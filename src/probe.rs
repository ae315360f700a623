//! Filesystem probing seam used during manifest resolution.
//!
//! Resolution only ever needs two read-only questions answered: "is this a
//! regular file?" and "which regular files sit directly inside this
//! directory?". Keeping those behind a trait lets the lookup rules be tested
//! against scratch directories without touching the real checkout.

use std::fs;
use std::path::{Path, PathBuf};

/// Read-only filesystem queries needed while resolving a manifest.
pub trait FsProbe {
  /// Whether `path` exists and is a regular file.
  fn is_file(&self, path: &Path) -> bool;

  /// File names of the immediate regular-file children of `path`, sorted.
  ///
  /// Subdirectories and non-regular entries are skipped; an unreadable or
  /// missing directory degrades to an empty listing.
  fn list_files(&self, path: &Path) -> Vec<String>;
}

/// Probe answering against the real filesystem, relative to a project root.
#[derive(Debug, Clone)]
pub struct DiskProbe {
  root: PathBuf,
}

impl DiskProbe {
  /// Create a probe rooted at the given project directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Project directory all relative probes are resolved against.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn locate(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }
}

impl FsProbe for DiskProbe {
  fn is_file(&self, path: &Path) -> bool {
    self.locate(path).is_file()
  }

  fn list_files(&self, path: &Path) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(entries) = fs::read_dir(self.locate(path)) {
      for entry in entries.flatten() {
        if entry.file_type().is_ok_and(|kind| kind.is_file()) {
          names.push(entry.file_name().to_string_lossy().into_owned());
        }
      }
    }
    names.sort();
    names
  }
}
