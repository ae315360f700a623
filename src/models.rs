//! Data structures produced while resolving a bundle manifest.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::platform::PlatformId;

/// A single file scheduled for inclusion in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
  /// Source path, relative to the project root.
  pub source: PathBuf,
  /// Directory inside the bundle the file lands in (`"."` for the root).
  pub dest_dir: String,
}

impl AssetEntry {
  /// Create an entry mapping `source` into the bundle directory `dest_dir`.
  pub fn new(source: impl Into<PathBuf>, dest_dir: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      dest_dir: dest_dir.into(),
    }
  }

  /// Full bundle-relative path of the file, destination directory included.
  ///
  /// Entries mapped to the bundle root keep just their file name; everything
  /// else is prefixed with its destination directory. Two manifest entries
  /// may never share this path.
  pub fn bundle_path(&self) -> String {
    let name = self
      .source
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    let dir = self.dest_dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
      name
    } else {
      format!("{dir}/{name}")
    }
  }

  /// Absolute source path under the given project root.
  pub fn source_path(&self, root: &Path) -> PathBuf {
    if self.source.is_absolute() {
      self.source.clone()
    } else {
      root.join(&self.source)
    }
  }
}

/// Strategy used to locate the engine binary for the target platform.
///
/// The two variants reflect the two packaging flavours the project ships:
/// a single binary picked from the candidate table, or a wholesale sweep of
/// the platform directory. They are alternatives, never combined.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
  /// Probe the per-platform candidate table and take the first existing binary.
  #[default]
  EngineLookup,
  /// Bundle every regular file found in the platform-named directory.
  DirectorySweep,
}

/// How the output artifact is named.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum NamingScheme {
  /// One fixed artifact name regardless of platform.
  #[default]
  Static,
  /// Platform-suffixed artifact name, hyphenated (`app-name-linux`).
  PlatformSuffixed,
}

impl NamingScheme {
  /// Artifact file name for `app_name` on `platform`, extension included.
  pub fn artifact_file_name(self, app_name: &str, platform: PlatformId) -> String {
    let base = match self {
      Self::Static => app_name.to_string(),
      Self::PlatformSuffixed => {
        format!("{}-{}", app_name.replace('_', "-"), platform.name())
      }
    };
    format!("{base}{}", platform.exe_suffix())
  }
}

/// The resolved set of files to bundle for one build invocation.
///
/// Constructed fresh per build, handed to the staging and packaging steps,
/// then discarded. Never persisted across builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
  /// Platform the manifest was resolved for.
  pub platform: PlatformId,
  /// Engine binary selected from the candidate table, when one exists.
  pub engine: Option<AssetEntry>,
  /// Fixed data assets and swept platform files.
  pub assets: Vec<AssetEntry>,
}

impl Manifest {
  /// Iterate every entry in the manifest, engine first.
  pub fn entries(&self) -> impl Iterator<Item = &AssetEntry> {
    self.engine.iter().chain(self.assets.iter())
  }

  /// Total number of files scheduled for bundling.
  pub fn len(&self) -> usize {
    self.assets.len() + usize::from(self.engine.is_some())
  }

  /// Whether the manifest carries no entries at all.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Serializable summary handed to the packaging step.
  pub fn summary(&self) -> ManifestSummary {
    ManifestSummary {
      platform: self.platform.name().to_string(),
      engine: self.engine.as_ref().map(EntrySummary::from),
      assets: self.assets.iter().map(EntrySummary::from).collect(),
    }
  }
}

/// Serialized form of a resolved manifest, written next to the staged files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSummary {
  /// Short name of the platform the manifest targets.
  pub platform: String,
  /// Selected engine binary, absent when no candidate existed.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub engine: Option<EntrySummary>,
  /// Remaining bundled files.
  #[serde(default)]
  pub assets: Vec<EntrySummary>,
}

/// Serialized `(source, destination directory)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
  /// Source path relative to the project root, forward slashes.
  pub source: String,
  /// Destination directory inside the bundle.
  pub dest: String,
}

impl From<&AssetEntry> for EntrySummary {
  fn from(entry: &AssetEntry) -> Self {
    Self {
      source: entry.source.to_string_lossy().replace('\\', "/"),
      dest: entry.dest_dir.clone(),
    }
  }
}
