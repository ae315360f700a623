//! Project configuration describing bundle layout and the packaging invocation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::{NamingScheme, ResolutionStrategy};
use crate::platform::PlatformId;

const DEFAULT_CONFIG_FILE: &str = "bundle.config.json";

/// Discoverable project configuration for bundle builds.
///
/// Loaded from `bundle.config.json` in the project directory; every field is
/// optional and falls back to the defaults the shipped descriptors used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
  /// Base name of the produced artifact.
  pub app_name: String,
  /// Artifact naming scheme.
  pub naming: NamingScheme,
  /// Strategy used to locate the engine binary.
  pub strategy: ResolutionStrategy,
  /// Fixed data assets bundled from the project root; exact file names or
  /// `*.ext` patterns.
  pub fixed_assets: Vec<String>,
  /// Application entry script the packaging tool builds from.
  pub entry_script: String,
  /// Packaging command in argv form; the descriptor is appended as the final
  /// argument.
  pub packager: Vec<String>,
  /// Packaging descriptor handed to the packager.
  pub descriptor: String,
  /// Directory the packager writes the final artifact into.
  pub dist_dir: String,
  /// Scratch directory used by the packaging tool.
  pub build_dir: String,
  /// Directory the resolved assets are staged into before packaging.
  pub staging_dir: String,
  /// File name of the serialized manifest summary written while staging.
  pub manifest_json: String,
}

impl Default for BundleConfig {
  fn default() -> Self {
    Self {
      app_name: "xiangqi_pyqt".into(),
      naming: NamingScheme::Static,
      strategy: ResolutionStrategy::EngineLookup,
      fixed_assets: vec![
        "pikafish.nnue".into(),
        "settings.json".into(),
        "*.pgn".into(),
        "xiangqi_pyqt.png".into(),
      ],
      entry_script: "main.py".into(),
      packager: vec!["pyinstaller".into(), "--noconfirm".into()],
      descriptor: "xiangqi_pyqt.spec".into(),
      dist_dir: "dist".into(),
      build_dir: "build".into(),
      staging_dir: "build/bundle".into(),
      manifest_json: "bundle_manifest.json".into(),
    }
  }
}

impl BundleConfig {
  /// Attempt to load configuration from the provided project directory.
  ///
  /// When the configuration file does not exist or fails to parse we fall
  /// back to default values so downstream callers can continue operating
  /// with the assumptions the shipped descriptors encoded.
  pub fn discover(project_dir: &Path) -> Self {
    let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// File name of the artifact this configuration produces on `platform`.
  pub fn artifact_file_name(&self, platform: PlatformId) -> String {
    self.naming.artifact_file_name(&self.app_name, platform)
  }

  /// Expected artifact path under the project directory.
  pub fn artifact_path(&self, project_dir: &Path, platform: PlatformId) -> PathBuf {
    project_dir
      .join(&self.dist_dir)
      .join(self.artifact_file_name(platform))
  }

  /// Scratch directory the packaging tool works in.
  pub fn build_dir_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.build_dir)
  }

  /// Directory the final artifact is written into.
  pub fn dist_dir_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.dist_dir)
  }

  /// Directory the resolved assets are staged into.
  pub fn staging_dir_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(&self.staging_dir)
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn discover_falls_back_to_defaults() {
    let temp = tempdir().unwrap();
    let config = BundleConfig::discover(temp.path());

    assert_eq!(config.app_name, "xiangqi_pyqt");
    assert_eq!(config.strategy, ResolutionStrategy::EngineLookup);
    assert_eq!(config.naming, NamingScheme::Static);
    assert_eq!(config.descriptor, "xiangqi_pyqt.spec");
  }

  #[test]
  fn discover_ignores_unparseable_files() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("bundle.config.json"), "not json").unwrap();

    let config = BundleConfig::discover(temp.path());
    assert_eq!(config.app_name, "xiangqi_pyqt");
  }

  #[test]
  fn from_path_reads_partial_configuration() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("bundle.config.json");
    fs::write(
      &path,
      r#"{"app_name": "demo_app", "naming": "platform-suffixed", "strategy": "directory-sweep"}"#,
    )
    .unwrap();

    let config = BundleConfig::from_path(&path).expect("configuration should parse");
    assert_eq!(config.app_name, "demo_app");
    assert_eq!(config.naming, NamingScheme::PlatformSuffixed);
    assert_eq!(config.strategy, ResolutionStrategy::DirectorySweep);
    // Unspecified fields keep their defaults.
    assert_eq!(config.dist_dir, "dist");
  }

  #[test]
  fn artifact_path_combines_dist_dir_and_naming() {
    let config = BundleConfig::default();
    let path = config.artifact_path(Path::new("/project"), PlatformId::Linux);
    assert_eq!(path, PathBuf::from("/project/dist/xiangqi_pyqt"));

    let suffixed = BundleConfig {
      naming: NamingScheme::PlatformSuffixed,
      ..BundleConfig::default()
    };
    let path = suffixed.artifact_path(Path::new("/project"), PlatformId::Windows);
    assert_eq!(
      path,
      PathBuf::from("/project/dist/xiangqi-pyqt-windows.exe")
    );
  }
}
