//! Build orchestrator: cleanup, staging, packaging invocation and artifact
//! verification.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use same_file::is_same_file;
use tracing::{debug, info, warn};

use crate::config::BundleConfig;
use crate::manifest::resolve_manifest;
use crate::models::Manifest;
use crate::platform::PlatformId;
use crate::probe::DiskProbe;

/// High-level helper driving a bundle build from resolution to verification.
pub struct BundleBuilder {
  project_dir: PathBuf,
  config: BundleConfig,
  platform: PlatformId,
}

/// Outcome of a successful build: the verified artifact and its size.
#[derive(Debug, Clone)]
pub struct ArtifactReport {
  /// Path of the produced artifact.
  pub path: PathBuf,
  /// Artifact size in bytes.
  pub size: u64,
}

impl ArtifactReport {
  /// Human-readable artifact size.
  pub fn human_size(&self) -> String {
    format_bytes(self.size)
  }
}

impl BundleBuilder {
  /// Create a builder for the given project directory and target platform.
  pub fn new(
    project_dir: impl Into<PathBuf>,
    config: BundleConfig,
    platform: PlatformId,
  ) -> Self {
    Self {
      project_dir: project_dir.into(),
      config,
      platform,
    }
  }

  /// Configuration driving this build.
  pub fn config(&self) -> &BundleConfig {
    &self.config
  }

  /// Platform this build targets.
  pub fn platform(&self) -> PlatformId {
    self.platform
  }

  /// Resolve the bundle manifest for the current filesystem state.
  pub fn resolve(&self) -> Manifest {
    let probe = DiskProbe::new(&self.project_dir);
    resolve_manifest(
      self.platform,
      self.config.strategy,
      &self.config.fixed_assets,
      &probe,
    )
  }

  /// Remove output directories left behind by previous builds.
  pub fn clean(&self) -> Result<()> {
    let dirs = [
      self.config.build_dir_path(&self.project_dir),
      self.config.dist_dir_path(&self.project_dir),
    ];
    for dir in dirs {
      match fs::remove_dir_all(&dir) {
        Ok(()) => info!(dir = %dir.display(), "removed previous build output"),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
          return Err(err).with_context(|| format!("failed to remove {}", dir.display()));
        }
      }
    }
    Ok(())
  }

  /// Mirror the manifest's files into the staging directory.
  ///
  /// Files are hard-linked when the filesystem allows it and copied
  /// otherwise; files already staged from a previous run are left alone,
  /// and anything in the staging tree the manifest no longer names is
  /// pruned. On Unix the staged engine binary has its execute bits set.
  pub fn stage(&self, manifest: &Manifest) -> Result<PathBuf> {
    let staging_root = self.config.staging_dir_path(&self.project_dir);
    fs::create_dir_all(&staging_root)
      .with_context(|| format!("failed to create {}", staging_root.display()))?;

    let mut keep = BTreeSet::new();
    // The manifest summary lives in the staging root as well; spare it.
    keep.insert(PathBuf::from(&self.config.manifest_json));

    for entry in manifest.entries() {
      let source = entry.source_path(&self.project_dir);
      if !source.is_file() {
        debug!(source = %source.display(), "source vanished since resolution, skipped");
        continue;
      }

      let bundle_path = PathBuf::from(entry.bundle_path());
      let destination = staging_root.join(&bundle_path);
      if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {}", parent.display()))?;
      }
      install_bundle_file(&source, &destination)
        .with_context(|| format!("failed to stage {}", source.display()))?;
      keep.insert(bundle_path);
    }

    prune_staging_tree(&staging_root, &keep)
      .with_context(|| format!("failed to prune {}", staging_root.display()))?;

    #[cfg(unix)]
    {
      if let Some(engine) = &manifest.engine {
        let staged = staging_root.join(engine.bundle_path());
        if staged.is_file() {
          ensure_executable(&staged)
            .with_context(|| format!("failed to mark {} executable", staged.display()))?;
        }
      }
    }

    info!(staging = %staging_root.display(), files = manifest.len(), "staged bundle assets");
    Ok(staging_root)
  }

  /// Serialize the manifest summary into the staging directory.
  pub fn write_manifest_summary(&self, manifest: &Manifest) -> Result<PathBuf> {
    let staging_root = self.config.staging_dir_path(&self.project_dir);
    fs::create_dir_all(&staging_root)
      .with_context(|| format!("failed to create {}", staging_root.display()))?;

    let path = staging_root.join(&self.config.manifest_json);
    let json = serde_json::to_string_pretty(&manifest.summary())
      .context("failed to serialize manifest summary")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
  }

  /// Invoke the external packaging tool.
  ///
  /// A failing exit status is only logged here; the authoritative failure
  /// signal is the artifact check that follows packaging.
  pub fn package(&self) -> Result<()> {
    let entry_script = self.project_dir.join(&self.config.entry_script);
    if !entry_script.is_file() {
      bail!("entry script {} is missing", entry_script.display());
    }

    let mut argv = self.config.packager.iter();
    let program = argv.next().context("packager command is empty")?;
    info!(packager = program.as_str(), descriptor = self.config.descriptor.as_str(), "invoking packaging tool");

    let status = Command::new(program)
      .args(argv)
      .arg(&self.config.descriptor)
      .current_dir(&self.project_dir)
      .status()
      .with_context(|| format!("failed to launch packager `{program}`"))?;

    if !status.success() {
      warn!(%status, "packaging tool exited with a failure status");
    }
    Ok(())
  }

  /// Check that the expected artifact exists and report its size.
  pub fn verify_artifact(&self) -> Result<ArtifactReport> {
    let path = self.config.artifact_path(&self.project_dir, self.platform);
    let metadata = match fs::metadata(&path) {
      Ok(metadata) if metadata.is_file() => metadata,
      Ok(_) | Err(_) => {
        bail!(
          "expected artifact {} was not produced by the packaging step",
          path.display()
        );
      }
    };

    Ok(ArtifactReport {
      path,
      size: metadata.len(),
    })
  }

  /// Run the full pipeline: clean, resolve, stage, package and verify.
  pub fn build(&self) -> Result<ArtifactReport> {
    self.clean()?;
    let manifest = self.resolve();
    self.stage(&manifest)?;
    self.write_manifest_summary(&manifest)?;
    self.package()?;
    let report = self.verify_artifact()?;
    info!(
      artifact = %report.path.display(),
      size = report.size,
      "bundle build finished"
    );
    Ok(report)
  }
}

/// Place one resolved file at its staging destination.
///
/// An already-staged identical file is left untouched; otherwise the stale
/// destination is replaced, preferring a hard link over a copy.
fn install_bundle_file(source: &Path, destination: &Path) -> std::io::Result<()> {
  if destination.exists() {
    if is_same_file(source, destination)? {
      return Ok(());
    }
    fs::remove_file(destination)?;
  }

  match fs::hard_link(source, destination) {
    Ok(()) => Ok(()),
    Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
    Err(_) => fs::copy(source, destination).map(|_| ()),
  }
}

/// Delete everything under `root` that `keep` does not name.
///
/// Directories left empty after pruning are removed as well; `root` itself
/// always survives.
fn prune_staging_tree(root: &Path, keep: &BTreeSet<PathBuf>) -> std::io::Result<()> {
  prune_dir(root, Path::new(""), keep)?;
  Ok(())
}

// Returns true when the directory ended up empty and can be removed by the
// caller.
fn prune_dir(base: &Path, relative: &Path, keep: &BTreeSet<PathBuf>) -> std::io::Result<bool> {
  let dir = base.join(relative);
  let entries = match fs::read_dir(&dir) {
    Ok(entries) => entries,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(true),
    Err(err) => return Err(err),
  };

  let mut keep_any = false;
  for entry in entries {
    let entry = entry?;
    let child = relative.join(entry.file_name());
    if entry.file_type()?.is_dir() {
      if prune_dir(base, &child, keep)? {
        fs::remove_dir_all(entry.path())?;
      } else {
        keep_any = true;
      }
    } else if keep.contains(&child) {
      keep_any = true;
    } else {
      fs::remove_file(entry.path())?;
    }
  }

  Ok(!keep_any && !relative.as_os_str().is_empty())
}

#[cfg(unix)]
fn ensure_executable(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let mut permissions = fs::metadata(path)?.permissions();
  let mode = permissions.mode();
  if mode & 0o100 == 0 {
    permissions.set_mode(mode | 0o111);
    fs::set_permissions(path, permissions)?;
  }
  Ok(())
}

/// Format a byte count into a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
  const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

  if bytes < 1024 {
    return format!("{bytes} B");
  }

  let value = bytes as f64;
  let exp = ((value.ln() / 1024_f64.ln()).floor() as usize).min(UNITS.len() - 1);
  format!("{:.1} {}", value / 1024_f64.powi(exp as i32), UNITS[exp])
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn linux_builder(project_dir: &Path) -> BundleBuilder {
    BundleBuilder::new(project_dir, BundleConfig::default(), PlatformId::Linux)
  }

  fn seed_linux_project(root: &Path) {
    fs::create_dir(root.join("Linux")).unwrap();
    fs::write(root.join("Linux/pikafish-avx2"), "engine").unwrap();
    fs::write(root.join("pikafish.nnue"), "weights").unwrap();
    fs::write(root.join("xiangqi_pyqt.png"), "icon").unwrap();
  }

  #[test]
  fn stage_mirrors_the_resolved_manifest() {
    let temp = tempdir().unwrap();
    seed_linux_project(temp.path());

    let builder = linux_builder(temp.path());
    let manifest = builder.resolve();
    let staging = builder.stage(&manifest).unwrap();

    assert!(staging.join("Linux/pikafish-avx2").is_file());
    assert!(staging.join("pikafish.nnue").is_file());
    assert!(staging.join("xiangqi_pyqt.png").is_file());
    assert!(
      is_same_file(
        temp.path().join("Linux/pikafish-avx2"),
        staging.join("Linux/pikafish-avx2"),
      )
      .unwrap()
    );
  }

  #[test]
  fn stage_prunes_files_the_manifest_no_longer_names() {
    let temp = tempdir().unwrap();
    seed_linux_project(temp.path());

    let builder = linux_builder(temp.path());
    let manifest = builder.resolve();
    let staging = builder.stage(&manifest).unwrap();

    fs::create_dir_all(staging.join("stale")).unwrap();
    fs::write(staging.join("stale/old.bin"), "old").unwrap();
    fs::write(staging.join("leftover.dat"), "old").unwrap();

    builder.stage(&manifest).unwrap();
    assert!(!staging.join("stale").exists());
    assert!(!staging.join("leftover.dat").exists());
    assert!(staging.join("pikafish.nnue").is_file());
  }

  #[test]
  fn stage_spares_the_manifest_summary() {
    let temp = tempdir().unwrap();
    seed_linux_project(temp.path());

    let builder = linux_builder(temp.path());
    let manifest = builder.resolve();
    builder.write_manifest_summary(&manifest).unwrap();
    let staging = builder.stage(&manifest).unwrap();

    assert!(staging.join("bundle_manifest.json").is_file());
  }

  #[cfg(unix)]
  #[test]
  fn staged_engine_binary_is_executable() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempdir().unwrap();
    seed_linux_project(temp.path());
    let mut permissions = fs::metadata(temp.path().join("Linux/pikafish-avx2"))
      .unwrap()
      .permissions();
    permissions.set_mode(0o644);
    fs::set_permissions(temp.path().join("Linux/pikafish-avx2"), permissions).unwrap();

    let builder = linux_builder(temp.path());
    let manifest = builder.resolve();
    let staging = builder.stage(&manifest).unwrap();

    let mode = fs::metadata(staging.join("Linux/pikafish-avx2"))
      .unwrap()
      .permissions()
      .mode();
    assert_ne!(mode & 0o111, 0);
  }

  #[test]
  fn clean_removes_previous_outputs() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("build/bundle")).unwrap();
    fs::create_dir_all(temp.path().join("dist")).unwrap();
    fs::write(temp.path().join("dist/xiangqi_pyqt"), "artifact").unwrap();

    let builder = linux_builder(temp.path());
    builder.clean().unwrap();
    assert!(!temp.path().join("build").exists());
    assert!(!temp.path().join("dist").exists());

    // Cleaning an already-clean tree is a no-op.
    builder.clean().unwrap();
  }

  #[test]
  fn verify_artifact_fails_when_nothing_was_produced() {
    let temp = tempdir().unwrap();
    let builder = linux_builder(temp.path());

    let err = builder.verify_artifact().unwrap_err();
    assert!(err.to_string().contains("was not produced"));
  }

  #[test]
  fn verify_artifact_reports_the_size() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("dist")).unwrap();
    fs::write(temp.path().join("dist").join("xiangqi_pyqt"), vec![0u8; 2048]).unwrap();

    let builder = BundleBuilder::new(
      temp.path(),
      BundleConfig::default(),
      PlatformId::Linux,
    );
    let report = builder.verify_artifact().unwrap();
    assert_eq!(report.size, 2048);
    assert_eq!(report.human_size(), "2.0 KiB");
  }

  #[test]
  fn package_fails_fast_without_the_entry_script() {
    let temp = tempdir().unwrap();
    let builder = linux_builder(temp.path());

    let err = builder.package().unwrap_err();
    assert!(err.to_string().contains("entry script"));
  }

  #[cfg(unix)]
  #[test]
  fn build_fails_when_the_packager_produces_no_artifact() {
    let temp = tempdir().unwrap();
    seed_linux_project(temp.path());
    fs::write(temp.path().join("main.py"), "print()").unwrap();

    let config = BundleConfig {
      packager: vec!["true".into()],
      ..BundleConfig::default()
    };
    let builder = BundleBuilder::new(temp.path(), config, PlatformId::Linux);

    let err = builder.build().unwrap_err();
    assert!(err.to_string().contains("was not produced"));
  }

  #[cfg(unix)]
  #[test]
  fn build_succeeds_when_the_artifact_appears() {
    let temp = tempdir().unwrap();
    seed_linux_project(temp.path());
    fs::write(temp.path().join("main.py"), "print()").unwrap();

    let config = BundleConfig {
      packager: vec![
        "sh".into(),
        "-c".into(),
        "mkdir -p dist && printf artifact > dist/xiangqi_pyqt".into(),
      ],
      ..BundleConfig::default()
    };
    let builder = BundleBuilder::new(temp.path(), config, PlatformId::Linux);

    let report = builder.build().unwrap();
    assert!(report.path.is_file());
    assert_eq!(report.size, "artifact".len() as u64);
  }

  #[test]
  fn format_bytes_scales_units() {
    assert_eq!(format_bytes(0), "0 B");
    assert_eq!(format_bytes(512), "512 B");
    assert_eq!(format_bytes(2048), "2.0 KiB");
    assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
  }
}
