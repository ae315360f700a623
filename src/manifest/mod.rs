//! Manifest resolution for one build invocation.
//!
//! The lookup rules are split into focused submodules so that engine
//! selection, fixed-asset collection and the platform directory sweep can be
//! tested independently. [`resolve_manifest`] composes them and enforces the
//! one cross-cutting invariant: no two entries may share a bundle path.

mod engine;
mod fixed;
mod sweep;

use std::collections::BTreeSet;

pub use engine::select_engine;
pub use fixed::collect_fixed_assets;
pub use sweep::sweep_platform_dir;

use tracing::{debug, info};

use crate::models::{AssetEntry, Manifest, ResolutionStrategy};
use crate::platform::PlatformId;
use crate::probe::FsProbe;

/// Resolve the bundle manifest for `platform`.
///
/// Resolution is a pure function of the platform, the strategy, the
/// configured fixed-asset specs and the current filesystem state: no
/// mutation, and identical manifests for identical snapshots. Missing files
/// are silently omitted, never an error.
pub fn resolve_manifest(
  platform: PlatformId,
  strategy: ResolutionStrategy,
  fixed_specs: &[String],
  probe: &dyn FsProbe,
) -> Manifest {
  let mut taken = BTreeSet::new();
  let mut assets = Vec::new();

  let engine = match strategy {
    ResolutionStrategy::EngineLookup => {
      let selected = select_engine(platform, probe);
      if let Some(entry) = &selected {
        taken.insert(entry.bundle_path());
      }
      selected
    }
    ResolutionStrategy::DirectorySweep => {
      for entry in sweep_platform_dir(platform, probe) {
        push_unique(&mut assets, &mut taken, entry);
      }
      None
    }
  };

  for entry in collect_fixed_assets(fixed_specs, probe) {
    push_unique(&mut assets, &mut taken, entry);
  }

  info!(
    platform = platform.name(),
    entries = assets.len() + usize::from(engine.is_some()),
    "resolved bundle manifest"
  );

  Manifest {
    platform,
    engine,
    assets,
  }
}

fn push_unique(
  assets: &mut Vec<AssetEntry>,
  taken: &mut BTreeSet<String>,
  entry: AssetEntry,
) {
  if taken.insert(entry.bundle_path()) {
    assets.push(entry);
  } else {
    debug!(path = %entry.bundle_path(), "duplicate bundle path skipped");
  }
}
