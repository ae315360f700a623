//! Wholesale sweep of the platform-named engine directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::AssetEntry;
use crate::platform::PlatformId;
use crate::probe::FsProbe;

/// Enumerate every regular file directly inside the platform directory.
///
/// Each file maps into a same-named bundle subdirectory, so
/// `Linux/pikafish-avx2` ends up at `Linux/pikafish-avx2` inside the bundle.
/// Subdirectories are skipped and a missing platform directory simply
/// contributes nothing.
pub fn sweep_platform_dir(platform: PlatformId, probe: &dyn FsProbe) -> Vec<AssetEntry> {
  let dir = platform.engine_dir();
  let entries: Vec<AssetEntry> = probe
    .list_files(Path::new(dir))
    .into_iter()
    .map(|name| AssetEntry::new(PathBuf::from(dir).join(name), dir))
    .collect();

  debug!(dir, count = entries.len(), "swept platform directory");
  entries
}
