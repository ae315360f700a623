//! Engine binary selection from the per-platform candidate table.

use std::path::Path;

use tracing::{debug, warn};

use crate::models::AssetEntry;
use crate::platform::PlatformId;
use crate::probe::FsProbe;

/// Select the engine binary for `platform`, trying candidates in priority
/// order.
///
/// The first candidate present on disk wins; later candidates are never
/// merged in. A platform with no engine build at all yields `None` and the
/// bundle is produced without an engine.
pub fn select_engine(platform: PlatformId, probe: &dyn FsProbe) -> Option<AssetEntry> {
  for (source, dest_dir) in platform.engine_candidates() {
    if probe.is_file(Path::new(source)) {
      debug!(engine = *source, "selected engine binary");
      return Some(AssetEntry::new(*source, *dest_dir));
    }
    debug!(candidate = *source, "engine candidate not present");
  }

  warn!(
    platform = platform.name(),
    "no engine binary found, bundling without an engine"
  );
  None
}
