//! Collection of the fixed data assets bundled from the project root.

use std::path::Path;

use tracing::debug;

use crate::models::AssetEntry;
use crate::probe::FsProbe;

/// Collect the configured fixed assets that are present in the project root.
///
/// A spec is either an exact file name (`settings.json`) or a `*.ext`
/// pattern (`*.pgn`); patterns expand to every matching regular file in the
/// project root, in sorted order. All fixed assets land in the bundle root.
/// Missing assets are omitted without comment.
pub fn collect_fixed_assets(specs: &[String], probe: &dyn FsProbe) -> Vec<AssetEntry> {
  let mut assets = Vec::new();

  for spec in specs {
    if let Some(extension) = spec.strip_prefix("*.") {
      for name in probe.list_files(Path::new(".")) {
        if Path::new(&name).extension().is_some_and(|ext| ext == extension) {
          assets.push(AssetEntry::new(name, "."));
        }
      }
    } else if probe.is_file(Path::new(spec)) {
      assets.push(AssetEntry::new(spec.as_str(), "."));
    } else {
      debug!(asset = spec.as_str(), "fixed asset not present, omitted");
    }
  }

  assets
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::collect_fixed_assets;
  use crate::models::AssetEntry;
  use crate::probe::DiskProbe;

  fn specs(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
  }

  #[test]
  fn includes_an_asset_exactly_when_it_exists() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("xiangqi_pyqt.png"), "png").unwrap();

    let probe = DiskProbe::new(temp.path());
    let assets = collect_fixed_assets(
      &specs(&["pikafish.nnue", "xiangqi_pyqt.png"]),
      &probe,
    );

    let paths: Vec<String> = assets.iter().map(AssetEntry::bundle_path).collect();
    assert_eq!(paths, vec!["xiangqi_pyqt.png"]);
  }

  #[test]
  fn patterns_expand_to_every_matching_root_file() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("opening.pgn"), "moves").unwrap();
    fs::write(temp.path().join("endgame.pgn"), "moves").unwrap();
    fs::write(temp.path().join("notes.txt"), "text").unwrap();

    let probe = DiskProbe::new(temp.path());
    let assets = collect_fixed_assets(&specs(&["*.pgn"]), &probe);

    let paths: Vec<String> = assets.iter().map(AssetEntry::bundle_path).collect();
    assert_eq!(paths, vec!["endgame.pgn", "opening.pgn"]);
  }

  #[test]
  fn patterns_with_no_matches_contribute_nothing() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("settings.json"), "{}").unwrap();

    let probe = DiskProbe::new(temp.path());
    let assets = collect_fixed_assets(&specs(&["*.pgn", "settings.json"]), &probe);

    let paths: Vec<String> = assets.iter().map(AssetEntry::bundle_path).collect();
    assert_eq!(paths, vec!["settings.json"]);
  }
}
