//! Host platform identification and the engine binary search table.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Operating system a bundle build targets.
///
/// Detected once per invocation from the build host and treated as immutable
/// for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum PlatformId {
  /// Windows desktop builds.
  Windows,
  /// macOS desktop builds.
  Macos,
  /// Linux desktop builds; also the fallback for unrecognised hosts.
  Linux,
}

impl PlatformId {
  /// Detect the platform of the build host.
  pub fn host() -> Self {
    match std::env::consts::OS {
      "windows" => Self::Windows,
      "macos" => Self::Macos,
      _ => Self::Linux,
    }
  }

  /// Short lowercase name used in artifact names and log output.
  pub fn name(self) -> &'static str {
    match self {
      Self::Windows => "windows",
      Self::Macos => "macos",
      Self::Linux => "linux",
    }
  }

  /// Name of the checkout directory holding platform specific engine builds.
  pub fn engine_dir(self) -> &'static str {
    match self {
      Self::Windows => "Windows",
      Self::Macos => "MacOS",
      Self::Linux => "Linux",
    }
  }

  /// Engine binary candidates for this platform in priority order.
  ///
  /// Each candidate is a `(source path, bundle directory)` pair relative to
  /// the project root. The first candidate present on disk wins; the
  /// root-level plain `pikafish` build acts as the portable fallback.
  pub fn engine_candidates(self) -> &'static [(&'static str, &'static str)] {
    match self {
      Self::Windows => &[
        ("Windows/pikafish-avx2.exe", "Windows"),
        ("pikafish.exe", "."),
      ],
      Self::Macos => &[
        ("MacOS/pikafish-apple-silicon", "MacOS"),
        ("pikafish", "."),
      ],
      Self::Linux => &[("Linux/pikafish-avx2", "Linux"), ("pikafish", ".")],
    }
  }

  /// File extension the packaging tool appends to executables, if any.
  pub fn exe_suffix(self) -> &'static str {
    match self {
      Self::Windows => ".exe",
      _ => "",
    }
  }
}

impl std::fmt::Display for PlatformId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}
