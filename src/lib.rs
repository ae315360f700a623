#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod manifest;
pub mod models;
pub mod platform;
pub mod probe;

pub use builder::{format_bytes, ArtifactReport, BundleBuilder};
pub use config::BundleConfig;
pub use manifest::resolve_manifest;
pub use models::{AssetEntry, Manifest, ManifestSummary, NamingScheme, ResolutionStrategy};
pub use platform::PlatformId;
pub use probe::{DiskProbe, FsProbe};
