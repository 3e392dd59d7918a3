//! Naming and acceptance constants for uploads and export artifacts.

/// File name prefix for every stored export.
pub const EXPORT_FILE_PREFIX: &str = "menu-export";

/// Number of hex characters of the content hash embedded in export file names.
pub const HASH_PREFIX_LEN: usize = 12;

/// Media type prefixes accepted for menu uploads.
pub const ACCEPTED_MEDIA_PREFIXES: &[&str] = &["image/", "application/pdf"];

/// Extension of the stored CSV artifact.
pub(crate) const EXPORT_EXTENSION: &str = "csv";

/// Extension of the metadata sidecar.
pub(crate) const METADATA_EXTENSION: &str = "yaml";
