//! Export artifact storage.
//!
//! # Layout
//!
//! Every export is written exactly once into the export directory:
//!
//! ```text
//! <export_dir>/
//! ├── menu-export-<YYYYMMDDTHHMMSSZ>-<hash12>.csv    # the artifact bytes
//! └── menu-export-<YYYYMMDDTHHMMSSZ>-<hash12>.yaml   # ExportMetadata sidecar
//! ```
//!
//! The hash suffix is taken from the SHA-256 of the artifact bytes, so two different exports
//! in the same second still get distinct names, and re-storing identical bytes at the same
//! instant is reported as [`FilesError::ExportAlreadyExists`] instead of overwriting.

use crate::constants::{EXPORT_EXTENSION, EXPORT_FILE_PREFIX, HASH_PREFIX_LEN, METADATA_EXTENSION};
use crate::{FilesError, FilesResult, Sha256Hash};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Metadata recorded alongside each stored export.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ExportMetadata {
    /// File name of the artifact, relative to the export directory
    pub file_name: String,

    /// Hashing algorithm used (always "sha256")
    pub hash_algorithm: String,

    /// Hexadecimal digest of the artifact bytes
    pub hash: Sha256Hash,

    /// Size of the artifact in bytes
    pub size_bytes: u64,

    /// Number of data rows (excluding the header row)
    pub row_count: usize,

    /// UTC timestamp when the artifact was stored
    pub stored_at: DateTime<Utc>,
}

/// Write-once store for export artifacts.
#[derive(Debug)]
pub struct ExportStore {
    export_dir: PathBuf,
}

impl ExportStore {
    /// Opens the export directory, creating it if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidExportDirectory`] if the path exists but is not a
    /// directory, or cannot be created.
    pub fn new(export_dir: &Path) -> FilesResult<Self> {
        if export_dir.exists() && !export_dir.is_dir() {
            return Err(FilesError::InvalidExportDirectory(format!(
                "Path is not a directory: {}",
                export_dir.display()
            )));
        }

        fs::create_dir_all(export_dir).map_err(|e| {
            FilesError::InvalidExportDirectory(format!(
                "Cannot create {}: {}",
                export_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            export_dir: export_dir.to_path_buf(),
        })
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Stores `bytes` as a new export artifact stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`ExportStore::store_at`].
    pub fn store(&self, bytes: &[u8], row_count: usize) -> FilesResult<ExportMetadata> {
        self.store_at(bytes, row_count, Utc::now())
    }

    /// Stores `bytes` as a new export artifact stamped with `stored_at`.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - an artifact with the derived name already exists
    /// - the artifact or sidecar cannot be written (I/O)
    /// - the metadata cannot be serialised
    pub fn store_at(
        &self,
        bytes: &[u8],
        row_count: usize,
        stored_at: DateTime<Utc>,
    ) -> FilesResult<ExportMetadata> {
        let hash = Sha256Hash::of(bytes);
        let stem = format!(
            "{}-{}-{}",
            EXPORT_FILE_PREFIX,
            stored_at.format("%Y%m%dT%H%M%SZ"),
            hash.prefix(HASH_PREFIX_LEN)
        );
        let file_name = format!("{stem}.{EXPORT_EXTENSION}");
        let artifact_path = self.export_dir.join(&file_name);

        let metadata = ExportMetadata {
            file_name,
            hash_algorithm: "sha256".into(),
            hash,
            size_bytes: bytes.len() as u64,
            row_count,
            stored_at,
        };
        let sidecar_name = format!("{stem}.{METADATA_EXTENSION}");
        let sidecar = serde_yaml::to_string(&metadata)?;

        write_new(&artifact_path, bytes, &metadata.file_name)?;

        // Never leave an artifact without its sidecar.
        if let Err(e) = write_new(
            &self.export_dir.join(&sidecar_name),
            sidecar.as_bytes(),
            &sidecar_name,
        ) {
            if let Err(cleanup) = fs::remove_file(&artifact_path) {
                tracing::warn!(
                    "failed to remove {} after sidecar error: {}",
                    artifact_path.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        tracing::info!(
            "stored export {} ({} rows, {} bytes)",
            metadata.file_name,
            metadata.row_count,
            metadata.size_bytes
        );

        Ok(metadata)
    }

    /// Absolute path of a stored artifact.
    pub fn artifact_path(&self, metadata: &ExportMetadata) -> PathBuf {
        self.export_dir.join(&metadata.file_name)
    }
}

fn write_new(path: &Path, bytes: &[u8], name: &str) -> FilesResult<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(FilesError::ExportAlreadyExists(name.to_string()));
        }
        Err(e) => {
            return Err(FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create {}: {}", path.display(), e),
            )));
        }
    };

    file.write_all(bytes).map_err(|e| {
        FilesError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write {}: {}", path.display(), e),
        ))
    })
}
