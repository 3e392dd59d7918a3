//! TONOSAMA file handling
//!
//! This crate owns the two places where the wizard touches raw bytes:
//!
//! - **Menu uploads**: the photographed or scanned menu an owner hands to OCR. Uploads are
//!   content-sniffed (never trusted by extension) and hashed so the session can refer to them
//!   by digest.
//! - **Export artifacts**: the finished CSV. Artifacts are written once into an export
//!   directory under a timestamped, hash-suffixed name with a YAML metadata sidecar.
//!
//! ```text
//! <export_dir>/
//! ├── menu-export-20261018T093000Z-ab3f9e01c2d4.csv
//! └── menu-export-20261018T093000Z-ab3f9e01c2d4.yaml
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use tonosama_files::{ExportStore, MenuUpload};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let upload = MenuUpload::from_path(Path::new("menu.jpg"))?;
//! println!("{} ({})", upload.original_filename(), upload.media_type());
//!
//! let store = ExportStore::new(Path::new("exports"))?;
//! let metadata = store.store(b"\xEF\xBB\xBFprice\n", 0)?;
//! println!("wrote {}", metadata.file_name);
//! # Ok(())
//! # }
//! ```

mod constants;
mod export_store;
mod hash;
mod upload;

pub use constants::{ACCEPTED_MEDIA_PREFIXES, EXPORT_FILE_PREFIX, HASH_PREFIX_LEN};
pub use export_store::{ExportMetadata, ExportStore};
pub use hash::Sha256Hash;
pub use upload::MenuUpload;

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Export directory is missing and could not be created, or is not a directory
    #[error("Invalid export directory: {0}")]
    InvalidExportDirectory(String),

    /// Uploaded content is not an image or PDF
    #[error("Unsupported upload: {0}")]
    UnsupportedUpload(String),

    /// Uploaded content is empty
    #[error("Upload is empty: {0}")]
    EmptyUpload(String),

    /// An export with the same name already exists (immutability violation)
    #[error("Export {0} already exists")]
    ExportAlreadyExists(String),

    /// Metadata sidecar could not be serialised
    #[error("failed to serialize export metadata: {0}")]
    MetadataSerialization(#[from] serde_yaml::Error),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results that can fail with a [`FilesError`].
pub type FilesResult<T> = Result<T, FilesError>;
