//! Menu upload intake.
//!
//! The wizard accepts a photo or scan of the printed menu. The media type is detected from
//! the content itself; the file extension is informational only.

use crate::constants::ACCEPTED_MEDIA_PREFIXES;
use crate::{FilesError, FilesResult, Sha256Hash};
use std::fs;
use std::path::Path;
use tonosama_types::NonEmptyText;

/// A validated menu upload held in memory for the OCR collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuUpload {
    bytes: Vec<u8>,
    original_filename: NonEmptyText,
    media_type: NonEmptyText,
    hash: Sha256Hash,
}

impl MenuUpload {
    /// Reads and validates an upload from disk.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the file cannot be read, is empty, or is not an image/PDF.
    pub fn from_path(path: &Path) -> FilesResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read upload {}: {}", path.display(), e),
            ))
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");

        Self::from_bytes(filename, bytes)
    }

    /// Validates an upload received as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::EmptyUpload`] for zero-length content and
    /// [`FilesError::UnsupportedUpload`] when the detected media type is not accepted.
    pub fn from_bytes(filename: &str, bytes: Vec<u8>) -> FilesResult<Self> {
        let original_filename = NonEmptyText::new(filename)
            .map_err(|_| FilesError::UnsupportedUpload("upload has no file name".into()))?;

        if bytes.is_empty() {
            return Err(FilesError::EmptyUpload(original_filename.into_inner()));
        }

        let Some(kind) = infer::get(&bytes) else {
            return Err(FilesError::UnsupportedUpload(format!(
                "{}: media type could not be detected",
                original_filename
            )));
        };

        let mime = kind.mime_type();
        if !ACCEPTED_MEDIA_PREFIXES
            .iter()
            .any(|prefix| mime.starts_with(prefix))
        {
            return Err(FilesError::UnsupportedUpload(format!(
                "{}: {} is not an image or PDF",
                original_filename, mime
            )));
        }

        let media_type = NonEmptyText::new(mime)
            .map_err(|_| FilesError::UnsupportedUpload("empty media type".into()))?;
        let hash = Sha256Hash::of(&bytes);

        tracing::debug!(
            "accepted upload {} ({}, {} bytes)",
            original_filename,
            media_type,
            bytes.len()
        );

        Ok(Self {
            bytes,
            original_filename,
            media_type,
            hash,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn original_filename(&self) -> &NonEmptyText {
        &self.original_filename
    }

    pub fn media_type(&self) -> &NonEmptyText {
        &self.media_type
    }

    pub fn hash(&self) -> &Sha256Hash {
        &self.hash
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}
