//! Disk storage for uploaded invoice and receipt files.
//!
//! Uploads are written under a fixed root directory with one subdirectory per
//! document category. Stored names are random hex tokens with the original
//! file extension preserved, so concurrent uploads of identically named files
//! never clash.

use std::{
    fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::Error;

/// The file extensions (lowercase, without the leading dot) that uploads may
/// have.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

/// The kind of document an upload is, which decides the subdirectory it is
/// stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentCategory {
    /// A receipt attached to an expense.
    Receipts,
    /// An invoice attached to an income record.
    Invoices,
}

impl DocumentCategory {
    /// The name of the subdirectory that holds this category's files.
    fn dir_name(self) -> &'static str {
        match self {
            DocumentCategory::Receipts => "receipts",
            DocumentCategory::Invoices => "invoices",
        }
    }

    /// The label used when describing this category's documents to the
    /// client, e.g. in error messages.
    pub fn document_label(self) -> &'static str {
        match self {
            DocumentCategory::Receipts => "receipt",
            DocumentCategory::Invoices => "invoice",
        }
    }
}

/// The disk area holding uploaded binary attachments.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `root`.
    ///
    /// Creates the root directory and the per-category subdirectories if they
    /// do not exist yet.
    ///
    /// # Errors
    /// Returns [Error::Storage] if a directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();

        for category in [DocumentCategory::Receipts, DocumentCategory::Invoices] {
            let directory = root.join(category.dir_name());
            fs::create_dir_all(&directory).map_err(|error| {
                Error::Storage(format!(
                    "could not create upload directory {}: {error}",
                    directory.display()
                ))
            })?;
        }

        Ok(Self { root })
    }

    /// Write `bytes` to a new file under this store's `category`
    /// subdirectory and return the generated file name.
    ///
    /// The stored name is a random 32 character hex token with the original
    /// extension appended. No collision check is performed, the token space
    /// makes clashes negligible.
    ///
    /// # Errors
    /// Returns [Error::InvalidFileType] if the extension of
    /// `original_filename` is not in [ALLOWED_EXTENSIONS], or
    /// [Error::Storage] if the file cannot be written.
    pub fn store(
        &self,
        category: DocumentCategory,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, Error> {
        let extension = match Path::new(original_filename).extension() {
            Some(extension) if is_allowed_extension(extension.to_string_lossy().as_ref()) => {
                extension.to_string_lossy()
            }
            _ => return Err(Error::InvalidFileType(category.document_label().to_owned())),
        };

        let stored_filename = format!("{}.{extension}", Uuid::new_v4().simple());
        let path = self.path_of(category, &stored_filename);

        fs::write(&path, bytes).map_err(|error| {
            Error::Storage(format!("could not write {}: {error}", path.display()))
        })?;

        tracing::debug!(
            "Stored {} '{}' as {} ({} bytes)",
            category.document_label(),
            original_filename,
            stored_filename,
            bytes.len()
        );

        Ok(stored_filename)
    }

    /// The full path of a stored file within `category`.
    pub fn path_of(&self, category: DocumentCategory, stored_filename: &str) -> PathBuf {
        self.root.join(category.dir_name()).join(stored_filename)
    }
}

/// Check whether `extension` (without the leading dot) is in the allow-list.
///
/// The comparison is case-insensitive.
fn is_allowed_extension(extension: &str) -> bool {
    let extension = extension.to_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .any(|allowed| *allowed == extension)
}
