//! Roster exports: plain CSV and the ZIP bundle with signature images.

mod bundle;
mod data_url;
mod roster_csv;

pub use bundle::{BundleOptions, BundleReport, build_bundle, bundle_entries, signature_entry_name, slugify};
pub use data_url::decode_png_data_url;
pub use roster_csv::roster_to_csv;

use thiserror::Error;

use crate::zip::ArchiveError;

/// Errors that can occur while exporting a roster
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Signature is not a base64 PNG data URL
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

pub type Result<T> = std::result::Result<T, ExportError>;
