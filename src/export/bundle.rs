//! Export bundle: `checkins.csv` plus one PNG per captured signature.

use log::{debug, warn};

use super::Result;
use super::data_url::decode_png_data_url;
use super::roster_csv::write_csv;
use crate::roster::{Guest, Roster};
use crate::zip::{ArchiveEntry, build_archive};

/// Entry naming inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    pub csv_name: String,
    pub signature_dir: String,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            csv_name: "checkins.csv".to_string(),
            signature_dir: "signatures".to_string(),
        }
    }
}

/// Entries of a bundle, ready for [`build_archive`].
#[derive(Debug, Clone)]
pub struct BundleReport {
    pub entries: Vec<ArchiveEntry>,
    /// Ids of guests whose signature could not be decoded
    pub skipped: Vec<String>,
}

impl BundleReport {
    pub fn signature_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }
}

/// Lowercase ASCII alphanumerics; any other run of characters becomes `_`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("guest");
    }
    slug
}

/// Path separators in an id would create nested entries.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// `<signature_dir>/<slug>_<id>.png`
pub fn signature_entry_name(options: &BundleOptions, guest: &Guest) -> String {
    let dir = options.signature_dir.trim_matches('/');
    let file = format!("{}_{}.png", slugify(&guest.name), sanitize_id(&guest.id));
    if dir.is_empty() {
        file
    } else {
        format!("{}/{}", dir, file)
    }
}

/// Assemble the bundle entries for `roster`.
///
/// The CSV comes first; signatures follow in roster order. A signature
/// that fails to decode is left out and its CSV cell is empty.
pub fn bundle_entries(roster: &Roster, options: &BundleOptions) -> Result<BundleReport> {
    let mut images = Vec::new();
    let mut paths: Vec<Option<String>> = vec![None; roster.len()];
    let mut skipped = Vec::new();

    for (index, guest) in roster.iter().enumerate() {
        if !guest.has_signature() {
            continue;
        }
        match decode_png_data_url(guest.signature_url.as_deref().unwrap_or_default()) {
            Ok(png) => {
                let name = signature_entry_name(options, guest);
                debug!("signature for {} -> {} ({} bytes)", guest.id, name, png.len());
                paths[index] = Some(name.clone());
                images.push(ArchiveEntry::new(name, png));
            }
            Err(e) => {
                warn!("skipping signature of guest {}: {}", guest.id, e);
                skipped.push(guest.id.clone());
            }
        }
    }

    let csv = write_csv(roster, |index, _| paths[index].clone().unwrap_or_default())?;

    let mut entries = Vec::with_capacity(images.len() + 1);
    entries.push(ArchiveEntry::new(options.csv_name.clone(), csv));
    entries.extend(images);

    Ok(BundleReport { entries, skipped })
}

/// Build the bundle archive for `roster`.
pub fn build_bundle(roster: &Roster, options: &BundleOptions) -> Result<Vec<u8>> {
    let report = bundle_entries(roster, options)?;
    Ok(build_archive(&report.entries)?)
}
