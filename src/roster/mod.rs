//! Guest roster as persisted by the check-in app.
//!
//! The app stores its guests as a JSON array of records with camelCase
//! keys (`id`, `name`, `email`, `checkedIn`, `signatureUrl`). A roster dump
//! in that shape is the input to every export.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a roster
#[derive(Debug, Error)]
pub enum RosterError {
    /// IO error reading the roster file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed roster JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The app reads fields as `c.name || ''`, so `null` means empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One guest record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checked_in: bool,
    /// PNG data URL of the captured signature
    #[serde(default)]
    pub signature_url: Option<String>,
}

impl Guest {
    pub fn has_signature(&self) -> bool {
        self.signature_url.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Ordered guest list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    guests: Vec<Guest>,
}

impl Roster {
    pub fn new(guests: Vec<Guest>) -> Self {
        Self { guests }
    }

    pub fn from_json(text: &str) -> Result<Self, RosterError> {
        Ok(serde_json::from_str(text)?)
    }

    pub async fn load(path: &Path) -> Result<Self, RosterError> {
        let text = tokio::fs::read_to_string(path).await?;
        let roster = Self::from_json(&text)?;
        log::debug!("loaded {} guests from {}", roster.len(), path.display());
        Ok(roster)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Guest> {
        self.guests.iter()
    }

    pub fn len(&self) -> usize {
        self.guests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }

    pub fn checked_in_count(&self) -> usize {
        self.guests.iter().filter(|g| g.checked_in).count()
    }
}
