use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{ExportError, Result};

const PNG_PREFIX: &str = "data:image/png;base64,";

/// Decode a `data:image/png;base64,...` URL into raw PNG bytes.
pub fn decode_png_data_url(url: &str) -> Result<Vec<u8>> {
    let Some(payload) = url.strip_prefix(PNG_PREFIX) else {
        let shown: String = url.chars().take(32).collect();
        return Err(ExportError::InvalidDataUrl(shown));
    };
    Ok(STANDARD.decode(payload.trim())?)
}
