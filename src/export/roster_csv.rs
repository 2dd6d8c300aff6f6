use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::Result;
use crate::roster::{Guest, Roster};

const HEADER: [&str; 4] = ["name", "email", "checkedIn", "signatureUrl"];

/// Serialize `roster` with the signature column taken from `signature`.
///
/// Every field is quoted and rows are separated by `\n`, with no newline
/// after the last row.
pub(crate) fn write_csv<F>(roster: &Roster, mut signature: F) -> Result<Vec<u8>>
where
    F: FnMut(usize, &Guest) -> String,
{
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(HEADER)?;
    for (index, guest) in roster.iter().enumerate() {
        let checked_in = if guest.checked_in { "1" } else { "0" };
        wtr.write_record([
            guest.name.as_str(),
            guest.email.as_str(),
            checked_in,
            signature(index, guest).as_str(),
        ])?;
    }

    let mut out = wtr.into_inner().map_err(|e| e.into_error())?;
    if out.last() == Some(&b'\n') {
        out.pop();
    }
    Ok(out)
}

/// Plain CSV export; the signature column holds the raw data URL.
pub fn roster_to_csv(roster: &Roster) -> Result<Vec<u8>> {
    write_csv(roster, |_, guest| guest.signature_url.clone().unwrap_or_default())
}
