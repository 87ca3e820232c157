//! Sentence tokenizer
//!
//! Turns one framed record into a tag and its ordered fields. No field count or
//! content validation happens here; each sentence decoder checks the layout it
//! expects. The tokenizer keeps no state between calls.

use crate::error::{NmeaError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Field delimiter of NMEA-0183 sentences
pub const FIELD_DELIMITER: char = ',';
/// Separates the sentence body from its two-digit hex checksum
pub const CHECKSUM_DELIMITER: char = '*';

/// How strictly the `*hh` checksum suffix is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChecksumMode {
    /// Records are trusted; checksums are never computed
    #[default]
    Ignore,
    /// Verify when the record carries a checksum, accept records without one
    Optional,
    /// Every record must carry a matching checksum
    Required,
}

/// One tokenized record
///
/// `fields[0]` is the tag itself so indices match the on-wire field positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub tag: &'a str,
    pub fields: Vec<&'a str>,
}

impl<'a> Sentence<'a> {
    /// Field at `index`, or `""` when the record is shorter than that
    pub fn field(&self, index: usize) -> &'a str {
        self.fields.get(index).copied().unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn last_field(&self) -> &'a str {
        self.fields.last().copied().unwrap_or("")
    }
}

/// Strip transport framing from a raw read
///
/// Removes the trailing line terminator and surrounding whitespace, and skips
/// anything before the first `$` so a record glued to binary noise still
/// yields a clean `$`-prefixed payload.
pub fn strip_framing(raw: &[u8]) -> Result<&str> {
    let start = raw.iter().position(|&b| b == b'$').unwrap_or(0);
    let text = std::str::from_utf8(&raw[start..])?;
    Ok(text.trim())
}

/// Split a framed record on `,`
pub fn tokenize(record: &str) -> Result<Sentence<'_>> {
    if record.is_empty() {
        return Err(NmeaError::EmptyRecord);
    }

    let fields: Vec<&str> = record.split(FIELD_DELIMITER).collect();
    Ok(Sentence {
        tag: fields[0],
        fields,
    })
}

/// Remove a trailing `*hh` checksum from a field value
pub fn strip_checksum(field: &str) -> &str {
    match field.find(CHECKSUM_DELIMITER) {
        Some(pos) => &field[..pos],
        None => field,
    }
}

/// XOR of every byte between the leading `$` and the `*`
pub fn compute_checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Check the record's checksum according to `mode`
pub fn verify_checksum(record: &str, mode: ChecksumMode) -> Result<()> {
    if mode == ChecksumMode::Ignore {
        return Ok(());
    }

    let star = match record.rfind(CHECKSUM_DELIMITER) {
        Some(pos) => pos,
        None if mode == ChecksumMode::Required => return Err(NmeaError::MissingChecksum),
        None => return Ok(()),
    };

    let body = record[..star].strip_prefix('$').unwrap_or(&record[..star]);
    let digits = record[star + 1..].trim();
    let found = match digits.get(..2).filter(|_| digits.len() == 2) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => None,
    };
    let found = found.ok_or_else(|| {
        let tag = record.split(FIELD_DELIMITER).next().unwrap_or("");
        NmeaError::invalid_field(tag, 0, format!("malformed checksum {:?}", digits))
    })?;

    let expected = compute_checksum(body);
    if expected != found {
        return Err(NmeaError::ChecksumMismatch { expected, found });
    }
    Ok(())
}
