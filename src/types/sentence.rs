use crate::error::NmeaError;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Talker prefix of a sentence tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Talker {
    /// `GP`: GPS only
    Gps,
    /// `GN`: combined GNSS solution
    Gnss,
}

/// Sentence classes the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SentenceKind {
    /// Fix data: position and altitude
    Gga,
    /// Fix quality, satellites used and DOP values
    Gsa,
    /// Satellites in view, possibly spread over several records
    Gsv,
    /// Speed and course over ground
    Rmc,
    /// UTC time and date
    Zda,
}

impl SentenceKind {
    pub fn code(self) -> &'static str {
        match self {
            SentenceKind::Gga => "GGA",
            SentenceKind::Gsa => "GSA",
            SentenceKind::Gsv => "GSV",
            SentenceKind::Rmc => "RMC",
            SentenceKind::Zda => "ZDA",
        }
    }
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parse a tag such as `$GPGGA` into its talker and sentence class
///
/// Only the `GP` and `GN` talkers are accepted.
pub fn parse_tag(tag: &str) -> Option<(Talker, SentenceKind)> {
    let body = tag.strip_prefix('$')?;
    if body.len() != 5 || !body.is_ascii() {
        return None;
    }

    let talker = match &body[..2] {
        "GP" => Talker::Gps,
        "GN" => Talker::Gnss,
        _ => return None,
    };
    let kind = match &body[2..] {
        "GGA" => SentenceKind::Gga,
        "GSA" => SentenceKind::Gsa,
        "GSV" => SentenceKind::Gsv,
        "RMC" => SentenceKind::Rmc,
        "ZDA" => SentenceKind::Zda,
        _ => return None,
    };

    Some((talker, kind))
}

/// Result of processing one sentence
#[derive(Debug)]
pub enum SentenceOutcome {
    /// Sentence decoded and its field group applied to the snapshot
    Recognized(SentenceKind),
    /// Tag not handled, or a satellite-view record carrying the no-detail marker
    Unrecognized { tag: String },
    /// Recognized tag whose fields could not be decoded; snapshot left as it was
    DecodeFailure(NmeaError),
}

impl SentenceOutcome {
    pub fn is_recognized(&self) -> bool {
        matches!(self, SentenceOutcome::Recognized(_))
    }
}

/// Running counts of sentence outcomes over a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodeStats {
    pub recognized: u64,
    pub unrecognized: u64,
    pub decode_failures: u64,
}

impl DecodeStats {
    pub fn total(&self) -> u64 {
        self.recognized + self.unrecognized + self.decode_failures
    }

    pub fn record(&mut self, outcome: &SentenceOutcome) {
        match outcome {
            SentenceOutcome::Recognized(_) => self.recognized += 1,
            SentenceOutcome::Unrecognized { .. } => self.unrecognized += 1,
            SentenceOutcome::DecodeFailure(_) => self.decode_failures += 1,
        }
    }
}
