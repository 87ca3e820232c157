use std::fmt;

/// Errors raised while reading, decoding or persisting NMEA data
#[derive(Debug)]
pub enum NmeaError {
    /// I/O errors from the byte source
    Io(std::io::Error),
    /// Record bytes are not valid UTF-8
    Utf8(std::str::Utf8Error),
    /// Byte source did not produce a record before its read timeout
    Timeout,
    /// Byte source is exhausted or disconnected
    EndOfStream,
    /// Record contained no fields at all
    EmptyRecord,
    /// A mandatory field is absent or empty
    MissingField { tag: String, index: usize },
    /// A numeric field could not be parsed
    InvalidNumber {
        tag: String,
        index: usize,
        value: String,
    },
    /// A field is present but holds an unexpected value
    InvalidField {
        tag: String,
        index: usize,
        reason: String,
    },
    /// Computed checksum differs from the transmitted one
    ChecksumMismatch { expected: u8, found: u8 },
    /// Checksum validation is required but the record carries none
    MissingChecksum,
    /// Satellite-view records arrived out of order or with inconsistent totals
    SatelliteSequence(String),
    /// Export format error
    Export(String),
    /// CSV writer errors
    #[cfg(feature = "csv")]
    Csv(csv::Error),
}

impl NmeaError {
    /// True for failures of the byte source rather than of a single sentence.
    ///
    /// Only these may end a session; everything else is local to one record.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            NmeaError::Io(_) | NmeaError::Timeout | NmeaError::EndOfStream
        )
    }

    /// Classify an I/O error raised while reading records
    ///
    /// Read timeouts and early EOF become `Timeout` and `EndOfStream` so callers
    /// can poll again or end the session. Other I/O errors stay `Io`.
    pub fn from_source_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => NmeaError::Timeout,
            std::io::ErrorKind::UnexpectedEof => NmeaError::EndOfStream,
            _ => NmeaError::Io(err),
        }
    }

    pub(crate) fn invalid_number(tag: &str, index: usize, value: &str) -> Self {
        NmeaError::InvalidNumber {
            tag: tag.to_string(),
            index,
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid_field(tag: &str, index: usize, reason: impl Into<String>) -> Self {
        NmeaError::InvalidField {
            tag: tag.to_string(),
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_field(tag: &str, index: usize) -> Self {
        NmeaError::MissingField {
            tag: tag.to_string(),
            index,
        }
    }
}

impl fmt::Display for NmeaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NmeaError::Io(err) => write!(f, "I/O error: {}", err),
            NmeaError::Utf8(err) => write!(f, "UTF-8 error: {}", err),
            NmeaError::Timeout => write!(f, "Timed out waiting for a record"),
            NmeaError::EndOfStream => write!(f, "End of stream"),
            NmeaError::EmptyRecord => write!(f, "Empty record"),
            NmeaError::MissingField { tag, index } => {
                write!(f, "{}: missing field {}", tag, index)
            }
            NmeaError::InvalidNumber { tag, index, value } => {
                write!(f, "{}: field {} is not a number: {:?}", tag, index, value)
            }
            NmeaError::InvalidField { tag, index, reason } => {
                write!(f, "{}: invalid field {}: {}", tag, index, reason)
            }
            NmeaError::ChecksumMismatch { expected, found } => write!(
                f,
                "Checksum mismatch: computed {:02X}, record carries {:02X}",
                expected, found
            ),
            NmeaError::MissingChecksum => write!(f, "Record carries no checksum"),
            NmeaError::SatelliteSequence(msg) => {
                write!(f, "Satellite-view sequence error: {}", msg)
            }
            NmeaError::Export(msg) => write!(f, "Export error: {}", msg),
            #[cfg(feature = "csv")]
            NmeaError::Csv(err) => write!(f, "CSV error: {}", err),
        }
    }
}

impl std::error::Error for NmeaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NmeaError::Io(err) => Some(err),
            NmeaError::Utf8(err) => Some(err),
            #[cfg(feature = "csv")]
            NmeaError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NmeaError {
    fn from(err: std::io::Error) -> Self {
        NmeaError::Io(err)
    }
}

impl From<std::str::Utf8Error> for NmeaError {
    fn from(err: std::str::Utf8Error) -> Self {
        NmeaError::Utf8(err)
    }
}

impl From<anyhow::Error> for NmeaError {
    fn from(err: anyhow::Error) -> Self {
        NmeaError::Export(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for NmeaError {
    fn from(err: csv::Error) -> Self {
        NmeaError::Csv(err)
    }
}

pub type Result<T> = std::result::Result<T, NmeaError>;
