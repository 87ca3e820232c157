use crate::error::{NmeaError, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Receiver cold-start command, sent verbatim to the device
pub const COLD_START_COMMAND: [u8; 22] = [
    0xA0, 0xA1, 0x00, 0x0F, 0x01, 0x03, 0x07, 0xD8, 0x0B, 0x0E, 0x08, 0x2E, 0x03, 0x09, 0xC4,
    0x30, 0x70, 0x00, 0x64, 0x14, 0x0D, 0x0A,
];

/// Line-oriented byte source yielding one raw record per call
///
/// Errors returned here are source failures only: `Io`, `Timeout` or
/// `EndOfStream`.
pub trait RecordSource {
    fn read_record(&mut self) -> Result<Vec<u8>>;
}

/// Reads newline-terminated records from any buffered reader
///
/// Works for log replays, stdin and serial device nodes opened as files.
/// Bytes received before a read timeout are kept and completed by the next
/// call, so a retried read never splits a record.
pub struct LineSource<R: BufRead> {
    reader: R,
    pending: Vec<u8>,
    pub records_read: u64,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            records_read: 0,
        }
    }

    /// Bytes of a record still waiting for its terminator
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> RecordSource for LineSource<R> {
    fn read_record(&mut self) -> Result<Vec<u8>> {
        // read_until leaves already received bytes in `pending` on error
        let read = self
            .reader
            .read_until(b'\n', &mut self.pending)
            .map_err(NmeaError::from_source_io)?;
        if read == 0 && self.pending.is_empty() {
            return Err(NmeaError::EndOfStream);
        }
        let line = std::mem::take(&mut self.pending);
        self.records_read += 1;
        log::trace!("record {}: {:?}", self.records_read, String::from_utf8_lossy(&line));
        Ok(line)
    }
}

/// Scripted source: pops queued records, then reports end of stream
impl RecordSource for VecDeque<Vec<u8>> {
    fn read_record(&mut self) -> Result<Vec<u8>> {
        self.pop_front().ok_or(NmeaError::EndOfStream)
    }
}

/// Write a binary receiver command unchanged
pub fn send_command<W: Write>(writer: &mut W, command: &[u8]) -> Result<()> {
    writer.write_all(command)?;
    writer.flush()?;
    Ok(())
}
