//! NMEA Monitor Library
//!
//! A streaming decoder for NMEA-0183 GNSS sentences. It keeps one consolidated
//! receiver snapshot (position, fix quality, satellites, UTC time/date,
//! speed/course) up to date from records that arrive one line at a time.
//!
//! # Features
//!
//! - **`csv`** (default): Enable CSV export of the session history
//! - **`cli`** (default): Build the `nmea_monitor` command-line binary
//! - **`json`**: Enable history export in JSON format
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! Replay a captured log through the state machine:
//! ```rust,no_run
//! use nmea_monitor::{DecoderOptions, LineSource, NmeaError, ReceiverStateMachine};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("capture.nmea").unwrap();
//! let mut source = LineSource::new(BufReader::new(file));
//! let mut machine = ReceiverStateMachine::new(DecoderOptions::default());
//!
//! loop {
//!     match machine.process_next_sentence(&mut source) {
//!         Ok(_) => {}
//!         Err(NmeaError::EndOfStream) => break,
//!         Err(e) => panic!("source failed: {}", e),
//!     }
//! }
//! println!("{}", machine.snapshot());
//! ```
//!
//! Export the history at the end of a session:
//! ```rust,no_run
//! use nmea_monitor::{export_session, ExportOptions, ReceiverStateMachine};
//!
//! let mut machine = ReceiverStateMachine::default();
//! machine.feed_record(b"$GNZDA,123519.00,25,04,1994,,,*xx\r\n");
//! machine.log_snapshot();
//!
//! let report = export_session(machine.snapshot(), &ExportOptions::default()).unwrap();
//! if let Some(path) = report.csv_path {
//!     println!("Exported {} rows to: {}", report.rows, path.display());
//! }
//! ```
//!
//! # Public API
//!
//! ## Decoding
//! - [`ReceiverStateMachine`] - Owns the snapshot and dispatches sentences
//! - [`tokenize`] / [`strip_framing`] - Stateless record tokenizer
//! - [`SatelliteReport`] - Multi-record satellite-view accumulator
//! - [`RecordSource`] / [`LineSource`] - Line-oriented byte source
//!
//! ## Data Types
//! - [`ReceiverSnapshot`] - Consolidated receiver state and history
//! - [`SentenceOutcome`] - Per-sentence result: recognized, unrecognized or decode failure
//! - [`NmeaError`] - Decode, source and export failures
//!
//! ## Export Functions
//! - [`history_rows`] - Map history to the seven-column table
//! - [`export_session`] - Write every enabled export format

// Module declarations
pub mod conversion;
pub mod error;
pub mod export;
pub mod parser;
pub mod types;

// Re-export everything from modules for convenience
#[allow(ambiguous_glob_reexports)]
pub use conversion::*;
pub use error::{NmeaError, Result};
#[allow(ambiguous_glob_reexports)]
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use parser::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;
