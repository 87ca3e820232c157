//! Receiver state machine
//!
//! Owns the [`ReceiverSnapshot`] and applies one decoded sentence at a time.
//! Records can be pushed with [`ReceiverStateMachine::feed_record`] or pulled
//! from a [`RecordSource`] with [`ReceiverStateMachine::process_next_sentence`],
//! which keeps reading while a satellite-view report is incomplete.

use crate::error::{NmeaError, Result};
use crate::parser::satellites::SatelliteReport;
use crate::parser::sentences::{
    decode_gga, decode_gsa, decode_gsv_record, decode_rmc, decode_zda, is_no_detail_record,
};
use crate::parser::source::RecordSource;
use crate::parser::tokenizer::{strip_framing, tokenize, verify_checksum, ChecksumMode, Sentence};
use crate::types::{parse_tag, DecodeStats, ReceiverSnapshot, SentenceKind, SentenceOutcome};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decoder configuration
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderOptions {
    pub checksum: ChecksumMode,
}

enum Step {
    Done(SentenceOutcome),
    /// Satellite-view report still waiting for records
    Collecting,
}

pub struct ReceiverStateMachine {
    options: DecoderOptions,
    snapshot: ReceiverSnapshot,
    satellites: SatelliteReport,
    pub stats: DecodeStats,
}

impl Default for ReceiverStateMachine {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

impl ReceiverStateMachine {
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            options,
            snapshot: ReceiverSnapshot::new(),
            satellites: SatelliteReport::new(),
            stats: DecodeStats::default(),
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn snapshot(&self) -> &ReceiverSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> ReceiverSnapshot {
        self.snapshot
    }

    /// True while a satellite-view report is partially collected
    pub fn is_collecting(&self) -> bool {
        self.satellites.is_collecting()
    }

    /// Append the current state to the snapshot history
    pub fn log_snapshot(&mut self) {
        self.snapshot.record_history();
    }

    /// Pull records from `source` until one sentence is fully processed
    ///
    /// Only source failures are returned as `Err`. A failure in the middle of a
    /// satellite-view report discards the records collected so far.
    pub fn process_next_sentence<S: RecordSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<SentenceOutcome> {
        loop {
            let raw = match source.read_record() {
                Ok(raw) => raw,
                Err(err) => {
                    if self.satellites.is_collecting() {
                        log::warn!("Discarding partial satellite-view report: {}", err);
                        self.satellites.reset();
                    }
                    return Err(err);
                }
            };

            if let Some(outcome) = self.feed_record(&raw) {
                return Ok(outcome);
            }
        }
    }

    /// Process one raw record
    ///
    /// Returns `None` when the record belongs to a satellite-view report that
    /// needs more records before it can be applied.
    pub fn feed_record(&mut self, raw: &[u8]) -> Option<SentenceOutcome> {
        let outcome = match self.dispatch(raw) {
            Ok(Step::Collecting) => return None,
            Ok(Step::Done(outcome)) => outcome,
            Err(err) => {
                if self.satellites.is_collecting() {
                    log::warn!("Discarding partial satellite-view report after: {}", err);
                    self.satellites.reset();
                }
                SentenceOutcome::DecodeFailure(err)
            }
        };

        match &outcome {
            SentenceOutcome::Recognized(kind) => log::debug!("Applied {} sentence", kind),
            SentenceOutcome::Unrecognized { tag } => log::debug!("Ignored {}", tag),
            SentenceOutcome::DecodeFailure(NmeaError::EmptyRecord) => {
                log::debug!("Skipped empty record")
            }
            SentenceOutcome::DecodeFailure(err) => log::warn!("Decode failure: {}", err),
        }
        self.stats.record(&outcome);

        Some(outcome)
    }

    fn dispatch(&mut self, raw: &[u8]) -> Result<Step> {
        let record = strip_framing(raw)?;
        let sentence = tokenize(record)?;

        let kind = match parse_tag(sentence.tag) {
            Some((_, kind)) => kind,
            None => {
                self.abandon_report(sentence.tag);
                return Ok(Step::Done(SentenceOutcome::Unrecognized {
                    tag: sentence.tag.to_string(),
                }));
            }
        };
        if kind != SentenceKind::Gsv {
            self.abandon_report(sentence.tag);
        }

        verify_checksum(record, self.options.checksum)?;

        match kind {
            SentenceKind::Gga => decode_gga(&sentence)?.apply(&mut self.snapshot),
            SentenceKind::Gsa => decode_gsa(&sentence)?.apply(&mut self.snapshot),
            SentenceKind::Rmc => decode_rmc(&sentence)?.apply(&mut self.snapshot),
            SentenceKind::Zda => decode_zda(&sentence)?.apply(&mut self.snapshot),
            SentenceKind::Gsv => return self.step_satellite_view(&sentence),
        }

        Ok(Step::Done(SentenceOutcome::Recognized(kind)))
    }

    fn step_satellite_view(&mut self, sentence: &Sentence) -> Result<Step> {
        if is_no_detail_record(sentence) {
            self.abandon_report(sentence.tag);
            return Ok(Step::Done(SentenceOutcome::Unrecognized {
                tag: sentence.tag.to_string(),
            }));
        }

        let record = decode_gsv_record(sentence)?;
        match self.satellites.push(record)? {
            Some(satellites) => {
                self.snapshot.satellites_in_view = satellites;
                Ok(Step::Done(SentenceOutcome::Recognized(SentenceKind::Gsv)))
            }
            None => Ok(Step::Collecting),
        }
    }

    fn abandon_report(&mut self, interrupted_by: &str) {
        if self.satellites.is_collecting() {
            log::warn!(
                "Satellite-view report interrupted by {}, discarding partial report",
                interrupted_by
            );
            self.satellites.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FixStatus, Hemisphere};
    use std::collections::VecDeque;

    fn source(records: &[&str]) -> VecDeque<Vec<u8>> {
        records
            .iter()
            .map(|r| format!("{}\r\n", r).into_bytes())
            .collect()
    }

    const GSV_1: &str = "$GPGSV,3,1,10,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45,1*68";
    const GSV_2: &str = "$GPGSV,3,2,10,15,55,045,33,17,12,120,,19,37,290,28,22,42,067,42,1*68";
    const GSV_3: &str = "$GPGSV,3,3,10,24,14,311,,27,05,244,00,1*68";

    #[test]
    fn test_fix_data_updates_position() {
        let mut machine = ReceiverStateMachine::default();
        let outcome = machine
            .feed_record(b"$GPGGA,123519,4230.0,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n")
            .unwrap();

        assert!(matches!(outcome, SentenceOutcome::Recognized(SentenceKind::Gga)));
        let snapshot = machine.snapshot();
        assert!((snapshot.latitude.degrees - 42.5).abs() < 1e-9);
        assert_eq!(snapshot.latitude.hemisphere, Hemisphere::North);
        assert_eq!(snapshot.latitude.to_string(), "42.500000 N");
        assert_eq!(snapshot.altitude, 545.4);
        assert_eq!(snapshot.fix_status, FixStatus::NoFix);
    }

    #[test]
    fn test_malformed_latitude_leaves_position() {
        let mut machine = ReceiverStateMachine::default();
        machine.feed_record(b"$GPGGA,1,4230.0,N,01131.000,E,1,08,0.9,545.4,M,,,,");
        let before = machine.snapshot().clone();

        let outcome = machine
            .feed_record(b"$GPGGA,1,42x0.0,N,01000.000,E,1,08,0.9,10.0,M,,,,")
            .unwrap();

        assert!(matches!(
            outcome,
            SentenceOutcome::DecodeFailure(NmeaError::InvalidNumber { index: 2, .. })
        ));
        assert_eq!(machine.snapshot(), &before);
        assert_eq!(machine.stats.decode_failures, 1);
    }

    #[test]
    fn test_fix_quality_codes() {
        let mut machine = ReceiverStateMachine::default();
        for (code, expected) in [
            ("3", FixStatus::Fix3D),
            ("2", FixStatus::Fix2D),
            ("1", FixStatus::NoFix),
            ("5", FixStatus::Invalid),
        ] {
            let record = format!("$GNGSA,A,{},05,07,13,,,,,,,,,,1.8,1.0,1.5*2E", code);
            machine.feed_record(record.as_bytes());
            assert_eq!(machine.snapshot().fix_status, expected);
        }
    }

    #[test]
    fn test_fix_quality_replay_is_idempotent() {
        let record = b"$GNGSA,A,3,05,07,13,18,20,,,,,,,,1.8,1.0,1.5*2E";
        let mut machine = ReceiverStateMachine::default();
        machine.feed_record(record);
        let once = machine.snapshot().clone();
        machine.feed_record(record);
        assert_eq!(machine.snapshot(), &once);
        assert_eq!(once.satellites_used, vec!["05", "07", "13"]);
    }

    #[test]
    fn test_only_fix_quality_changes_fix_status() {
        let mut machine = ReceiverStateMachine::default();
        machine.feed_record(b"$GNGSA,A,3,05,07,13,,,,,,,,,,1.8,1.0,1.5");
        machine.feed_record(b"$GPGGA,123519,,,,,0,00,99.99,,,,,,*48");
        machine.feed_record(b"$GNRMC,,V,,,,,,,,,,N*4D");
        machine.feed_record(b"$GNZDA,,,,,,*56");
        assert_eq!(machine.snapshot().fix_status, FixStatus::Fix3D);
    }

    #[test]
    fn test_satellite_view_aggregation_pulls_all_records() {
        let mut machine = ReceiverStateMachine::default();
        let mut src = source(&[GSV_1, GSV_2, GSV_3]);

        let outcome = machine.process_next_sentence(&mut src).unwrap();
        assert!(matches!(outcome, SentenceOutcome::Recognized(SentenceKind::Gsv)));
        assert!(src.is_empty());

        let ids: Vec<&str> = machine
            .snapshot()
            .satellites_in_view
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec!["01", "02", "12", "14", "15", "17", "19", "22", "24", "27"]
        );
        assert_eq!(machine.snapshot().satellites_in_view[5].snr_text(), "--");
    }

    #[test]
    fn test_satellite_view_replaces_previous_list() {
        let mut machine = ReceiverStateMachine::default();
        machine
            .process_next_sentence(&mut source(&[GSV_1, GSV_2, GSV_3]))
            .unwrap();
        machine
            .process_next_sentence(&mut source(&["$GPGSV,1,1,01,31,10,100,20,1*68"]))
            .unwrap();

        let sats = &machine.snapshot().satellites_in_view;
        assert_eq!(sats.len(), 1);
        assert_eq!(sats[0].id, "31");
    }

    #[test]
    fn test_partial_report_is_never_visible() {
        let mut machine = ReceiverStateMachine::default();
        assert!(machine.feed_record(GSV_1.as_bytes()).is_none());
        assert!(machine.feed_record(GSV_2.as_bytes()).is_none());
        assert!(machine.snapshot().satellites_in_view.is_empty());
        assert!(machine.is_collecting());
    }

    #[test]
    fn test_source_failure_aborts_aggregation() {
        let mut machine = ReceiverStateMachine::default();
        let mut src = source(&[GSV_1, GSV_2]);

        let err = machine.process_next_sentence(&mut src).unwrap_err();
        assert!(matches!(err, NmeaError::EndOfStream));
        assert!(err.is_source_failure());
        assert!(!machine.is_collecting());
        assert!(machine.snapshot().satellites_in_view.is_empty());

        // a later complete report starts from scratch
        let outcome = machine
            .process_next_sentence(&mut source(&[GSV_1, GSV_2, GSV_3]))
            .unwrap();
        assert!(outcome.is_recognized());
        assert_eq!(machine.snapshot().satellites_in_view.len(), 10);
    }

    /// Replays scripted reads, including source errors
    struct ScriptedReads(VecDeque<Result<Vec<u8>>>);

    impl RecordSource for ScriptedReads {
        fn read_record(&mut self) -> Result<Vec<u8>> {
            self.0.pop_front().unwrap_or(Err(NmeaError::EndOfStream))
        }
    }

    #[test]
    fn test_timeout_mid_report_discards_partial_report() {
        let mut machine = ReceiverStateMachine::default();
        let mut src = ScriptedReads(VecDeque::from(vec![
            Ok(GSV_1.as_bytes().to_vec()),
            Err(NmeaError::Timeout),
            Ok(GSV_2.as_bytes().to_vec()),
        ]));

        let err = machine.process_next_sentence(&mut src).unwrap_err();
        assert!(matches!(err, NmeaError::Timeout));
        assert!(err.is_source_failure());
        assert!(!machine.is_collecting());
        assert_eq!(machine.stats.total(), 0);

        // the report cannot resume from record 2
        let outcome = machine.process_next_sentence(&mut src).unwrap();
        assert!(matches!(
            outcome,
            SentenceOutcome::DecodeFailure(NmeaError::SatelliteSequence(_))
        ));
        assert!(machine.snapshot().satellites_in_view.is_empty());
    }

    #[test]
    fn test_no_detail_record_discards_partial_report() {
        let mut machine = ReceiverStateMachine::default();
        machine
            .process_next_sentence(&mut source(&[GSV_1, GSV_2, GSV_3]))
            .unwrap();
        let before = machine.snapshot().satellites_in_view.clone();

        assert!(machine.feed_record(GSV_1.as_bytes()).is_none());
        assert!(machine.is_collecting());

        let outcome = machine.feed_record(b"$GPGSV,1,1,00,6*65").unwrap();
        assert!(matches!(outcome, SentenceOutcome::Unrecognized { .. }));
        assert!(!machine.is_collecting());

        let outcome = machine.feed_record(GSV_2.as_bytes()).unwrap();
        assert!(matches!(
            outcome,
            SentenceOutcome::DecodeFailure(NmeaError::SatelliteSequence(_))
        ));
        assert_eq!(machine.snapshot().satellites_in_view, before);
    }

    #[test]
    fn test_interrupting_sentence_is_still_applied() {
        let mut machine = ReceiverStateMachine::default();
        let mut src = source(&[GSV_1, "$GNRMC,1,A,,,,,010.0,090.0,,,,A", GSV_3]);

        let outcome = machine.process_next_sentence(&mut src).unwrap();
        assert!(matches!(outcome, SentenceOutcome::Recognized(SentenceKind::Rmc)));
        assert_eq!(machine.snapshot().speed.as_str(), "010.0");
        assert!(!machine.is_collecting());

        let outcome = machine.process_next_sentence(&mut src).unwrap();
        assert!(matches!(
            outcome,
            SentenceOutcome::DecodeFailure(NmeaError::SatelliteSequence(_))
        ));
        assert!(machine.snapshot().satellites_in_view.is_empty());
    }

    #[test]
    fn test_no_detail_record_is_unrecognized() {
        let mut machine = ReceiverStateMachine::default();
        let before = machine.snapshot().clone();
        let outcome = machine.feed_record(b"$GPGSV,1,1,00,6*65\r\n").unwrap();
        assert!(matches!(outcome, SentenceOutcome::Unrecognized { .. }));
        assert_eq!(machine.snapshot(), &before);
    }

    #[test]
    fn test_unknown_tag_changes_nothing() {
        let mut machine = ReceiverStateMachine::default();
        let before = machine.snapshot().clone();
        let outcome = machine.feed_record(b"$GPXXX,1,2,3*00").unwrap();
        match outcome {
            SentenceOutcome::Unrecognized { tag } => assert_eq!(tag, "$GPXXX"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(machine.snapshot(), &before);
        assert_eq!(machine.stats.unrecognized, 1);
    }

    #[test]
    fn test_time_then_velocity_end_to_end() {
        let mut machine = ReceiverStateMachine::default();
        let mut src = source(&[
            "$GNZDA,123519.00,25,04,1994,,,*xx",
            "$GNRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A",
        ]);
        machine.process_next_sentence(&mut src).unwrap();
        machine.process_next_sentence(&mut src).unwrap();

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.utc_time.to_string(), "12:35:19.00");
        assert_eq!(snapshot.utc_date.to_string(), "25/04/1994");
        assert_eq!(snapshot.speed.as_str(), "022.4");
        assert_eq!(snapshot.direction.as_str(), "084.4");
        assert_eq!(machine.stats.recognized, 2);
    }

    #[test]
    fn test_empty_record_is_decode_failure() {
        let mut machine = ReceiverStateMachine::default();
        let outcome = machine.feed_record(b"\r\n").unwrap();
        assert!(matches!(
            outcome,
            SentenceOutcome::DecodeFailure(NmeaError::EmptyRecord)
        ));
    }

    #[test]
    fn test_checksum_mode_required() {
        let mut machine = ReceiverStateMachine::new(DecoderOptions {
            checksum: ChecksumMode::Required,
        });
        let good = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        assert!(machine.feed_record(good).unwrap().is_recognized());

        let bad = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,999.9,M,46.9,M,,*47";
        assert!(matches!(
            machine.feed_record(bad).unwrap(),
            SentenceOutcome::DecodeFailure(NmeaError::ChecksumMismatch { .. })
        ));
        assert_eq!(machine.snapshot().altitude, 545.4);
    }

    #[test]
    fn test_log_snapshot_appends_history() {
        let mut machine = ReceiverStateMachine::default();
        machine.feed_record(b"$GNZDA,123519.00,25,04,1994,,,*xx");
        machine.log_snapshot();
        machine.log_snapshot();

        let history = &machine.snapshot().history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].utc_time, "12:35:19.00");
    }
}
