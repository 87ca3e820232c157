//! Satellite-view report assembly
//!
//! A satellite-view report is split across `total` physical records numbered
//! `1..=total`. [`SatelliteReport`] collects them one record at a time and only
//! hands out the satellite list once the last record arrived, so a partial
//! report never reaches the snapshot.

use crate::error::{NmeaError, Result};
use crate::parser::sentences::SatelliteViewRecord;
use crate::types::SatelliteInView;

/// Accumulator state for a multi-record satellite-view report
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SatelliteReport {
    #[default]
    Idle,
    Collecting {
        expected_total: u8,
        next_index: u8,
        satellites: Vec<SatelliteInView>,
    },
}

impl SatelliteReport {
    pub fn new() -> Self {
        SatelliteReport::Idle
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self, SatelliteReport::Collecting { .. })
    }

    /// Discard any partially collected report
    pub fn reset(&mut self) {
        *self = SatelliteReport::Idle;
    }

    /// Advance with one record
    ///
    /// Returns the full satellite list when `record` completes the report,
    /// `None` while more records are expected. A record out of sequence
    /// discards the partial report.
    pub fn push(&mut self, record: SatelliteViewRecord) -> Result<Option<Vec<SatelliteInView>>> {
        let SatelliteViewRecord {
            total,
            index,
            satellites,
        } = record;

        let collected = match std::mem::take(self) {
            SatelliteReport::Idle if index != 1 => {
                return Err(NmeaError::SatelliteSequence(format!(
                    "report starts at record {} of {}",
                    index, total
                )));
            }
            SatelliteReport::Idle => satellites,
            SatelliteReport::Collecting { next_index, .. } if index == 1 => {
                log::warn!(
                    "Satellite-view report restarted before record {} arrived",
                    next_index
                );
                satellites
            }
            SatelliteReport::Collecting {
                expected_total,
                next_index,
                satellites: mut collected,
            } => {
                if total != expected_total || index != next_index {
                    return Err(NmeaError::SatelliteSequence(format!(
                        "expected record {} of {}, got {} of {}",
                        next_index, expected_total, index, total
                    )));
                }
                collected.extend(satellites);
                collected
            }
        };

        if index == total {
            return Ok(Some(collected));
        }

        *self = SatelliteReport::Collecting {
            expected_total: total,
            next_index: index + 1,
            satellites: collected,
        };
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reading;

    fn sat(id: &str) -> SatelliteInView {
        SatelliteInView {
            id: id.to_string(),
            elevation: Reading::parse("10"),
            azimuth: Reading::parse("100"),
            snr: None,
        }
    }

    fn record(total: u8, index: u8, ids: &[&str]) -> SatelliteViewRecord {
        SatelliteViewRecord {
            total,
            index,
            satellites: ids.iter().map(|id| sat(id)).collect(),
        }
    }

    #[test]
    fn test_single_record_report() {
        let mut report = SatelliteReport::new();
        let sats = report.push(record(1, 1, &["01", "02"])).unwrap().unwrap();
        assert_eq!(sats.len(), 2);
        assert!(!report.is_collecting());
    }

    #[test]
    fn test_three_record_report_in_order() {
        let mut report = SatelliteReport::new();
        assert_eq!(report.push(record(3, 1, &["01", "02", "03", "04"])).unwrap(), None);
        assert!(report.is_collecting());
        assert_eq!(report.push(record(3, 2, &["05", "06", "07", "08"])).unwrap(), None);
        let sats = report.push(record(3, 3, &["09", "10"])).unwrap().unwrap();

        let ids: Vec<&str> = sats.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["01", "02", "03", "04", "05", "06", "07", "08", "09", "10"]
        );
        assert_eq!(report, SatelliteReport::Idle);
    }

    #[test]
    fn test_out_of_sequence_discards_partial() {
        let mut report = SatelliteReport::new();
        report.push(record(3, 1, &["01"])).unwrap();
        assert!(matches!(
            report.push(record(3, 3, &["09"])),
            Err(NmeaError::SatelliteSequence(_))
        ));
        assert!(!report.is_collecting());
    }

    #[test]
    fn test_total_change_discards_partial() {
        let mut report = SatelliteReport::new();
        report.push(record(3, 1, &["01"])).unwrap();
        assert!(report.push(record(2, 2, &["05"])).is_err());
        assert_eq!(report, SatelliteReport::Idle);
    }

    #[test]
    fn test_mid_report_start_is_rejected() {
        let mut report = SatelliteReport::new();
        assert!(report.push(record(3, 2, &["05"])).is_err());
        assert_eq!(report, SatelliteReport::Idle);
    }

    #[test]
    fn test_restart_replaces_partial() {
        let mut report = SatelliteReport::new();
        report.push(record(2, 1, &["01"])).unwrap();
        report.push(record(2, 1, &["21"])).unwrap();
        let sats = report.push(record(2, 2, &["22"])).unwrap().unwrap();
        let ids: Vec<&str> = sats.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["21", "22"]);
    }

    #[test]
    fn test_reset() {
        let mut report = SatelliteReport::new();
        report.push(record(2, 1, &["01"])).unwrap();
        report.reset();
        assert!(!report.is_collecting());
    }
}
