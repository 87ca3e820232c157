//! Per-sentence field decoders
//!
//! Each decoder turns a tokenized sentence into an update for one field group
//! of the snapshot. Decoding finishes before anything is applied, so a failure
//! anywhere in a sentence leaves the snapshot untouched. Empty optional fields
//! decode to `None` and keep whatever value the snapshot already holds.

use crate::conversion::{
    compose_utc_date, convert_nmea_coordinate, parse_count, parse_decimal, split_utc_time,
};
use crate::error::{NmeaError, Result};
use crate::parser::tokenizer::{strip_checksum, Sentence, CHECKSUM_DELIMITER};
use crate::types::{
    Coordinate, FixStatus, Hemisphere, Reading, ReceiverSnapshot, SatelliteInView, UtcDate,
    UtcTime,
};

// GGA field positions
const GGA_LATITUDE: usize = 2;
const GGA_LATITUDE_HEMISPHERE: usize = 3;
const GGA_LONGITUDE: usize = 4;
const GGA_LONGITUDE_HEMISPHERE: usize = 5;
const GGA_ALTITUDE: usize = 9;

// GSA field positions
const GSA_QUALITY: usize = 2;
const GSA_FIRST_SATELLITE: usize = 3;
const GSA_PDOP: usize = 15;
const GSA_HDOP: usize = 16;
const GSA_VDOP: usize = 17;
/// Entries dropped from the end of the collected satellite run
const GSA_TRAILING_DROP: usize = 2;

// GSV field positions
const GSV_TOTAL: usize = 1;
const GSV_INDEX: usize = 2;
const GSV_FIRST_GROUP: usize = 4;
const GSV_GROUP_LEN: usize = 4;
/// Leading byte of a final field that marks a record without satellite detail
const GSV_NO_DETAIL_MARKER: char = '6';

// RMC field positions
const RMC_SPEED: usize = 7;
const RMC_COURSE: usize = 8;

// ZDA field positions
const ZDA_TIME: usize = 1;
const ZDA_DAY: usize = 2;
const ZDA_MONTH: usize = 3;
const ZDA_YEAR: usize = 4;

/// Position and altitude from a fix-data sentence
#[derive(Debug, Clone, PartialEq)]
pub struct FixDataUpdate {
    /// `None` when the receiver reports no position yet
    pub position: Option<(Coordinate, Coordinate)>,
    pub altitude: Option<f64>,
}

impl FixDataUpdate {
    pub fn apply(self, snapshot: &mut ReceiverSnapshot) {
        if let Some((latitude, longitude)) = self.position {
            snapshot.latitude = latitude;
            snapshot.longitude = longitude;
        }
        if let Some(altitude) = self.altitude {
            snapshot.altitude = altitude;
        }
    }
}

/// Fix status, satellites used and DOP values from a fix-quality sentence
#[derive(Debug, Clone, PartialEq)]
pub struct FixQualityUpdate {
    pub fix_status: FixStatus,
    /// `None` leaves the previous list in place
    pub satellites_used: Option<Vec<String>>,
    pub pdop: Option<Reading>,
    pub hdop: Option<Reading>,
    pub vdop: Option<Reading>,
}

impl FixQualityUpdate {
    pub fn apply(self, snapshot: &mut ReceiverSnapshot) {
        snapshot.fix_status = self.fix_status;
        if let Some(used) = self.satellites_used {
            snapshot.satellites_used = used;
        }
        if let Some(pdop) = self.pdop {
            snapshot.pdop = pdop;
        }
        if let Some(hdop) = self.hdop {
            snapshot.hdop = hdop;
        }
        if let Some(vdop) = self.vdop {
            snapshot.vdop = vdop;
        }
    }
}

/// One physical record of a satellite-view report
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteViewRecord {
    pub total: u8,
    pub index: u8,
    pub satellites: Vec<SatelliteInView>,
}

/// Speed and course from a velocity sentence
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityUpdate {
    pub speed: Option<Reading>,
    pub direction: Option<Reading>,
}

impl VelocityUpdate {
    pub fn apply(self, snapshot: &mut ReceiverSnapshot) {
        if let Some(speed) = self.speed {
            snapshot.speed = speed;
        }
        if let Some(direction) = self.direction {
            snapshot.direction = direction;
        }
    }
}

/// UTC time and date from a time/date sentence
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDateUpdate {
    pub time: Option<UtcTime>,
    pub date: Option<UtcDate>,
}

impl TimeDateUpdate {
    pub fn apply(self, snapshot: &mut ReceiverSnapshot) {
        if let Some(time) = self.time {
            snapshot.utc_time = time;
        }
        if let Some(date) = self.date {
            snapshot.utc_date = date;
        }
    }
}

fn optional_reading(sentence: &Sentence, index: usize) -> Option<Reading> {
    let raw = strip_checksum(sentence.field(index));
    if raw.is_empty() {
        return None;
    }
    let reading = Reading::parse(raw);
    if reading.is_unparseable() {
        log::warn!(
            "{}: field {} is not a decimal ({:?}), keeping raw text",
            sentence.tag,
            index,
            raw
        );
    }
    Some(reading)
}

fn decode_coordinate(
    sentence: &Sentence,
    value_index: usize,
    hemisphere_index: usize,
    degree_digits: usize,
    latitude: bool,
) -> Result<Coordinate> {
    let tag = sentence.tag;
    let degrees =
        convert_nmea_coordinate(tag, value_index, sentence.field(value_index), degree_digits)?;

    let letter = sentence.field(hemisphere_index);
    let hemisphere = Hemisphere::from_letter(letter)
        .filter(|h| h.is_latitude() == latitude)
        .ok_or_else(|| {
            NmeaError::invalid_field(
                tag,
                hemisphere_index,
                format!("unexpected hemisphere {:?}", letter),
            )
        })?;

    Ok(Coordinate::new(degrees, hemisphere))
}

/// Decode a fix-data (GGA) sentence
pub fn decode_gga(sentence: &Sentence) -> Result<FixDataUpdate> {
    let tag = sentence.tag;
    let lat_empty = sentence.field(GGA_LATITUDE).is_empty();
    let lon_empty = sentence.field(GGA_LONGITUDE).is_empty();

    let position = match (lat_empty, lon_empty) {
        (true, true) => None,
        (true, false) => return Err(NmeaError::missing_field(tag, GGA_LATITUDE)),
        (false, true) => return Err(NmeaError::missing_field(tag, GGA_LONGITUDE)),
        (false, false) => {
            let latitude =
                decode_coordinate(sentence, GGA_LATITUDE, GGA_LATITUDE_HEMISPHERE, 2, true)?;
            let longitude =
                decode_coordinate(sentence, GGA_LONGITUDE, GGA_LONGITUDE_HEMISPHERE, 3, false)?;
            Some((latitude, longitude))
        }
    };

    let altitude = match sentence.field(GGA_ALTITUDE) {
        "" => None,
        value => Some(parse_decimal(tag, GGA_ALTITUDE, value)?),
    };

    Ok(FixDataUpdate { position, altitude })
}

/// Decode a fix-quality (GSA) sentence
///
/// The satellite run starts after the quality code and ends at the first empty
/// field. Its last two entries are dropped.
pub fn decode_gsa(sentence: &Sentence) -> Result<FixQualityUpdate> {
    let fix_status = FixStatus::from_quality_code(sentence.field(GSA_QUALITY));

    let satellites_used = if sentence.field(GSA_FIRST_SATELLITE).is_empty() {
        None
    } else {
        let mut run: Vec<String> = Vec::new();
        for index in GSA_FIRST_SATELLITE..sentence.len() {
            let id = strip_checksum(sentence.field(index));
            if id.is_empty() {
                break;
            }
            run.push(id.to_string());
        }
        run.truncate(run.len().saturating_sub(GSA_TRAILING_DROP));
        Some(run)
    };

    Ok(FixQualityUpdate {
        fix_status,
        satellites_used,
        pdop: optional_reading(sentence, GSA_PDOP),
        hdop: optional_reading(sentence, GSA_HDOP),
        vdop: optional_reading(sentence, GSA_VDOP),
    })
}

/// True when a satellite-view record's final field starts with the no-detail marker
pub fn is_no_detail_record(sentence: &Sentence) -> bool {
    sentence.last_field().starts_with(GSV_NO_DETAIL_MARKER)
}

/// Decode one physical satellite-view (GSV) record
///
/// Groups of id, elevation, azimuth and SNR start at field 4. A group whose
/// first field carries `*` as its first or second byte is the trailing
/// signal-id/checksum slot and ends the record.
pub fn decode_gsv_record(sentence: &Sentence) -> Result<SatelliteViewRecord> {
    let tag = sentence.tag;
    let total = parse_count(tag, GSV_TOTAL, sentence.field(GSV_TOTAL))?;
    let index = parse_count(tag, GSV_INDEX, sentence.field(GSV_INDEX))?;

    if total == 0 || index == 0 || index > total {
        return Err(NmeaError::invalid_field(
            tag,
            GSV_INDEX,
            format!("record {} of {}", index, total),
        ));
    }

    let mut satellites = Vec::new();
    let mut i = GSV_FIRST_GROUP;
    while i < sentence.len() {
        let id_field = sentence.field(i);
        let terminator = id_field.starts_with(CHECKSUM_DELIMITER)
            || id_field.as_bytes().get(1) == Some(&(CHECKSUM_DELIMITER as u8));
        if terminator {
            break;
        }
        if i + GSV_GROUP_LEN > sentence.len() {
            return Err(NmeaError::missing_field(tag, sentence.len()));
        }

        let id = strip_checksum(id_field);
        if !id.is_empty() {
            let snr = strip_checksum(sentence.field(i + 3));
            satellites.push(SatelliteInView {
                id: id.to_string(),
                elevation: Reading::parse(strip_checksum(sentence.field(i + 1))),
                azimuth: Reading::parse(strip_checksum(sentence.field(i + 2))),
                snr: if snr.is_empty() {
                    None
                } else {
                    Some(Reading::parse(snr))
                },
            });
        }
        i += GSV_GROUP_LEN;
    }

    Ok(SatelliteViewRecord {
        total,
        index,
        satellites,
    })
}

/// Decode a velocity (RMC) sentence
pub fn decode_rmc(sentence: &Sentence) -> Result<VelocityUpdate> {
    Ok(VelocityUpdate {
        speed: optional_reading(sentence, RMC_SPEED),
        direction: optional_reading(sentence, RMC_COURSE),
    })
}

/// Decode a time/date (ZDA) sentence
pub fn decode_zda(sentence: &Sentence) -> Result<TimeDateUpdate> {
    let tag = sentence.tag;

    let time = match sentence.field(ZDA_TIME) {
        "" => None,
        value => Some(split_utc_time(tag, ZDA_TIME, value)?),
    };

    let day = sentence.field(ZDA_DAY);
    let month = sentence.field(ZDA_MONTH);
    let year = strip_checksum(sentence.field(ZDA_YEAR));
    let date = if day.is_empty() && month.is_empty() && year.is_empty() {
        None
    } else {
        Some(compose_utc_date(tag, ZDA_DAY, day, month, year)?)
    };

    Ok(TimeDateUpdate { time, date })
}
