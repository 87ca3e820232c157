//! Field conversion utilities for NMEA decoding
//!
//! Numeric helpers shared by the sentence decoders. Every helper takes the
//! sentence tag and field index so failures name the offending field.

use crate::error::{NmeaError, Result};
use crate::types::{UtcDate, UtcTime};

/// Parse a mandatory decimal field
pub fn parse_decimal(tag: &str, index: usize, value: &str) -> Result<f64> {
    if value.is_empty() {
        return Err(NmeaError::missing_field(tag, index));
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(NmeaError::invalid_number(tag, index, value)),
    }
}

/// Parse a mandatory unsigned integer field
pub fn parse_count(tag: &str, index: usize, value: &str) -> Result<u8> {
    if value.is_empty() {
        return Err(NmeaError::missing_field(tag, index));
    }
    value
        .parse::<u8>()
        .map_err(|_| NmeaError::invalid_number(tag, index, value))
}

/// Convert an NMEA `d..dmm.mmmm` coordinate to decimal degrees
///
/// `degree_digits` is 2 for latitude and 3 for longitude: the leading digits
/// are whole degrees and the remainder is minutes.
pub fn convert_nmea_coordinate(
    tag: &str,
    index: usize,
    value: &str,
    degree_digits: usize,
) -> Result<f64> {
    if value.is_empty() {
        return Err(NmeaError::missing_field(tag, index));
    }
    if !value.is_ascii() || value.len() <= degree_digits {
        return Err(NmeaError::invalid_number(tag, index, value));
    }

    let (degrees, minutes) = value.split_at(degree_digits);
    if !degrees.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NmeaError::invalid_number(tag, index, value));
    }
    let degrees: f64 = degrees
        .parse()
        .map_err(|_| NmeaError::invalid_number(tag, index, value))?;
    let minutes = parse_decimal(tag, index, minutes)
        .map_err(|_| NmeaError::invalid_number(tag, index, value))?;

    if !(0.0..60.0).contains(&minutes) {
        return Err(NmeaError::invalid_field(
            tag,
            index,
            format!("minutes out of range in {:?}", value),
        ));
    }

    Ok(degrees + minutes / 60.0)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Split an `hhmmss.sss` field at byte offsets 0-2, 2-4 and 4-10
pub fn split_utc_time(tag: &str, index: usize, value: &str) -> Result<UtcTime> {
    if !value.is_ascii() || value.len() < 6 {
        return Err(NmeaError::invalid_field(
            tag,
            index,
            format!("time {:?} is not hhmmss[.sss]", value),
        ));
    }

    let hours = &value[0..2];
    let minutes = &value[2..4];
    let seconds = &value[4..value.len().min(10)];

    if !is_digits(hours, 2) || !is_digits(minutes, 2) {
        return Err(NmeaError::invalid_number(tag, index, value));
    }
    let second_value = parse_decimal(tag, index, seconds)
        .map_err(|_| NmeaError::invalid_number(tag, index, value))?;

    if hours > "23" || minutes > "59" || second_value >= 61.0 {
        return Err(NmeaError::invalid_field(
            tag,
            index,
            format!("time {:?} out of range", value),
        ));
    }

    Ok(UtcTime {
        hours: hours.to_string(),
        minutes: minutes.to_string(),
        seconds: seconds.to_string(),
    })
}

/// Validate day, month and year fields and copy them unchanged
pub fn compose_utc_date(
    tag: &str,
    first_index: usize,
    day: &str,
    month: &str,
    year: &str,
) -> Result<UtcDate> {
    for (offset, value) in [day, month, year].iter().enumerate() {
        if value.is_empty() {
            return Err(NmeaError::missing_field(tag, first_index + offset));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NmeaError::invalid_number(tag, first_index + offset, value));
        }
    }

    Ok(UtcDate {
        day: day.to_string(),
        month: month.to_string(),
        year: year.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_convert_latitude() {
        let lat = convert_nmea_coordinate("$GPGGA", 2, "4230.0", 2).unwrap();
        assert!(close(lat, 42.5));

        let lat = convert_nmea_coordinate("$GPGGA", 2, "4807.038", 2).unwrap();
        assert!(close(lat, 48.0 + 7.038 / 60.0));
    }

    #[test]
    fn test_convert_longitude_uses_three_degree_digits() {
        let lon = convert_nmea_coordinate("$GPGGA", 4, "01131.000", 3).unwrap();
        assert!(close(lon, 11.0 + 31.0 / 60.0));
    }

    #[test]
    fn test_convert_rejects_garbage() {
        assert!(convert_nmea_coordinate("$GPGGA", 2, "ab30.0", 2).is_err());
        assert!(convert_nmea_coordinate("$GPGGA", 2, "42xx", 2).is_err());
        assert!(convert_nmea_coordinate("$GPGGA", 2, "42", 2).is_err());
        assert!(convert_nmea_coordinate("$GPGGA", 2, "4275.0", 2).is_err());
        assert!(matches!(
            convert_nmea_coordinate("$GPGGA", 2, "", 2),
            Err(NmeaError::MissingField { index: 2, .. })
        ));
    }

    #[test]
    fn test_split_utc_time() {
        let time = split_utc_time("$GNZDA", 1, "123519.00").unwrap();
        assert_eq!(time.to_string(), "12:35:19.00");

        let time = split_utc_time("$GNZDA", 1, "235959.1234567").unwrap();
        assert_eq!(time.seconds, "59.123");

        let time = split_utc_time("$GNZDA", 1, "010203").unwrap();
        assert_eq!(time.to_string(), "01:02:03");
    }

    #[test]
    fn test_split_utc_time_rejects_malformed() {
        assert!(split_utc_time("$GNZDA", 1, "1235").is_err());
        assert!(split_utc_time("$GNZDA", 1, "12a519.00").is_err());
        assert!(split_utc_time("$GNZDA", 1, "126019.00").is_err());
        assert!(split_utc_time("$GNZDA", 1, "1235xx.00").is_err());
    }

    #[test]
    fn test_compose_utc_date() {
        let date = compose_utc_date("$GNZDA", 2, "25", "04", "1994").unwrap();
        assert_eq!(date.to_string(), "25/04/1994");

        assert!(matches!(
            compose_utc_date("$GNZDA", 2, "25", "", "1994"),
            Err(NmeaError::MissingField { index: 3, .. })
        ));
        assert!(compose_utc_date("$GNZDA", 2, "2x", "04", "1994").is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("$GPGSV", 1, "3").unwrap(), 3);
        assert!(parse_count("$GPGSV", 1, "three").is_err());
        assert!(parse_count("$GPGSV", 1, "").is_err());
    }
}
