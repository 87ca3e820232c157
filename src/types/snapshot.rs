use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decimal field that keeps the receiver's original text
///
/// `value` is `None` when the text does not parse as a decimal. The raw text is
/// what gets displayed and exported, so `022.4` stays `022.4`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    raw: String,
    value: Option<f64>,
}

impl Reading {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            value: raw.trim().parse::<f64>().ok(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// True when the raw text could not be read as a decimal
    pub fn is_unparseable(&self) -> bool {
        self.value.is_none()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Hemisphere letter attached to a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "N" => Some(Hemisphere::North),
            "S" => Some(Hemisphere::South),
            "E" => Some(Hemisphere::East),
            "W" => Some(Hemisphere::West),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }

    pub fn is_latitude(self) -> bool {
        matches!(self, Hemisphere::North | Hemisphere::South)
    }
}

/// Unsigned decimal degrees paired with the hemisphere they are measured in
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    pub degrees: f64,
    pub hemisphere: Hemisphere,
}

impl Coordinate {
    pub fn new(degrees: f64, hemisphere: Hemisphere) -> Self {
        Self {
            degrees,
            hemisphere,
        }
    }

    /// Degrees with south and west mapped to negative values
    pub fn signed_degrees(&self) -> f64 {
        match self.hemisphere {
            Hemisphere::South | Hemisphere::West => -self.degrees,
            Hemisphere::North | Hemisphere::East => self.degrees,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} {}", self.degrees, self.hemisphere.letter())
    }
}

/// Fix quality as reported by the fix-quality (GSA) sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FixStatus {
    #[default]
    NoFix,
    Fix2D,
    Fix3D,
    Invalid,
}

impl FixStatus {
    pub fn from_quality_code(code: &str) -> Self {
        match code {
            "1" => FixStatus::NoFix,
            "2" => FixStatus::Fix2D,
            "3" => FixStatus::Fix3D,
            _ => FixStatus::Invalid,
        }
    }
}

impl fmt::Display for FixStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FixStatus::NoFix => "No fix",
            FixStatus::Fix2D => "2D fix",
            FixStatus::Fix3D => "3D fix",
            FixStatus::Invalid => "Invalid fix data",
        };
        f.write_str(text)
    }
}

/// UTC time of day as the receiver formats it, displayed as `hh:mm:ss.sss`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UtcTime {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl Default for UtcTime {
    fn default() -> Self {
        Self {
            hours: "00".to_string(),
            minutes: "00".to_string(),
            seconds: "00.000".to_string(),
        }
    }
}

impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hours, self.minutes, self.seconds)
    }
}

/// UTC calendar date, displayed as `dd/mm/yyyy`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UtcDate {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl Default for UtcDate {
    fn default() -> Self {
        Self {
            day: "01".to_string(),
            month: "01".to_string(),
            year: "1980".to_string(),
        }
    }
}

impl fmt::Display for UtcDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.day, self.month, self.year)
    }
}

/// One satellite from an assembled satellite-view report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatelliteInView {
    pub id: String,
    pub elevation: Reading,
    pub azimuth: Reading,
    /// `None` when the receiver reports no signal for this satellite
    pub snr: Option<Reading>,
}

impl SatelliteInView {
    pub fn snr_text(&self) -> &str {
        self.snr.as_ref().map(Reading::as_str).unwrap_or("--")
    }
}

/// One row of the session audit trail
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    pub utc_time: String,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub fix_status: FixStatus,
    pub pdop: Reading,
    pub hdop: Reading,
    pub vdop: Reading,
}

/// Consolidated receiver state, updated field group by field group
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverSnapshot {
    pub fix_status: FixStatus,
    pub pdop: Reading,
    pub hdop: Reading,
    pub vdop: Reading,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    /// Metres above mean sea level
    pub altitude: f64,
    /// Course over ground, degrees true
    pub direction: Reading,
    /// Speed over ground, knots
    pub speed: Reading,
    pub utc_time: UtcTime,
    pub utc_date: UtcDate,
    pub satellites_used: Vec<String>,
    pub satellites_in_view: Vec<SatelliteInView>,
    pub history: Vec<HistoryEntry>,
}

impl Default for ReceiverSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiverSnapshot {
    pub fn new() -> Self {
        Self {
            fix_status: FixStatus::NoFix,
            pdop: Reading::parse("0.0"),
            hdop: Reading::parse("0.0"),
            vdop: Reading::parse("0.0"),
            latitude: Coordinate::new(0.0, Hemisphere::North),
            longitude: Coordinate::new(0.0, Hemisphere::East),
            altitude: 0.0,
            direction: Reading::parse("000.0"),
            speed: Reading::parse("000.0"),
            utc_time: UtcTime::default(),
            utc_date: UtcDate::default(),
            satellites_used: Vec::new(),
            satellites_in_view: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Append the current time, position, fix and DOP values to `history`
    pub fn record_history(&mut self) {
        let entry = HistoryEntry {
            utc_time: self.utc_time.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            fix_status: self.fix_status,
            pdop: self.pdop.clone(),
            hdop: self.hdop.clone(),
            vdop: self.vdop.clone(),
        };
        self.history.push(entry);
    }
}

impl fmt::Display for ReceiverSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "UTC Time: {}\tUTC Date: {}", self.utc_time, self.utc_date)?;
        writeln!(
            f,
            "Fix status: {}\tPDOP: {}\tHDOP: {}\tVDOP: {}",
            self.fix_status, self.pdop, self.hdop, self.vdop
        )?;
        writeln!(
            f,
            "Latitude: {}\t\tLongitude: {}\t\tAltitude: {:.1} m",
            self.latitude, self.longitude, self.altitude
        )?;
        writeln!(f, "Direction: {}\t\t\tSpeed: {} kn", self.direction, self.speed)?;
        writeln!(f)?;
        writeln!(
            f,
            "GPS satellites used for fix: [{}]",
            self.satellites_used.join(", ")
        )?;
        writeln!(f)?;
        writeln!(f, "GPS satellites in view:")?;
        for sat in &self.satellites_in_view {
            writeln!(
                f,
                "Sat no: {}\t\tEl: {}\t\tAz: {}\t\tSNR: {}",
                sat.id,
                sat.elevation,
                sat.azimuth,
                sat.snr_text()
            )?;
        }
        Ok(())
    }
}
