//! Record definitions
//!
//! Positions, waypoints and the record lines that carry them.
//!
//! ## Record Line Format
//! ```text
//! P<owner>,<lat>,<lon>,<alt>,<speed>,<bearing>
//! W<owner>,<lat>,<lon>,<alt>,<name>
//! G<group name>
//! ```
//!
//! Numeric slots that do not parse as numbers are kept as the raw token.

use std::fmt;

use crate::error::{GlsError, Result};
use super::command::check_separators;
use super::ReplyTag;

/// A numeric slot of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Number(f64),
    /// Token the server sent that is not a number
    Text(String),
}

impl Field {
    /// Parse a wire token, keeping it verbatim if it is not numeric
    pub fn parse(token: &str) -> Self {
        match token.trim().parse::<f64>() {
            Ok(value) => Field::Number(value),
            Err(_) => Field::Text(token.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Field::Number(value) => Some(*value),
            Field::Text(_) => None,
        }
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Number(value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(value) => write!(f, "{}", value),
            Field::Text(raw) => f.write_str(raw),
        }
    }
}

// =============================================================================
// Position
// =============================================================================

/// GPS position of one participant
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub latitude: Field,
    pub longitude: Field,
    pub altitude: Field,
    pub speed: Field,
    pub bearing: Field,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, altitude: f64, speed: f64, bearing: f64) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            altitude: altitude.into(),
            speed: speed.into(),
            bearing: bearing.into(),
        }
    }

    /// Latitude and longitude, if both are numeric
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude.as_f64()?, self.longitude.as_f64()?))
    }

    /// `lat,lon,alt,speed,bearing`
    pub fn to_payload(&self) -> Result<String> {
        let fields = [
            &self.latitude,
            &self.longitude,
            &self.altitude,
            &self.speed,
            &self.bearing,
        ];
        join_fields(&fields)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat {} lon {} alt {} speed {} bearing {}",
            self.latitude, self.longitude, self.altitude, self.speed, self.bearing
        )
    }
}

// =============================================================================
// Waypoint
// =============================================================================

/// Named waypoint shared with the group
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub latitude: Field,
    pub longitude: Field,
    pub altitude: Field,
    pub name: String,
}

impl Waypoint {
    pub fn new(latitude: f64, longitude: f64, altitude: f64, name: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            altitude: altitude.into(),
            name: name.into(),
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude.as_f64()?, self.longitude.as_f64()?))
    }

    /// `lat,lon,alt,name`
    pub fn to_payload(&self) -> Result<String> {
        check_separators("waypoint name", &self.name)?;
        let numbers = join_fields(&[&self.latitude, &self.longitude, &self.altitude])?;
        Ok(format!("{},{}", numbers, self.name))
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (lat {} lon {} alt {})",
            self.name, self.latitude, self.longitude, self.altitude
        )
    }
}

fn join_fields(fields: &[&Field]) -> Result<String> {
    let mut payload = String::new();
    for (i, field) in fields.iter().enumerate() {
        if let Field::Text(raw) = field {
            check_separators("record field", raw)?;
        }
        if i > 0 {
            payload.push(',');
        }
        payload.push_str(&field.to_string());
    }
    Ok(payload)
}

// =============================================================================
// Record Line Decoding
// =============================================================================

/// Strip the expected tag from a record line
fn strip_tag(line: &str, expected: ReplyTag) -> Result<&str> {
    match line.strip_prefix(expected.as_char()) {
        Some(body) => Ok(body),
        None => Err(GlsError::Protocol(format!(
            "expected a '{}' record, got {:?}",
            expected.as_char(),
            line
        ))),
    }
}

/// `G<name>` → group name
pub fn parse_group_record(line: &str) -> Result<String> {
    strip_tag(line, ReplyTag::Group).map(str::to_string)
}

/// `P<owner>,<lat>,<lon>,<alt>,<speed>,<bearing>` → (owner, position)
///
/// Tokens past the bearing are ignored.
pub fn parse_position_record(line: &str) -> Result<(String, Position)> {
    let body = strip_tag(line, ReplyTag::Position)?;
    let tokens: Vec<&str> = body.split(',').collect();
    if tokens.len() < 6 {
        return Err(GlsError::Protocol(format!(
            "position record needs owner and 5 fields, got {:?}",
            line
        )));
    }

    let position = Position {
        latitude: Field::parse(tokens[1]),
        longitude: Field::parse(tokens[2]),
        altitude: Field::parse(tokens[3]),
        speed: Field::parse(tokens[4]),
        bearing: Field::parse(tokens[5]),
    };
    Ok((tokens[0].to_string(), position))
}

/// `W<owner>,<lat>,<lon>,<alt>,<name>` → (owner, waypoint)
///
/// The name is the rest of the line and is never parsed as a number.
pub fn parse_waypoint_record(line: &str) -> Result<(String, Waypoint)> {
    let body = strip_tag(line, ReplyTag::Waypoint)?;
    let tokens: Vec<&str> = body.splitn(5, ',').collect();
    if tokens.len() < 5 {
        return Err(GlsError::Protocol(format!(
            "waypoint record needs owner and 4 fields, got {:?}",
            line
        )));
    }

    let waypoint = Waypoint {
        latitude: Field::parse(tokens[1]),
        longitude: Field::parse(tokens[2]),
        altitude: Field::parse(tokens[3]),
        name: tokens[4].to_string(),
    };
    Ok((tokens[0].to_string(), waypoint))
}
