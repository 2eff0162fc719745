//! # MediMap Types
//!
//! Small validated value types shared by the core engines, the REST API and the CLI.
//!
//! Every type here can only be constructed in a valid state, so code holding one never has to
//! re-check it:
//! - [`NonEmptyText`]: trimmed text with at least one visible character
//! - [`Level`]: an integer in `1..=4` (triage severity or hospital care level)
//! - [`Coordinate`]: a finite latitude/longitude pair inside the WGS84 ranges

use std::fmt;

/// Errors that can occur when creating validated value types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypesError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    EmptyText,

    /// A level outside `1..=4`.
    #[error("level must be between 1 and 4, got {0}")]
    LevelOutOfRange(i64),

    /// Latitude not finite or outside `[-90, 90]`.
    #[error("latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),

    /// Longitude not finite or outside `[-180, 180]`.
    #[error("longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, trimming the input first.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::EmptyText`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// An integer level in `1..=4`.
///
/// The same scale is used for triage severity (1 = lowest urgency, 4 = highest) and for
/// hospital care level (1 = primary, 4 = quaternary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    pub const MIN: Level = Level(1);
    pub const MAX: Level = Level(4);

    /// All levels in ascending order.
    pub const ALL: [Level; 4] = [Level(1), Level(2), Level(3), Level(4)];

    /// Creates a level from any integer.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::LevelOutOfRange`] unless `1 <= value <= 4`.
    pub fn new(value: i64) -> Result<Self, TypesError> {
        match value {
            1..=4 => Ok(Self(value as u8)),
            other => Err(TypesError::LevelOutOfRange(other)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Levels from `self` up to [`Level::MAX`], inclusive.
    pub fn and_above(self) -> impl Iterator<Item = Level> {
        (self.0..=Self::MAX.0).map(Level)
    }
}

impl TryFrom<u8> for Level {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Level::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A validated WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// # Errors
    ///
    /// Returns an error if either component is non-finite or out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, TypesError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(TypesError::LatitudeOutOfRange(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(TypesError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

impl<'de> serde::Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            lat: f64,
            lng: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.lat, raw.lng).map_err(serde::de::Error::custom)
    }
}
