//! Loading recorded simulation snapshots.
//!
//! The simulator writes one JSON record per simulated tick, one record per line.

use crate::error::{Error, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// The state of the simulation at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Milliseconds since the start of the simulation.
    #[serde(deserialize_with = "number_or_string")]
    pub timestamp: u64,
    /// The pedestrians at the crossings.
    pub pedestrians: Vec<Pedestrian>,
    /// The vehicles on the road.
    pub vehicles: Vec<Vehicle>,
}

/// A pedestrian waiting at or crossing the road.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pedestrian {
    /// Index of the zebra crossing the pedestrian is at.
    #[serde(deserialize_with = "number_or_string")]
    pub location: usize,
}

/// A vehicle travelling along the road.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// The vehicle's ID, stable for as long as the vehicle is on the road.
    pub id: VehicleId,
    /// Distance travelled along the road in the vehicle's direction, in m.
    #[serde(deserialize_with = "number_or_string")]
    pub position: f64,
    /// The direction of travel.
    pub direction: Direction,
}

/// The direction a vehicle travels along the road.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Travelling away from the start of the road.
    Up,
    /// Travelling away from the end of the road.
    Down,
}

/// Unique ID of a [Vehicle] among the vehicles present at once.
///
/// The simulator emits integer IDs but string IDs are accepted too.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VehicleId {
    Num(u64),
    Str(String),
}

impl From<u64> for VehicleId {
    fn from(id: u64) -> Self {
        VehicleId::Num(id)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        VehicleId::Str(id.to_owned())
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleId::Num(id) => write!(f, "{}", id),
            VehicleId::Str(id) => f.write_str(id),
        }
    }
}

impl Snapshot {
    /// Parses a single snapshot record.
    pub fn from_json(record: &str) -> Result<Self> {
        parse_line(record, 1)
    }
}

/// Loads snapshots from a line-delimited JSON source, preserving their order.
///
/// Blank lines are skipped. Malformed lines abort loading with the offending line number.
pub fn load_snapshots(reader: impl BufRead) -> Result<Vec<Snapshot>> {
    let mut snapshots = vec![];
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        snapshots.push(parse_line(&line, idx + 1)?);
    }
    Ok(snapshots)
}

/// Loads snapshots from a line-delimited JSON file.
pub fn load_snapshots_from_file(path: impl AsRef<Path>) -> Result<Vec<Snapshot>> {
    let path = path.as_ref();
    let snapshots = load_snapshots(BufReader::new(File::open(path)?))?;
    log::info!("Loaded {} snapshots from {}", snapshots.len(), path.display());
    Ok(snapshots)
}

fn parse_line(line: &str, line_no: usize) -> Result<Snapshot> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|source| Error::Parse { line: line_no, source })?;
    serde_json::from_value(value).map_err(|source| Error::MissingField { line: line_no, source })
}

/// Deserializes a number which may have been written as a JSON string.
fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Num(T),
        Str(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_record() {
        let snapshot = Snapshot::from_json(
            r#"{"timestamp": 1500, "pedestrians": [{"location": 1}],
                "vehicles": [{"id": 3, "position": 12.5, "direction": "Down"}]}"#,
        )
        .unwrap();

        assert_eq!(snapshot.timestamp, 1500);
        assert_eq!(snapshot.pedestrians, vec![Pedestrian { location: 1 }]);
        assert_eq!(snapshot.vehicles[0].id, VehicleId::Num(3));
        assert_eq!(snapshot.vehicles[0].position, 12.5);
        assert_eq!(snapshot.vehicles[0].direction, Direction::Down);
    }

    #[test]
    fn accepts_stringly_numbers() {
        let snapshot = Snapshot::from_json(
            r#"{"timestamp": "2000", "pedestrians": [{"location": "0"}],
                "vehicles": [{"id": "a", "position": "7.25", "direction": "Up"}]}"#,
        )
        .unwrap();

        assert_eq!(snapshot.timestamp, 2000);
        assert_eq!(snapshot.pedestrians[0].location, 0);
        assert_eq!(snapshot.vehicles[0].id, VehicleId::from("a"));
        assert_eq!(snapshot.vehicles[0].position, 7.25);
    }

    #[test]
    fn preserves_order_and_skips_blank_lines() {
        let input = "{\"timestamp\": 0, \"pedestrians\": [], \"vehicles\": []}\n\
                     \n\
                     {\"timestamp\": 100, \"pedestrians\": [], \"vehicles\": []}\n";
        let snapshots = load_snapshots(input.as_bytes()).unwrap();
        let times: Vec<_> = snapshots.iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![0, 100]);
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let input = "{\"timestamp\": 0, \"pedestrians\": [], \"vehicles\": []}\n{not json";
        match load_snapshots(input.as_bytes()) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn missing_field_is_distinct_from_parse_error() {
        let input = "{\"timestamp\": 0, \"vehicles\": []}";
        match load_snapshots(input.as_bytes()) {
            Err(Error::MissingField { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected missing field error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let record = r#"{"timestamp": 0, "pedestrians": [],
            "vehicles": [{"id": 1, "position": 0, "direction": "Sideways"}]}"#;
        assert!(matches!(
            Snapshot::from_json(record),
            Err(Error::MissingField { .. })
        ));
    }
}
