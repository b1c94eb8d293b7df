//! Reconstruction of vehicle arrival and exit times.

use crate::error::Result;
use crate::snapshot::{Snapshot, VehicleId};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;

/// The arrival and exit times of a single vehicle, in s.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitRecord {
    /// The vehicle's ID.
    pub id: VehicleId,
    /// The time the vehicle first appeared.
    pub arrival: f64,
    /// The time the vehicle first disappeared, if it did.
    pub exit: Option<f64>,
}

impl TransitRecord {
    /// The time the vehicle spent on the road, if it has exited.
    pub fn transit(&self) -> Option<f64> {
        self.exit.map(|exit| exit - self.arrival)
    }
}

/// The transit record of every vehicle seen in a simulation,
/// ordered by first appearance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitTable {
    records: Vec<TransitRecord>,
}

/// The lifecycle of a vehicle ID over the snapshot sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
enum VehicleState {
    Unseen,
    Present { arrival: f64 },
    Exited { arrival: f64, exit: f64 },
}

impl VehicleState {
    /// Advances the state given whether the vehicle is in the current snapshot.
    fn step(self, present: bool, time: f64) -> Self {
        use VehicleState::*;
        match (present, self) {
            (true, Unseen) => Present { arrival: time },
            (false, Present { arrival }) => Exited {
                arrival,
                exit: time,
            },
            (_, state) => state,
        }
    }
}

/// Accumulates vehicle states over a snapshot sequence.
#[derive(Default)]
struct Tracker {
    /// Every vehicle seen so far and its state, in order of first appearance.
    vehicles: Vec<(VehicleId, VehicleState)>,
    /// Maps vehicle IDs to their index in `vehicles`.
    index: HashMap<VehicleId, usize>,
    /// The indices of the vehicles currently present.
    present: Vec<usize>,
    /// The timestamp of the previously observed snapshot.
    last_timestamp: Option<u64>,
}

impl Tracker {
    fn observe(mut self, snapshot: &Snapshot) -> Self {
        if let Some(last) = self.last_timestamp {
            if snapshot.timestamp < last {
                log::warn!(
                    "Snapshot timestamps go backwards ({} ms after {} ms)",
                    snapshot.timestamp,
                    last
                );
            }
        }
        self.last_timestamp = Some(snapshot.timestamp);

        let time = snapshot.timestamp as f64 / 1000.0;
        let mut current = HashSet::with_capacity(snapshot.vehicles.len());

        for vehicle in &snapshot.vehicles {
            let idx = match self.index.get(&vehicle.id) {
                Some(idx) => *idx,
                None => {
                    let idx = self.vehicles.len();
                    self.vehicles.push((vehicle.id.clone(), VehicleState::Unseen));
                    self.index.insert(vehicle.id.clone(), idx);
                    idx
                }
            };
            let state = &mut self.vehicles[idx].1;
            if *state == VehicleState::Unseen {
                self.present.push(idx);
            }
            *state = state.step(true, time);
            current.insert(idx);
        }

        let vehicles = &mut self.vehicles;
        self.present.retain(|idx| {
            if current.contains(idx) {
                return true;
            }
            let state = &mut vehicles[*idx].1;
            *state = state.step(false, time);
            false
        });

        self
    }

    fn into_table(self) -> TransitTable {
        let records = self
            .vehicles
            .into_iter()
            .filter_map(|(id, state)| match state {
                VehicleState::Unseen => None,
                VehicleState::Present { arrival } => Some(TransitRecord {
                    id,
                    arrival,
                    exit: None,
                }),
                VehicleState::Exited { arrival, exit } => Some(TransitRecord {
                    id,
                    arrival,
                    exit: Some(exit),
                }),
            })
            .collect();
        TransitTable { records }
    }
}

/// Computes the arrival, exit and transit times of every vehicle.
///
/// A vehicle arrives at the first snapshot it appears in and exits at the first
/// later snapshot it is absent from. Once exited, later reappearances of the
/// same ID are ignored. Vehicles still present in the final snapshot have no exit.
pub fn analyze(snapshots: &[Snapshot]) -> TransitTable {
    let table = snapshots
        .iter()
        .fold(Tracker::default(), Tracker::observe)
        .into_table();
    log::debug!(
        "Analysed {} snapshots: {} vehicles, {} exited",
        snapshots.len(),
        table.len(),
        table.completed().count()
    );
    table
}

impl TransitTable {
    /// The number of vehicles in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no vehicles were seen.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records in order of arrival.
    pub fn iter(&self) -> impl Iterator<Item = &TransitRecord> {
        self.records.iter()
    }

    /// Gets the record of the vehicle with the given ID.
    pub fn get(&self, id: &VehicleId) -> Option<&TransitRecord> {
        self.records.iter().find(|record| record.id == *id)
    }

    /// Iterates over the vehicles which have exited.
    pub fn completed(&self) -> impl Iterator<Item = &TransitRecord> {
        self.records.iter().filter(|record| record.exit.is_some())
    }

    /// The mean transit time of the vehicles which have exited, in s.
    pub fn mean_transit(&self) -> Option<f64> {
        let (count, total) = self
            .records
            .iter()
            .filter_map(TransitRecord::transit)
            .fold((0usize, 0.0), |(count, total), t| (count + 1, total + t));
        (count > 0).then(|| total / count as f64)
    }

    /// Writes the table as CSV with the columns `id,arrival,exit,transit`.
    /// Missing values are written as empty cells.
    pub fn write_csv(&self, writer: impl Write) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(["id", "arrival", "exit", "transit"])?;
        for record in &self.records {
            writer.serialize(CsvRow {
                id: &record.id,
                arrival: record.arrival,
                exit: record.exit,
                transit: record.transit(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// A row of the CSV output.
#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a VehicleId,
    arrival: f64,
    exit: Option<f64>,
    transit: Option<f64>,
}

impl<'a> IntoIterator for &'a TransitTable {
    type Item = &'a TransitRecord;
    type IntoIter = std::slice::Iter<'a, TransitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for TransitTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = |value: Option<f64>| match value {
            Some(value) => format!("{:.3}", value),
            None => "NaN".to_owned(),
        };
        let rows = self
            .records
            .iter()
            .map(|record| {
                [
                    record.id.to_string(),
                    cell(Some(record.arrival)),
                    cell(record.exit),
                    cell(record.transit()),
                ]
            })
            .collect_vec();

        let header = ["id", "arrival", "exit", "transit"];
        let mut widths = header.map(str::len);
        for row in &rows {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(value.len());
            }
        }

        let line = |f: &mut fmt::Formatter<'_>, values: [&str; 4]| {
            let cells = values
                .iter()
                .zip(widths)
                .map(|(value, width)| format!("{:>width$}", value, width = width))
                .join("  ");
            writeln!(f, "{}", cells)
        };
        line(f, header)?;
        for row in &rows {
            line(f, [row[0].as_str(), &row[1], &row[2], &row[3]])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::snapshot::{Direction, Vehicle};

    fn snapshot(timestamp: u64, ids: &[u64]) -> Snapshot {
        Snapshot {
            timestamp,
            pedestrians: vec![],
            vehicles: ids
                .iter()
                .map(|&id| Vehicle {
                    id: id.into(),
                    position: 0.0,
                    direction: Direction::Up,
                })
                .collect(),
        }
    }

    #[test]
    fn state_machine() {
        use VehicleState::*;
        assert_eq!(Unseen.step(false, 1.0), Unseen);
        assert_eq!(Unseen.step(true, 1.0), Present { arrival: 1.0 });
        assert_eq!(
            Present { arrival: 1.0 }.step(true, 2.0),
            Present { arrival: 1.0 }
        );
        let exited = Exited {
            arrival: 1.0,
            exit: 3.0,
        };
        assert_eq!(Present { arrival: 1.0 }.step(false, 3.0), exited);
        assert_eq!(exited.step(true, 4.0), exited);
        assert_eq!(exited.step(false, 4.0), exited);
    }

    #[test]
    fn arrival_and_exit() {
        let table = analyze(&[
            snapshot(0, &[1]),
            snapshot(500, &[1, 2]),
            snapshot(1500, &[2]),
            snapshot(2500, &[]),
        ]);

        assert_eq!(table.len(), 2);
        let first = table.get(&VehicleId::Num(1)).unwrap();
        assert_eq!(first.arrival, 0.0);
        assert_eq!(first.exit, Some(1.5));
        assert_eq!(first.transit(), Some(1.5));
        let second = table.get(&VehicleId::Num(2)).unwrap();
        assert_eq!(second.arrival, 0.5);
        assert_eq!(second.exit, Some(2.5));
        assert_eq!(second.transit(), Some(2.0));
    }

    #[test]
    fn vehicle_present_at_end_has_no_exit() {
        let table = analyze(&[snapshot(0, &[7]), snapshot(1000, &[7, 8])]);
        assert_eq!(table.get(&VehicleId::Num(7)).unwrap().exit, None);
        assert_eq!(table.get(&VehicleId::Num(7)).unwrap().transit(), None);
        assert_eq!(table.get(&VehicleId::Num(8)).unwrap().arrival, 1.0);
        assert_eq!(table.completed().count(), 0);
        assert_eq!(table.mean_transit(), None);
    }

    #[test]
    fn reappearance_is_ignored() {
        let table = analyze(&[
            snapshot(1000, &[4]),
            snapshot(2000, &[]),
            snapshot(3000, &[4]),
            snapshot(4000, &[]),
        ]);
        let record = table.get(&VehicleId::Num(4)).unwrap();
        assert_eq!(record.arrival, 1.0);
        assert_eq!(record.exit, Some(2.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn ordered_by_first_appearance() {
        let table = analyze(&[snapshot(0, &[9, 3]), snapshot(100, &[5, 3])]);
        let ids: Vec<_> = table.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![VehicleId::Num(9), VehicleId::Num(3), VehicleId::Num(5)]);
    }

    #[test]
    fn empty_sequence() {
        let table = analyze(&[]);
        assert!(table.is_empty());
        assert_eq!(table.mean_transit(), None);

        let mut out = vec![];
        table.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,arrival,exit,transit\n");
    }

    #[test]
    fn mean_transit_over_completed() {
        let table = analyze(&[
            snapshot(0, &[1, 2, 3]),
            snapshot(1000, &[2, 3]),
            snapshot(3000, &[3]),
        ]);
        // 1 -> 1 s, 2 -> 3 s, 3 never exits
        assert_eq!(table.mean_transit(), Some(2.0));
    }

    #[test]
    fn csv_output() {
        let table = analyze(&[snapshot(0, &[1, 2]), snapshot(1500, &[2])]);
        let mut out = vec![];
        table.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,arrival,exit,transit\n1,0.0,1.5,1.5\n2,0.0,,\n"
        );
    }

    #[test]
    fn csv_quotes_awkward_ids() {
        let mut snapshot = snapshot(0, &[]);
        snapshot.vehicles.push(Vehicle {
            id: "bus, route \"7\"".into(),
            position: 0.0,
            direction: Direction::Down,
        });
        let table = analyze(&[snapshot]);
        let mut out = vec![];
        table.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,arrival,exit,transit\n\"bus, route \"\"7\"\"\",0.0,,\n"
        );
    }

    #[test]
    fn display_marks_missing_values() {
        let table = analyze(&[snapshot(0, &[1, 2]), snapshot(1500, &[2])]);
        let text = table.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("arrival"));
        assert!(lines[1].ends_with("1.500"));
        assert!(lines[2].ends_with("NaN"));
    }
}
