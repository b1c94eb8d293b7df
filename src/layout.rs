//! Mapping of a snapshot onto the road diagram.
//!
//! The diagram's x axis runs along the road, in m from its start. The y axis is
//! dimensionless: vehicles sit just above (up) or below (down) the centre line
//! and pedestrians stack upwards from the top edge of their crossing.

use crate::error::{Error, Result};
use crate::math::Point2d;
use crate::snapshot::{Direction, Snapshot};
use crate::Scenario;
use itertools::{Either, Itertools};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Parameters of the road diagram layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// The vertical spacing between pedestrians stacked at the same crossing.
    pub gap: f64,
    /// The half height of a crossing; pedestrians stack above it.
    pub width: f64,
    /// The vertical separation of the two traffic lanes.
    pub road_width: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            gap: 0.1,
            width: 0.4,
            road_width: 0.15,
        }
    }
}

/// The positions of everything in one frame of the road diagram.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    /// The pedestrians, in snapshot order.
    pub pedestrians: Vec<Point2d>,
    /// The vehicles travelling up the road.
    pub vehicles_up: Vec<Point2d>,
    /// The vehicles travelling down the road.
    pub vehicles_down: Vec<Point2d>,
    /// The simulation clock.
    pub clock: ClockTime,
}

/// A time of day on the simulation clock.
///
/// Wraps around every 24 simulated hours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl ClockTime {
    /// Converts milliseconds since the start of the simulation to a clock time.
    pub fn from_millis(ms: u64) -> Self {
        Self {
            hours: (ms / 3_600_000) % 24,
            minutes: (ms / 60_000) % 60,
            seconds: (ms / 1000) % 60,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}h{:02}m{:02}s",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Lays out the pedestrians and vehicles of a snapshot on the road diagram.
///
/// Pedestrians at the same crossing are stacked upwards in the order they
/// appear in the snapshot.
pub fn layout(snapshot: &Snapshot, scenario: &Scenario, params: &LayoutParams) -> Result<Layout> {
    // Running stack height at each crossing position
    let mut stacks: SmallVec<[(f64, f64); 8]> = SmallVec::new();

    let pedestrians = snapshot
        .pedestrians
        .iter()
        .map(|ped| -> Result<Point2d> {
            let x = scenario
                .crossing(ped.location)
                .ok_or_else(|| Error::InvalidLocation {
                    timestamp: snapshot.timestamp,
                    location: ped.location,
                    crossings: scenario.zebra_crossings.len(),
                })?;
            let y = match stacks.iter_mut().find(|(pos, _)| *pos == x) {
                Some((_, height)) => {
                    *height += params.gap;
                    *height
                }
                None => {
                    let height = params.gap + params.width;
                    stacks.push((x, height));
                    height
                }
            };
            Ok(Point2d::new(x, y))
        })
        .collect::<Result<Vec<_>>>()?;

    let lane = 0.5 * params.road_width;
    let (vehicles_up, vehicles_down) =
        snapshot
            .vehicles
            .iter()
            .partition_map(|vehicle| match vehicle.direction {
                Direction::Up => Either::Left(Point2d::new(vehicle.position, lane)),
                Direction::Down => Either::Right(Point2d::new(
                    scenario.road_length - vehicle.position,
                    -lane,
                )),
            });

    Ok(Layout {
        pedestrians,
        vehicles_up,
        vehicles_down,
        clock: ClockTime::from_millis(snapshot.timestamp),
    })
}
