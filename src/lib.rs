//! Animation and transit-time analysis of recorded zebra crossing simulations.
//!
//! The simulator records one [Snapshot] per tick as a line of JSON, alongside the
//! TOML [Scenario] it was run against. This crate lays those snapshots out on a
//! road diagram, animates them, and reconstructs when each vehicle arrived and left.

pub use cgmath;
pub use error::{Error, Result};
pub use layout::{layout, ClockTime, Layout, LayoutParams};
pub use render::{render, Animation, AnimationParams, Animator, FrameSink};
pub use scenario::Scenario;
pub use snapshot::{
    load_snapshots, load_snapshots_from_file, Direction, Pedestrian, Snapshot, Vehicle, VehicleId,
};
pub use transit::{analyze, TransitRecord, TransitTable};
pub use util::Interval;

mod error;
mod layout;
pub mod math;
pub mod render;
mod scenario;
mod snapshot;
mod transit;
mod util;
