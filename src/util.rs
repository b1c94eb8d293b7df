//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: Float> Interval<T> {
    /// Creates an interval with the given centre and radius.
    pub fn disc(centre: T, radius: T) -> Self {
        Self {
            min: centre - radius,
            max: centre + radius,
        }
    }

    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }

    pub fn inv_lerp(&self, value: T) -> T {
        (value - self.min) / (self.max - self.min)
    }

    /// Maps a value in this interval onto the corresponding value in `other`.
    pub fn map_to(&self, other: &Self, value: T) -> T {
        other.lerp(self.inv_lerp(value))
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

#[cfg(test)]
mod test {
    use super::Interval;

    #[test]
    fn maps_between_intervals() {
        let world = Interval::new(0.0, 200.0);
        let screen = Interval::new(50.0, 950.0);
        assert_eq!(world.map_to(&screen, 0.0), 50.0);
        assert_eq!(world.map_to(&screen, 100.0), 500.0);
        assert_eq!(world.map_to(&screen, 200.0), 950.0);
    }

    #[test]
    fn inverted_target() {
        let world = Interval::new(-1.0, 1.0);
        let screen = Interval::new(400.0, 0.0);
        assert_eq!(world.map_to(&screen, 1.0), 0.0);
        assert_eq!(world.map_to(&screen, -1.0), 400.0);
    }

    #[test]
    fn disc_and_contains() {
        let interval = Interval::disc(50.0, 5.0);
        assert_eq!(interval, Interval::new(45.0, 55.0));
        assert!(interval.contains(45.0));
        assert!(!interval.contains(55.5));
    }
}
