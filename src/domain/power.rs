//! Power draw and limit values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A power reading stored in milliwatts, the driver's native unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Power(u32);

impl Power {
    pub const fn from_milliwatts(mw: u32) -> Self {
        Self(mw)
    }

    #[inline]
    pub const fn as_milliwatts(&self) -> u32 {
        self.0
    }

    /// Reading in watts, preserving the fractional part.
    #[inline]
    pub fn watts(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}W", self.watts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watts_conversion() {
        let power = Power::from_milliwatts(150_000);
        assert!((power.watts() - 150.0).abs() < f64::EPSILON);
        assert_eq!(power.as_milliwatts(), 150_000);
    }

    #[test]
    fn test_watts_keeps_fraction() {
        let power = Power::from_milliwatts(150_500);
        assert!((power.watts() - 150.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display() {
        assert_eq!(Power::from_milliwatts(300_000).to_string(), "300.0W");
        assert_eq!(Power::from_milliwatts(87_500).to_string(), "87.5W");
    }
}
