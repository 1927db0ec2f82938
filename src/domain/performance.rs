//! Performance state, compute mode, and MIG mode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Performance state P0 (maximum) through P15 (minimum).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PerformanceState(u32);

impl PerformanceState {
    pub const fn from_raw(state: u32) -> Self {
        Self(state)
    }

    #[inline]
    pub const fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PerformanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Device compute mode, controlling context admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputeMode {
    Default,
    ExclusiveThread,
    Prohibited,
    ExclusiveProcess,
    /// A mode value this library does not recognize
    Unknown(u32),
}

impl ComputeMode {
    pub fn from_raw(mode: u32) -> Self {
        match mode {
            0 => Self::Default,
            1 => Self::ExclusiveThread,
            2 => Self::Prohibited,
            3 => Self::ExclusiveProcess,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for ComputeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::ExclusiveThread => write!(f, "Exclusive Thread"),
            Self::Prohibited => write!(f, "Prohibited"),
            Self::ExclusiveProcess => write!(f, "Exclusive Process"),
            Self::Unknown(v) => write!(f, "Unknown ({})", v),
        }
    }
}

/// Current and pending MIG enablement.
///
/// The pending value takes effect at the next GPU reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigMode {
    pub current_enabled: bool,
    pub pending_enabled: bool,
}

impl MigMode {
    pub fn from_raw(current: u32, pending: u32) -> Self {
        Self {
            current_enabled: current != 0,
            pending_enabled: pending != 0,
        }
    }
}

impl fmt::Display for MigMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |enabled: bool| if enabled { "Enabled" } else { "Disabled" };
        write!(
            f,
            "{} (pending: {})",
            state(self.current_enabled),
            state(self.pending_enabled)
        )
    }
}
