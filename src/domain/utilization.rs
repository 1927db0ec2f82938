//! GPU engine and memory-bandwidth utilization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Utilization percentages over the last sampling window.
///
/// `memory` is bandwidth activity, not allocation. Values are carried exactly
/// as the driver reports them; anything outside 0-100 is driver misbehavior
/// and is not clamped here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilization {
    /// Graphics/compute engine activity percentage
    pub gpu: u32,
    /// Memory bandwidth activity percentage
    pub memory: u32,
}

impl Utilization {
    pub fn new(gpu: u32, memory: u32) -> Self {
        Self { gpu, memory }
    }
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPU {}%, Memory {}%", self.gpu, self.memory)
    }
}
