//! Aggregated per-GPU records.

use crate::domain::memory::MemoryInfo;
use crate::domain::performance::PerformanceState;
use crate::domain::power::Power;
use crate::domain::utilization::Utilization;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static identity of one GPU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuInfo {
    /// Enumeration index, or -1 when the device was opened by UUID
    pub index: i32,
    pub name: String,
    pub uuid: String,
    pub pci_bus_id: String,
}

impl fmt::Display for GpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPU {}: {} ({})", self.index, self.name, self.uuid)
    }
}

/// One point-in-time telemetry reading for a GPU.
///
/// Built by a fixed sequence of queries; if any required query fails the
/// whole record fails with that query's error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuStatus {
    pub index: i32,
    pub name: String,
    pub memory: MemoryInfo,
    pub utilization: Utilization,
    /// Core temperature in degrees Celsius
    pub temperature: u32,
    pub power_usage: Power,
    pub power_limit: Power,
    /// Absent on passively cooled boards
    pub fan_speed: Option<u32>,
    pub performance_state: PerformanceState,
}

impl fmt::Display for GpuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GPU {} ({}): {} | {} | {}C | {} / {} | {}",
            self.index,
            self.name,
            self.memory,
            self.utilization,
            self.temperature,
            self.power_usage,
            self.power_limit,
            self.performance_state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_info_display() {
        let info = GpuInfo {
            index: 0,
            name: "NVIDIA GeForce RTX 4090".to_string(),
            uuid: "GPU-abc123".to_string(),
            pci_bus_id: "00000000:01:00.0".to_string(),
        };
        assert_eq!(
            info.to_string(),
            "GPU 0: NVIDIA GeForce RTX 4090 (GPU-abc123)"
        );
    }

    #[test]
    fn test_gpu_status_display_mentions_key_metrics() {
        let status = GpuStatus {
            index: 0,
            name: "Test GPU".to_string(),
            memory: MemoryInfo::new(8 * 1024 * 1024 * 1024, 6 * 1024 * 1024 * 1024, 2 * 1024 * 1024 * 1024),
            utilization: Utilization::new(75, 40),
            temperature: 55,
            power_usage: Power::from_milliwatts(150_000),
            power_limit: Power::from_milliwatts(300_000),
            fan_speed: Some(50),
            performance_state: PerformanceState::from_raw(2),
        };
        let text = status.to_string();
        assert!(text.contains("55C"));
        assert!(text.contains("150.0W"));
        assert!(text.contains("P2"));
    }
}
