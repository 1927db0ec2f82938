//! Driver-level versions and the full system snapshot.

use crate::domain::gpu::GpuStatus;
use crate::domain::process::GpuProcess;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// CUDA driver version in NVML's packed integer encoding.
///
/// The native value packs major and minor as `major * 1000 + minor * 10`,
/// so 12040 reads as CUDA 12.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CudaVersion(i32);

impl CudaVersion {
    pub const fn from_raw(version: i32) -> Self {
        Self(version)
    }

    #[inline]
    pub const fn as_raw(&self) -> i32 {
        self.0
    }

    pub const fn major(&self) -> i32 {
        self.0 / 1000
    }

    pub const fn minor(&self) -> i32 {
        (self.0 % 1000) / 10
    }
}

impl fmt::Display for CudaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Driver, NVML, and CUDA versions gathered in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_version: String,
    pub nvml_version: String,
    pub cuda_version: CudaVersion,
}

impl fmt::Display for DriverInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Driver {} | NVML {} | CUDA {}",
            self.driver_version, self.nvml_version, self.cuda_version
        )
    }
}

/// Point-in-time view of the whole system.
///
/// Assembled in a fixed order: driver info first, then every GPU's status,
/// then per-GPU process lists. The queries are not atomic; the capture
/// timestamp is taken once, between the status and process phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub driver: DriverInfo,
    pub gpus: Vec<GpuStatus>,
    /// Process lists indexed parallel to `gpus`
    pub processes: Vec<Vec<GpuProcess>>,
    pub captured_at: SystemTime,
}
