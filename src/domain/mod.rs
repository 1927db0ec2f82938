//! Typed values returned by the query facade.
//!
//! Raw NVML values arrive in native units (milliwatts, bytes, integer
//! version encodings); these types own the conversions so call sites never
//! repeat them.

pub mod gpu;
pub mod memory;
pub mod pci;
pub mod performance;
pub mod power;
pub mod process;
pub mod snapshot;
pub mod utilization;

pub use gpu::{GpuInfo, GpuStatus};
pub use memory::MemoryInfo;
pub use pci::PciInfo;
pub use performance::{ComputeMode, MigMode, PerformanceState};
pub use power::Power;
pub use process::{GpuProcess, ProcessKind};
pub use snapshot::{CudaVersion, DriverInfo, SystemSnapshot};
pub use utilization::Utilization;
