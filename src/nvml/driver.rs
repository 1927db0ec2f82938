//! Raw NVML call surface.
//!
//! Mirrors the native API shape: every method returns the queried value or
//! the raw NVML status code, before any error mapping or unit conversion.
//! The typed facade ([`crate::Nvml`], [`crate::Device`]) layers the
//! not-supported allowlist, context wrapping, and conversions on top. Keeping
//! this seam raw lets tests substitute an in-memory backend for the real
//! symbol-resolving implementation.

use crate::domain::{MemoryInfo, PciInfo, Utilization};
use crate::error::NvmlError;
use crate::status::{self, Status};
use std::ffi::c_void;

/// Result of a raw native call: value or untranslated status code.
pub type RawResult<T> = Result<T, Status>;

/// Opaque native reference to one physical GPU.
///
/// Borrowed from the native library; valid only while NVML stays loaded and
/// initialized. Cheap to copy and re-obtain, carries no identity guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDeviceHandle(pub(crate) usize);

impl RawDeviceHandle {
    pub(crate) fn as_ptr(self) -> *mut c_void {
        self.0 as *mut c_void
    }

    pub(crate) fn from_ptr(ptr: *mut c_void) -> Self {
        Self(ptr as usize)
    }
}

/// One undecoded process enumeration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawProcess {
    pub pid: u32,
    pub used_gpu_memory: u64,
    pub gpu_instance_id: u32,
    pub compute_instance_id: u32,
}

/// The raw query surface of the NVML library.
pub trait RawDriver: Send + Sync {
    /// Native init entry point; returns the raw status.
    fn init(&self) -> Status;
    /// Native shutdown entry point; returns the raw status.
    fn shutdown(&self) -> Status;

    fn device_count(&self) -> RawResult<u32>;
    fn device_handle_by_index(&self, index: u32) -> RawResult<RawDeviceHandle>;
    fn device_handle_by_uuid(&self, uuid: &str) -> RawResult<RawDeviceHandle>;

    fn device_name(&self, device: RawDeviceHandle) -> RawResult<String>;
    fn device_uuid(&self, device: RawDeviceHandle) -> RawResult<String>;
    fn device_memory_info(&self, device: RawDeviceHandle) -> RawResult<MemoryInfo>;
    fn device_utilization(&self, device: RawDeviceHandle) -> RawResult<Utilization>;
    /// Core GPU temperature in degrees Celsius.
    fn device_temperature(&self, device: RawDeviceHandle) -> RawResult<u32>;
    /// Current draw in milliwatts.
    fn device_power_usage(&self, device: RawDeviceHandle) -> RawResult<u32>;
    /// Enforced limit in milliwatts.
    fn device_power_limit(&self, device: RawDeviceHandle) -> RawResult<u32>;
    fn device_fan_speed(&self, device: RawDeviceHandle) -> RawResult<u32>;
    fn device_performance_state(&self, device: RawDeviceHandle) -> RawResult<u32>;
    fn device_pci_info(&self, device: RawDeviceHandle) -> RawResult<PciInfo>;
    fn device_persistence_mode(&self, device: RawDeviceHandle) -> RawResult<u32>;
    fn device_display_active(&self, device: RawDeviceHandle) -> RawResult<u32>;
    fn device_compute_mode(&self, device: RawDeviceHandle) -> RawResult<u32>;
    /// (current, pending) MIG mode settings.
    fn device_mig_mode(&self, device: RawDeviceHandle) -> RawResult<(u32, u32)>;
    /// Volatile corrected ECC error total.
    fn device_corrected_ecc_total(&self, device: RawDeviceHandle) -> RawResult<u64>;
    fn device_compute_processes(&self, device: RawDeviceHandle) -> RawResult<Vec<RawProcess>>;
    fn device_graphics_processes(&self, device: RawDeviceHandle) -> RawResult<Vec<RawProcess>>;

    fn system_process_name(&self, pid: u32) -> RawResult<String>;
    fn system_driver_version(&self) -> RawResult<String>;
    fn system_nvml_version(&self) -> RawResult<String>;
    fn system_cuda_driver_version(&self) -> RawResult<i32>;
}

/// Map a raw outcome into the typed error model, attaching query context.
pub(crate) fn required<T>(raw: RawResult<T>, context: &str) -> crate::error::Result<T> {
    raw.map_err(|code| NvmlError::from_code(code, context))
}

/// Like [`required`], but remap the not-supported status to an absent value.
///
/// Used only for the queries known to be optional (fan speed, MIG mode, ECC);
/// the allowlist is deliberately not generalized to other queries.
pub(crate) fn optional<T>(raw: RawResult<T>, context: &str) -> crate::error::Result<Option<T>> {
    match raw {
        Ok(value) => Ok(Some(value)),
        Err(status::NVML_ERROR_NOT_SUPPORTED) => Ok(None),
        Err(code) => Err(NvmlError::from_code(code, context)),
    }
}
