//! Native struct layouts, buffer size constants, and entry point signatures.
//!
//! Everything crossing the NVML call boundary is declared here, once: the
//! `#[repr(C)]` structs must match the native ABI bit-for-bit, and each entry
//! point has exactly one `extern "C"` fn-pointer alias that every call site
//! resolves against. This module is a pure codec; it holds no business logic.

use std::os::raw::{c_char, c_int, c_uint, c_ulonglong, c_void};

/// Opaque native device handle (`nvmlDevice_t`).
pub type NvmlDevicePtr = *mut c_void;

// Text buffer sizes governed by the NVML ABI.
pub const NVML_DEVICE_NAME_BUFFER_SIZE: usize = 96;
pub const NVML_DEVICE_UUID_BUFFER_SIZE: usize = 96;
pub const NVML_SYSTEM_DRIVER_VERSION_BUFFER_SIZE: usize = 80;
pub const NVML_SYSTEM_NVML_VERSION_BUFFER_SIZE: usize = 80;
pub const NVML_PROCESS_NAME_BUFFER_SIZE: usize = 256;

// PCI bus-id buffers: the 16-byte field is the deprecated legacy form.
pub const NVML_DEVICE_PCI_BUS_ID_BUFFER_V2_SIZE: usize = 16;
pub const NVML_DEVICE_PCI_BUS_ID_BUFFER_SIZE: usize = 32;

/// Fixed capacity pre-allocated for process enumeration.
pub const NVML_MAX_PROCESS_ENTRIES: usize = 128;

// Selector constants.
pub const NVML_TEMPERATURE_GPU: c_uint = 0;
pub const NVML_MEMORY_ERROR_TYPE_CORRECTED: c_uint = 0;
pub const NVML_VOLATILE_ECC: c_uint = 0;

/// `nvmlMemory_t`: three 64-bit byte counts, in this exact order.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NvmlMemory {
    pub total: c_ulonglong,
    pub free: c_ulonglong,
    pub used: c_ulonglong,
}

/// `nvmlUtilization_t`: two unsigned percentages, 0-100 per the ABI contract.
///
/// Out-of-range values are passed through unchanged; clamping here would hide
/// native behavior.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NvmlUtilization {
    pub gpu: c_uint,
    pub memory: c_uint,
}

/// `nvmlPciInfo_t` (v3 layout).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NvmlPciInfo {
    pub bus_id_legacy: [c_char; NVML_DEVICE_PCI_BUS_ID_BUFFER_V2_SIZE],
    pub domain: c_uint,
    pub bus: c_uint,
    pub device: c_uint,
    pub pci_device_id: c_uint,
    pub pci_sub_system_id: c_uint,
    pub bus_id: [c_char; NVML_DEVICE_PCI_BUS_ID_BUFFER_SIZE],
}

impl Default for NvmlPciInfo {
    fn default() -> Self {
        Self {
            bus_id_legacy: [0; NVML_DEVICE_PCI_BUS_ID_BUFFER_V2_SIZE],
            domain: 0,
            bus: 0,
            device: 0,
            pci_device_id: 0,
            pci_sub_system_id: 0,
            bus_id: [0; NVML_DEVICE_PCI_BUS_ID_BUFFER_SIZE],
        }
    }
}

/// `nvmlProcessInfo_t` (v2 layout, shared by the _v2/_v3 process queries).
///
/// The two instance ids are meaningful only under MIG.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NvmlProcessInfo {
    pub pid: c_uint,
    pub used_gpu_memory: c_ulonglong,
    pub gpu_instance_id: c_uint,
    pub compute_instance_id: c_uint,
}

// Entry point signatures. One alias per operation; direction is encoded in
// the pointer types (out-params are `*mut`).
pub type InitFn = unsafe extern "C" fn() -> c_uint;
pub type ShutdownFn = unsafe extern "C" fn() -> c_uint;
pub type DeviceGetCountFn = unsafe extern "C" fn(*mut c_uint) -> c_uint;
pub type DeviceGetHandleByIndexFn = unsafe extern "C" fn(c_uint, *mut NvmlDevicePtr) -> c_uint;
pub type DeviceGetHandleByUuidFn = unsafe extern "C" fn(*const c_char, *mut NvmlDevicePtr) -> c_uint;
pub type DeviceGetNameFn = unsafe extern "C" fn(NvmlDevicePtr, *mut c_char, c_uint) -> c_uint;
pub type DeviceGetUuidFn = unsafe extern "C" fn(NvmlDevicePtr, *mut c_char, c_uint) -> c_uint;
pub type DeviceGetMemoryInfoFn = unsafe extern "C" fn(NvmlDevicePtr, *mut NvmlMemory) -> c_uint;
pub type DeviceGetUtilizationRatesFn =
    unsafe extern "C" fn(NvmlDevicePtr, *mut NvmlUtilization) -> c_uint;
pub type DeviceGetTemperatureFn =
    unsafe extern "C" fn(NvmlDevicePtr, c_uint, *mut c_uint) -> c_uint;
pub type DeviceGetPowerUsageFn = unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint) -> c_uint;
pub type DeviceGetPowerManagementLimitFn =
    unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint) -> c_uint;
pub type DeviceGetFanSpeedFn = unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint) -> c_uint;
pub type DeviceGetPerformanceStateFn = unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint) -> c_uint;
pub type DeviceGetPciInfoFn = unsafe extern "C" fn(NvmlDevicePtr, *mut NvmlPciInfo) -> c_uint;
pub type DeviceGetPersistenceModeFn = unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint) -> c_uint;
pub type DeviceGetDisplayActiveFn = unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint) -> c_uint;
pub type DeviceGetComputeModeFn = unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint) -> c_uint;
pub type DeviceGetMigModeFn =
    unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint, *mut c_uint) -> c_uint;
pub type DeviceGetTotalEccErrorsFn =
    unsafe extern "C" fn(NvmlDevicePtr, c_uint, c_uint, *mut c_ulonglong) -> c_uint;
pub type DeviceGetRunningProcessesFn =
    unsafe extern "C" fn(NvmlDevicePtr, *mut c_uint, *mut NvmlProcessInfo) -> c_uint;
pub type SystemGetProcessNameFn = unsafe extern "C" fn(c_uint, *mut c_char, c_uint) -> c_uint;
pub type SystemGetDriverVersionFn = unsafe extern "C" fn(*mut c_char, c_uint) -> c_uint;
pub type SystemGetNvmlVersionFn = unsafe extern "C" fn(*mut c_char, c_uint) -> c_uint;
pub type SystemGetCudaDriverVersionFn = unsafe extern "C" fn(*mut c_int) -> c_uint;

/// Decode a fixed-size C character buffer, truncating at the first NUL.
///
/// The full allocated width is never read as data. For NUL-delimited
/// multi-field buffers (process names: path plus arguments) this keeps only
/// the first field.
pub fn decode_text(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Select the valid entries from a pre-allocated process array.
///
/// Only entries with index below the returned count and a nonzero pid are
/// real; a zero pid at a sub-count index means absent, not an error.
pub fn valid_process_entries(entries: &[NvmlProcessInfo], count: u32) -> Vec<NvmlProcessInfo> {
    entries
        .iter()
        .take(count as usize)
        .filter(|p| p.pid != 0)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn test_memory_layout_matches_abi() {
        assert_eq!(mem::size_of::<NvmlMemory>(), 24);
        assert_eq!(mem::align_of::<NvmlMemory>(), 8);
    }

    #[test]
    fn test_utilization_layout_matches_abi() {
        assert_eq!(mem::size_of::<NvmlUtilization>(), 8);
    }

    #[test]
    fn test_pci_info_layout_matches_abi() {
        // 16-byte legacy buffer + five u32 fields + 32-byte buffer
        assert_eq!(mem::size_of::<NvmlPciInfo>(), 16 + 5 * 4 + 32);
    }

    #[test]
    fn test_process_info_layout_matches_abi() {
        // pid (4) + padding (4) + memory (8) + two instance ids (8)
        assert_eq!(mem::size_of::<NvmlProcessInfo>(), 24);
    }

    #[test]
    fn test_decode_text_truncates_at_first_nul() {
        let buf: Vec<c_char> = b"GPU-abc\0garbage\0"
            .iter()
            .map(|&b| b as c_char)
            .collect();
        assert_eq!(decode_text(&buf), "GPU-abc");
    }

    #[test]
    fn test_decode_text_keeps_first_field_of_process_name() {
        let buf: Vec<c_char> = b"/usr/bin/python3\0--flag\0arg\0"
            .iter()
            .map(|&b| b as c_char)
            .collect();
        assert_eq!(decode_text(&buf), "/usr/bin/python3");
    }

    #[test]
    fn test_decode_text_empty_buffer() {
        let buf = [0 as c_char; 16];
        assert_eq!(decode_text(&buf), "");
    }

    #[test]
    fn test_valid_process_entries_skips_zero_pids() {
        let mut entries = [NvmlProcessInfo::default(); 4];
        entries[0].pid = 100;
        entries[1].pid = 0; // absent slot below count
        entries[2].pid = 200;
        entries[3].pid = 300; // beyond count, must be ignored

        let valid = valid_process_entries(&entries, 3);
        let pids: Vec<u32> = valid.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![100, 200]);
    }

    #[test]
    fn test_valid_process_entries_empty_count() {
        let entries = [NvmlProcessInfo::default(); 2];
        assert!(valid_process_entries(&entries, 0).is_empty());
    }
}
