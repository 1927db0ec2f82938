//! Native NVML status codes and their messages.
//!
//! Codes are carried as plain `u32` rather than an enum so values from newer
//! drivers pass through undamaged; the message table is a lookup, not a
//! definition of validity.

/// A raw NVML return code.
pub type Status = u32;

pub const NVML_SUCCESS: Status = 0;
pub const NVML_ERROR_UNINITIALIZED: Status = 1;
pub const NVML_ERROR_INVALID_ARGUMENT: Status = 2;
pub const NVML_ERROR_NOT_SUPPORTED: Status = 3;
pub const NVML_ERROR_NO_PERMISSION: Status = 4;
pub const NVML_ERROR_ALREADY_INITIALIZED: Status = 5;
pub const NVML_ERROR_NOT_FOUND: Status = 6;
pub const NVML_ERROR_INSUFFICIENT_SIZE: Status = 7;
pub const NVML_ERROR_INSUFFICIENT_POWER: Status = 8;
pub const NVML_ERROR_DRIVER_NOT_LOADED: Status = 9;
pub const NVML_ERROR_TIMEOUT: Status = 10;
pub const NVML_ERROR_IRQ_ISSUE: Status = 11;
pub const NVML_ERROR_LIBRARY_NOT_FOUND: Status = 12;
pub const NVML_ERROR_FUNCTION_NOT_FOUND: Status = 13;
pub const NVML_ERROR_CORRUPTED_INFOROM: Status = 14;
pub const NVML_ERROR_GPU_IS_LOST: Status = 15;
pub const NVML_ERROR_RESET_REQUIRED: Status = 16;
pub const NVML_ERROR_OPERATING_SYSTEM: Status = 17;
pub const NVML_ERROR_LIB_RM_VERSION_MISMATCH: Status = 18;
pub const NVML_ERROR_IN_USE: Status = 19;
pub const NVML_ERROR_MEMORY: Status = 20;
pub const NVML_ERROR_NO_DATA: Status = 21;
pub const NVML_ERROR_VGPU_ECC_NOT_SUPPORTED: Status = 22;
pub const NVML_ERROR_INSUFFICIENT_RESOURCES: Status = 23;
pub const NVML_ERROR_FREQ_NOT_SUPPORTED: Status = 24;
pub const NVML_ERROR_UNKNOWN: Status = 999;

/// Every code with an entry in the message table.
pub const KNOWN_CODES: &[Status] = &[
    NVML_SUCCESS,
    NVML_ERROR_UNINITIALIZED,
    NVML_ERROR_INVALID_ARGUMENT,
    NVML_ERROR_NOT_SUPPORTED,
    NVML_ERROR_NO_PERMISSION,
    NVML_ERROR_ALREADY_INITIALIZED,
    NVML_ERROR_NOT_FOUND,
    NVML_ERROR_INSUFFICIENT_SIZE,
    NVML_ERROR_INSUFFICIENT_POWER,
    NVML_ERROR_DRIVER_NOT_LOADED,
    NVML_ERROR_TIMEOUT,
    NVML_ERROR_IRQ_ISSUE,
    NVML_ERROR_LIBRARY_NOT_FOUND,
    NVML_ERROR_FUNCTION_NOT_FOUND,
    NVML_ERROR_CORRUPTED_INFOROM,
    NVML_ERROR_GPU_IS_LOST,
    NVML_ERROR_RESET_REQUIRED,
    NVML_ERROR_OPERATING_SYSTEM,
    NVML_ERROR_LIB_RM_VERSION_MISMATCH,
    NVML_ERROR_IN_USE,
    NVML_ERROR_MEMORY,
    NVML_ERROR_NO_DATA,
    NVML_ERROR_VGPU_ECC_NOT_SUPPORTED,
    NVML_ERROR_INSUFFICIENT_RESOURCES,
    NVML_ERROR_FREQ_NOT_SUPPORTED,
    NVML_ERROR_UNKNOWN,
];

/// Zero is the sole success sentinel.
#[inline]
pub fn is_success(code: Status) -> bool {
    code == NVML_SUCCESS
}

/// Human-readable message for a known code, `None` otherwise.
pub fn message(code: Status) -> Option<&'static str> {
    let text = match code {
        NVML_SUCCESS => "The operation was successful",
        NVML_ERROR_UNINITIALIZED => "NVML was not first initialized with nvmlInit",
        NVML_ERROR_INVALID_ARGUMENT => "A supplied argument is invalid",
        NVML_ERROR_NOT_SUPPORTED => "The requested operation is not available on target device",
        NVML_ERROR_NO_PERMISSION => "The current user does not have permission for operation",
        NVML_ERROR_ALREADY_INITIALIZED => "NVML has already been initialized",
        NVML_ERROR_NOT_FOUND => "A query to find an object was unsuccessful",
        NVML_ERROR_INSUFFICIENT_SIZE => "An input argument is not large enough",
        NVML_ERROR_INSUFFICIENT_POWER => "A device's external power cables are not properly attached",
        NVML_ERROR_DRIVER_NOT_LOADED => "NVIDIA driver is not loaded",
        NVML_ERROR_TIMEOUT => "User provided timeout passed",
        NVML_ERROR_IRQ_ISSUE => "NVIDIA kernel detected an interrupt issue with a GPU",
        NVML_ERROR_LIBRARY_NOT_FOUND => "NVML shared library couldn't be found or loaded",
        NVML_ERROR_FUNCTION_NOT_FOUND => "Local version of NVML doesn't implement this function",
        NVML_ERROR_CORRUPTED_INFOROM => "infoROM is corrupted",
        NVML_ERROR_GPU_IS_LOST => "The GPU has fallen off the bus or has otherwise become inaccessible",
        NVML_ERROR_RESET_REQUIRED => "The GPU requires a reset before it can be used again",
        NVML_ERROR_OPERATING_SYSTEM => "The GPU control device has been blocked by the operating system",
        NVML_ERROR_LIB_RM_VERSION_MISMATCH => "RM detects a driver/library version mismatch",
        NVML_ERROR_IN_USE => "An operation cannot be performed because the GPU is currently in use",
        NVML_ERROR_MEMORY => "Insufficient memory",
        NVML_ERROR_NO_DATA => "No data",
        NVML_ERROR_VGPU_ECC_NOT_SUPPORTED => "The requested vgpu operation is not available, ECC is enabled",
        NVML_ERROR_INSUFFICIENT_RESOURCES => "Ran out of critical resources, other than memory",
        NVML_ERROR_FREQ_NOT_SUPPORTED => "The requested frequency is not supported",
        NVML_ERROR_UNKNOWN => "An internal driver error occurred",
        _ => return None,
    };
    Some(text)
}

/// Message for any code; unknown codes get a generic fallback instead of
/// failing.
pub fn describe(code: Status) -> String {
    match message(code) {
        Some(text) => text.to_string(),
        None => format!("Unknown error code: {}", code),
    }
}
