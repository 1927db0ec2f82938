//! Unified error types for nvquery
//!
//! Every fallible query returns `Result<T, NvmlError>`; no panics are used for
//! expected failure modes. Uses thiserror for ergonomic error definitions.

use crate::status::{self, Status};
use thiserror::Error;

/// Error type for all NVML query operations
///
/// Each variant maps back to a native return code via [`NvmlError::code`], so
/// callers can branch on the raw NVML status programmatically while still
/// getting a readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NvmlError {
    /// NVML shared library could not be located or loaded
    #[error("NVML library not found (searched: {searched:?}). Is the NVIDIA driver installed?")]
    LibraryNotFound { searched: Vec<String> },

    /// Operation attempted before a successful `init()`
    #[error("NVML has not been initialized")]
    Uninitialized,

    /// Requested entry point is missing from the loaded library
    #[error("{context}: function not found in NVML library")]
    FunctionNotFound { context: String },

    /// Malformed argument rejected before reaching the native layer
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Device not found at index
    #[error("GPU device not found at index {0}")]
    DeviceNotFound(u32),

    /// Device not found by UUID
    #[error("GPU device not found with UUID: {0}")]
    DeviceNotFoundByUuid(String),

    /// Any other nonzero native return code, wrapped with query context
    #[error("{context}: {message} (NVML code {code})")]
    Api {
        code: Status,
        message: String,
        context: String,
    },
}

impl NvmlError {
    /// Build an error from a raw native return code plus caller context.
    ///
    /// The message is synthesized from the fixed code-to-text table in
    /// [`crate::status`]; an unmapped code still yields a readable string.
    pub fn from_code(code: Status, context: impl Into<String>) -> Self {
        match code {
            status::NVML_ERROR_UNINITIALIZED => NvmlError::Uninitialized,
            status::NVML_ERROR_FUNCTION_NOT_FOUND => NvmlError::FunctionNotFound {
                context: context.into(),
            },
            _ => NvmlError::Api {
                code,
                message: status::describe(code),
                context: context.into(),
            },
        }
    }

    /// The native NVML status code behind this error.
    pub fn code(&self) -> Status {
        match self {
            NvmlError::LibraryNotFound { .. } => status::NVML_ERROR_LIBRARY_NOT_FOUND,
            NvmlError::Uninitialized => status::NVML_ERROR_UNINITIALIZED,
            NvmlError::FunctionNotFound { .. } => status::NVML_ERROR_FUNCTION_NOT_FOUND,
            NvmlError::InvalidArgument(_) => status::NVML_ERROR_INVALID_ARGUMENT,
            NvmlError::DeviceNotFound(_) => status::NVML_ERROR_NOT_FOUND,
            NvmlError::DeviceNotFoundByUuid(_) => status::NVML_ERROR_NOT_FOUND,
            NvmlError::Api { code, .. } => *code,
        }
    }
}

/// Result type alias using NvmlError
pub type Result<T> = std::result::Result<T, NvmlError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: Status) -> Result<u32> {
        Err(NvmlError::from_code(code, "test query"))
    }

    #[test]
    fn test_from_code_distinguishes_uninitialized() {
        let err = NvmlError::from_code(status::NVML_ERROR_UNINITIALIZED, "anything");
        assert_eq!(err, NvmlError::Uninitialized);
        assert_eq!(err.code(), status::NVML_ERROR_UNINITIALIZED);
    }

    #[test]
    fn test_from_code_distinguishes_function_not_found() {
        let err =
            NvmlError::from_code(status::NVML_ERROR_FUNCTION_NOT_FOUND, "Failed to get fan speed");
        assert!(matches!(err, NvmlError::FunctionNotFound { .. }));
        assert_eq!(err.code(), status::NVML_ERROR_FUNCTION_NOT_FOUND);
    }

    #[test]
    fn test_from_code_synthesizes_message_from_table() {
        let err = NvmlError::from_code(status::NVML_ERROR_GPU_IS_LOST, "Failed to get temperature");
        match &err {
            NvmlError::Api {
                code,
                message,
                context,
            } => {
                assert_eq!(*code, status::NVML_ERROR_GPU_IS_LOST);
                assert_eq!(message, &status::describe(status::NVML_ERROR_GPU_IS_LOST));
                assert_eq!(context, "Failed to get temperature");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
        assert!(err.to_string().contains("Failed to get temperature"));
    }

    #[test]
    fn test_from_code_unmapped_code_never_panics() {
        let err = NvmlError::from_code(4711, "weird");
        assert_eq!(err.code(), 4711);
        assert!(err.to_string().contains("Unknown error code: 4711"));
    }

    #[test]
    fn test_unwrap_of_success_yields_value() {
        let ok: Result<u32> = Ok(55);
        assert_eq!(ok.unwrap(), 55);
    }

    #[test]
    #[should_panic]
    fn test_unwrap_of_failure_panics() {
        failure(status::NVML_ERROR_UNKNOWN).unwrap();
    }

    #[test]
    fn test_unwrap_or_returns_value_or_default() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.unwrap_or(99), 7);
        assert_eq!(failure(status::NVML_ERROR_TIMEOUT).unwrap_or(99), 99);
    }

    #[test]
    fn test_map_functor_laws() {
        let ok: Result<u32> = Ok(21);
        assert_eq!(ok.map(|v| v * 2), Ok(42));

        let mut invoked = false;
        let err = failure(status::NVML_ERROR_IRQ_ISSUE);
        let mapped = err.clone().map(|v| {
            invoked = true;
            v * 2
        });
        assert_eq!(mapped, err);
        assert!(!invoked, "map must not invoke the function on failure");
    }

    #[test]
    fn test_and_then_chains_and_short_circuits() {
        let ok: Result<u32> = Ok(10);
        assert_eq!(ok.and_then(|v| -> Result<u32> { Ok(v + 1) }), Ok(11));

        let mut invoked = false;
        let err = failure(status::NVML_ERROR_MEMORY);
        let chained = err.clone().and_then(|v| -> Result<u32> {
            invoked = true;
            Ok(v)
        });
        assert_eq!(chained, err);
        assert!(!invoked, "and_then must not invoke the function on failure");
    }

    #[test]
    fn test_library_not_found_carries_searched_paths() {
        let err = NvmlError::LibraryNotFound {
            searched: vec![
                "libnvidia-ml.so.1".into(),
                "/usr/lib64/libnvidia-ml.so.1".into(),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("libnvidia-ml.so.1"));
        assert!(text.contains("/usr/lib64/libnvidia-ml.so.1"));
        assert_eq!(err.code(), status::NVML_ERROR_LIBRARY_NOT_FOUND);
    }
}
