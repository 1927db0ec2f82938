//! GPU memory accounting.

use serde::{Deserialize, Serialize};
use std::fmt;

const BYTES_PER_MIB: u64 = 1_048_576;

/// Framebuffer memory counts in bytes, as reported by the driver.
///
/// The driver reserves some memory for itself, so `free + used` may be
/// slightly below `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total installed framebuffer memory in bytes
    pub total: u64,
    /// Unallocated memory in bytes
    pub free: u64,
    /// Allocated memory in bytes
    pub used: u64,
}

impl MemoryInfo {
    pub fn new(total: u64, free: u64, used: u64) -> Self {
        Self { total, free, used }
    }

    /// Total memory in mebibytes, truncating any partial MiB.
    pub fn total_mib(&self) -> u64 {
        self.total / BYTES_PER_MIB
    }

    /// Free memory in mebibytes, truncating any partial MiB.
    pub fn free_mib(&self) -> u64 {
        self.free / BYTES_PER_MIB
    }

    /// Used memory in mebibytes, truncating any partial MiB.
    pub fn used_mib(&self) -> u64 {
        self.used / BYTES_PER_MIB
    }

    /// Used memory as a percentage of total; 0.0 when total is zero.
    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f64 / self.total as f64 * 100.0
    }
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MiB / {} MiB", self.used_mib(), self.total_mib())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mib_conversion_is_integer_division() {
        let info = MemoryInfo::new(8 * 1024 * 1024 * 1024, 6 * 1024 * 1024 * 1024, 2 * 1024 * 1024 * 1024);
        assert_eq!(info.total_mib(), 8192);
        assert_eq!(info.free_mib(), 6144);
        assert_eq!(info.used_mib(), 2048);
    }

    #[test]
    fn test_partial_mib_truncates() {
        let info = MemoryInfo::new(BYTES_PER_MIB + BYTES_PER_MIB / 2, 0, BYTES_PER_MIB - 1);
        assert_eq!(info.total_mib(), 1);
        assert_eq!(info.used_mib(), 0);
    }

    #[test]
    fn test_used_percent() {
        let info = MemoryInfo::new(8 * 1024 * 1024 * 1024, 6 * 1024 * 1024 * 1024, 2 * 1024 * 1024 * 1024);
        assert!((info.used_percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_used_percent_zero_total() {
        let info = MemoryInfo::default();
        assert_eq!(info.used_percent(), 0.0);
    }

    #[test]
    fn test_display() {
        let info = MemoryInfo::new(8 * 1024 * 1024 * 1024, 6 * 1024 * 1024 * 1024, 2 * 1024 * 1024 * 1024);
        assert_eq!(info.to_string(), "2048 MiB / 8192 MiB");
    }
}
