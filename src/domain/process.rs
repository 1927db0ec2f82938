//! Processes holding GPU contexts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a process was found on the compute or graphics enumeration.
///
/// A process present on both lists is reported once, as [`ProcessKind::Compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessKind {
    Compute,
    Graphics,
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute => write!(f, "Compute"),
            Self::Graphics => write!(f, "Graphics"),
        }
    }
}

/// One process with an active context on a GPU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuProcess {
    pub pid: u32,
    /// Executable path, or `pid:<id>` when the name is unavailable
    pub name: String,
    /// GPU memory attributed to the process, in bytes
    pub used_memory: u64,
    /// Meaningful only under MIG
    pub gpu_instance_id: u32,
    /// Meaningful only under MIG
    pub compute_instance_id: u32,
    pub kind: ProcessKind,
}

impl GpuProcess {
    /// Attributed memory in mebibytes, truncating any partial MiB.
    pub fn used_memory_mib(&self) -> u64 {
        self.used_memory / 1_048_576
    }
}

impl fmt::Display for GpuProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} MiB [{}]",
            self.pid,
            self.name,
            self.used_memory_mib(),
            self.kind
        )
    }
}
