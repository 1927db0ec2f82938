//! NVML shared library discovery and the process-wide handle.
//!
//! Discovery consults a single environment variable override first, then a
//! fixed ordered list of candidates: bare sonames resolved by the dynamic
//! linker, then well-known absolute install paths. The first candidate that
//! loads wins and is memoized for the rest of the process lifetime.

use crate::error::{NvmlError, Result};
use libloading::Library;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Environment variable naming an explicit NVML library path.
pub const NVML_PATH_ENV: &str = "NVQUERY_NVML_PATH";

#[cfg(not(windows))]
const DEFAULT_CANDIDATES: &[&str] = &[
    "libnvidia-ml.so.1",
    "libnvidia-ml.so",
    "/usr/lib/x86_64-linux-gnu/libnvidia-ml.so.1",
    "/usr/lib64/libnvidia-ml.so.1",
    "/usr/lib/libnvidia-ml.so.1",
    "/opt/nvidia/lib64/libnvidia-ml.so.1",
];

#[cfg(windows)]
const DEFAULT_CANDIDATES: &[&str] = &[
    "nvml.dll",
    "C:\\Windows\\System32\\nvml.dll",
    "C:\\Program Files\\NVIDIA Corporation\\NVSMI\\nvml.dll",
];

/// A loaded NVML library plus the path it was loaded from.
#[derive(Debug)]
pub struct LoadedLibrary {
    library: Library,
    path: String,
}

impl LoadedLibrary {
    pub(crate) fn new(library: Library, path: String) -> Self {
        Self { library, path }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Owner of the process-wide NVML handle.
///
/// At most one live handle exists per manager; repeated `acquire` calls return
/// the cached handle without re-loading.
pub struct LibraryManager {
    slot: Mutex<Option<Arc<LoadedLibrary>>>,
}

impl LibraryManager {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Load the NVML library via the default discovery order, memoizing the
    /// result. Keeps the library mapped until [`LibraryManager::release`].
    pub fn acquire(&self) -> Result<Arc<LoadedLibrary>> {
        self.acquire_from(&candidate_paths())
    }

    pub(crate) fn acquire_from(&self, candidates: &[String]) -> Result<Arc<LoadedLibrary>> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(loaded) = slot.as_ref() {
            return Ok(Arc::clone(loaded));
        }

        let mut searched = Vec::new();
        for path in candidates {
            match unsafe { Library::new(path) } {
                Ok(library) => {
                    log::info!("Loaded NVML library from {}", path);
                    let loaded = Arc::new(LoadedLibrary::new(library, path.clone()));
                    *slot = Some(Arc::clone(&loaded));
                    return Ok(loaded);
                }
                Err(e) => {
                    log::debug!("NVML candidate {} failed to load: {}", path, e);
                    searched.push(path.clone());
                }
            }
        }

        Err(NvmlError::LibraryNotFound { searched })
    }

    /// Whether a handle is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Path the cached handle was loaded from, if any.
    pub fn loaded_path(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|l| l.path().to_string())
    }

    /// Test/reset only: drop the cached handle so the next `acquire` reloads.
    pub fn release(&self) {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}

impl Default for LibraryManager {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide manager shared by every [`crate::LibNvml`] instance.
pub fn global() -> &'static LibraryManager {
    static MANAGER: LibraryManager = LibraryManager::new();
    &MANAGER
}

/// Discovery order: env override (when it exists on disk), then defaults.
pub fn candidate_paths() -> Vec<String> {
    let override_path = std::env::var(NVML_PATH_ENV).ok();
    candidates_with_override(override_path.as_deref())
}

fn candidates_with_override(override_path: Option<&str>) -> Vec<String> {
    let mut paths = Vec::new();
    if let Some(p) = override_path {
        if !p.is_empty() {
            if Path::new(p).exists() {
                paths.push(p.to_string());
            } else {
                log::warn!(
                    "{} is set to {} but the file does not exist; using default search paths",
                    NVML_PATH_ENV,
                    p
                );
            }
        }
    }
    paths.extend(DEFAULT_CANDIDATES.iter().map(|s| s.to_string()));
    paths
}
