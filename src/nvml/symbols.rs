//! Lazy, memoized resolution of NVML entry points.
//!
//! Binding cost is paid on first use only, so drivers missing optional
//! symbols do not fail at load time. Each outcome, including a missing
//! symbol, is cached for the life of the process; there is no retry.

use crate::nvml::loader::LoadedLibrary;
use crate::status::{Status, NVML_ERROR_FUNCTION_NOT_FOUND};
use std::collections::HashMap;
use std::ffi::c_void;
use std::mem;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy)]
struct RawFn(*const c_void);

// Resolved entry points are plain code pointers into a library that stays
// mapped as long as the cache holds its Arc.
unsafe impl Send for RawFn {}

/// Per-library cache of resolved entry points, keyed by symbol name.
pub struct SymbolCache {
    library: Arc<LoadedLibrary>,
    entries: Mutex<HashMap<&'static str, Result<RawFn, Status>>>,
}

impl SymbolCache {
    pub fn new(library: Arc<LoadedLibrary>) -> Self {
        Self {
            library,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `name` to the typed entry point `F`, caching the outcome.
    ///
    /// `F` must be the `extern "C"` fn-pointer alias declared for this symbol
    /// in [`crate::nvml::sys`]; the cast is unchecked beyond a size assertion.
    /// A missing symbol surfaces as `NVML_ERROR_FUNCTION_NOT_FOUND` and the
    /// failure is permanent for this process.
    pub fn resolve<F: Copy>(&self, name: &'static str) -> Result<F, Status> {
        assert_eq!(
            mem::size_of::<F>(),
            mem::size_of::<RawFn>(),
            "symbol type must be a fn pointer"
        );

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let slot = entries.entry(name).or_insert_with(|| {
            match unsafe { self.library.library().get::<F>(name.as_bytes()) } {
                Ok(symbol) => {
                    log::debug!("Resolved NVML symbol {}", name);
                    let ptr = unsafe { mem::transmute_copy::<F, *const c_void>(&*symbol) };
                    Ok(RawFn(ptr))
                }
                Err(e) => {
                    log::debug!("NVML symbol {} unavailable: {}", name, e);
                    Err(NVML_ERROR_FUNCTION_NOT_FOUND)
                }
            }
        });

        match slot {
            Ok(raw) => Ok(unsafe { mem::transmute_copy::<RawFn, F>(raw) }),
            Err(code) => Err(*code),
        }
    }

    /// Number of cached resolution outcomes (successes and failures).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
