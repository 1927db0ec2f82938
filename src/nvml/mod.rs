//! NVML binding layers, from library discovery up to the typed facade.
//!
//! Layering, bottom to top: [`loader`] finds and maps the shared library,
//! [`symbols`] resolves entry points lazily, [`sys`] declares the ABI,
//! [`driver`] defines the raw call surface that [`libnvml`] implements, and
//! [`manager`]/[`device`] expose the typed, lifecycle-gated API.

pub mod device;
pub mod driver;
pub mod libnvml;
pub mod loader;
pub mod manager;
pub mod symbols;
pub mod sys;

pub use device::Device;
pub use driver::{RawDeviceHandle, RawDriver, RawProcess, RawResult};
pub use libnvml::LibNvml;
pub use manager::Nvml;
