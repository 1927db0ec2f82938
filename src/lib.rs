//! Safe NVML bindings for GPU telemetry.
//!
//! The library loads NVML dynamically at runtime, so binaries built against
//! it run on machines without NVIDIA drivers; the failure surfaces as a
//! regular error when the library cannot be found. Typical use:
//!
//! ```no_run
//! use nvquery::Nvml;
//!
//! fn main() -> nvquery::Result<()> {
//!     let nvml = Nvml::new()?;
//!     nvml.init()?;
//!     for device in nvml.all_devices()? {
//!         println!("{}", device.status()?);
//!     }
//!     nvml.shutdown()
//! }
//! ```

pub mod domain;
pub mod error;
pub mod nvml;
pub mod status;

#[cfg(test)]
pub mod mock;

pub use error::{NvmlError, Result};
pub use nvml::{Device, LibNvml, Nvml, RawDriver};
