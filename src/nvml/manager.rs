//! NVML lifecycle owner and system-level queries.

use crate::domain::{CudaVersion, DriverInfo, GpuProcess, GpuStatus, SystemSnapshot};
use crate::error::{NvmlError, Result};
use crate::nvml::device::Device;
use crate::nvml::driver::{required, RawDriver};
use crate::nvml::libnvml::LibNvml;
use crate::status;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

/// Entry point to the library: owns the driver and its lifecycle state.
///
/// Every query is gated on a successful [`Nvml::init`]; after
/// [`Nvml::shutdown`] queries fail again until re-initialized. State is
/// per-instance, matching the native library's init refcounting.
pub struct Nvml<D: RawDriver = LibNvml> {
    driver: D,
    initialized: AtomicBool,
}

impl Nvml<LibNvml> {
    /// Load the native library and prepare an uninitialized manager.
    pub fn new() -> Result<Self> {
        Ok(Self::with_driver(LibNvml::new()?))
    }
}

impl<D: RawDriver> Nvml<D> {
    /// Build a manager over any raw driver, in the uninitialized state.
    pub fn with_driver(driver: D) -> Self {
        Self {
            driver,
            initialized: AtomicBool::new(false),
        }
    }

    /// Initialize the native library. Idempotent on success.
    pub fn init(&self) -> Result<()> {
        let code = self.driver.init();
        if !status::is_success(code) {
            return Err(NvmlError::from_code(code, "Failed to initialize NVML"));
        }
        self.initialized.store(true, Ordering::SeqCst);
        log::debug!("NVML initialized");
        Ok(())
    }

    /// Shut the native library down; queries fail until the next `init`.
    pub fn shutdown(&self) -> Result<()> {
        self.ensure_initialized()?;
        let code = self.driver.shutdown();
        if !status::is_success(code) {
            return Err(NvmlError::from_code(code, "Failed to shut down NVML"));
        }
        self.initialized.store(false, Ordering::SeqCst);
        log::debug!("NVML shut down");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Fail with the distinguished uninitialized error unless `init` has
    /// succeeded, without touching the native layer.
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(NvmlError::Uninitialized)
        }
    }

    /// Number of GPUs visible to the driver.
    pub fn device_count(&self) -> Result<u32> {
        self.ensure_initialized()?;
        required(self.driver.device_count(), "Failed to get device count")
    }

    /// Open the GPU at `index` (0-based enumeration order).
    pub fn device(&self, index: u32) -> Result<Device<'_, D>> {
        self.ensure_initialized()?;
        match self.driver.device_handle_by_index(index) {
            Ok(handle) => Ok(Device::new(&self.driver, handle, index as i32)),
            // The native call reports a bad index as either code; both mean
            // the same thing to a caller.
            Err(status::NVML_ERROR_NOT_FOUND) | Err(status::NVML_ERROR_INVALID_ARGUMENT) => {
                Err(NvmlError::DeviceNotFound(index))
            }
            Err(code) => Err(NvmlError::from_code(code, "Failed to get device handle")),
        }
    }

    /// Open a GPU by UUID. The reported index is -1; UUID lookup does not
    /// reveal the enumeration position.
    pub fn device_by_uuid(&self, uuid: &str) -> Result<Device<'_, D>> {
        self.ensure_initialized()?;
        if uuid.is_empty() {
            return Err(NvmlError::InvalidArgument(
                "device UUID must not be empty".to_string(),
            ));
        }
        match self.driver.device_handle_by_uuid(uuid) {
            Ok(handle) => Ok(Device::new(&self.driver, handle, -1)),
            Err(status::NVML_ERROR_NOT_FOUND) => {
                Err(NvmlError::DeviceNotFoundByUuid(uuid.to_string()))
            }
            Err(code) => Err(NvmlError::from_code(code, "Failed to get device handle")),
        }
    }

    /// Handles for every visible GPU, in enumeration order.
    pub fn all_devices(&self) -> Result<Vec<Device<'_, D>>> {
        let count = self.device_count()?;
        (0..count).map(|i| self.device(i)).collect()
    }

    pub fn driver_version(&self) -> Result<String> {
        self.ensure_initialized()?;
        required(
            self.driver.system_driver_version(),
            "Failed to get driver version",
        )
    }

    pub fn nvml_version(&self) -> Result<String> {
        self.ensure_initialized()?;
        required(
            self.driver.system_nvml_version(),
            "Failed to get NVML version",
        )
    }

    pub fn cuda_version(&self) -> Result<CudaVersion> {
        self.ensure_initialized()?;
        required(
            self.driver.system_cuda_driver_version(),
            "Failed to get CUDA driver version",
        )
        .map(CudaVersion::from_raw)
    }

    /// Driver, NVML, and CUDA versions in one call.
    pub fn driver_info(&self) -> Result<DriverInfo> {
        Ok(DriverInfo {
            driver_version: self.driver_version()?,
            nvml_version: self.nvml_version()?,
            cuda_version: self.cuda_version()?,
        })
    }

    /// Telemetry for every GPU. Fails on the first GPU whose status fails.
    pub fn all_gpu_status(&self) -> Result<Vec<GpuStatus>> {
        let count = self.device_count()?;
        let mut statuses = Vec::with_capacity(count as usize);
        for index in 0..count {
            statuses.push(self.device(index)?.status()?);
        }
        Ok(statuses)
    }

    /// Capture the full system state: driver info, every GPU's telemetry,
    /// and every GPU's process list.
    ///
    /// The timestamp is taken once, after driver info and statuses succeed
    /// and before process enumeration begins.
    pub fn system_snapshot(&self) -> Result<SystemSnapshot> {
        let driver = self.driver_info()?;
        let gpus = self.all_gpu_status()?;
        let captured_at = SystemTime::now();
        let mut processes: Vec<Vec<GpuProcess>> = Vec::with_capacity(gpus.len());
        for index in 0..gpus.len() as u32 {
            processes.push(self.device(index)?.running_processes()?);
        }
        Ok(SystemSnapshot {
            driver,
            gpus,
            processes,
            captured_at,
        })
    }
}
