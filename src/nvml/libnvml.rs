//! Real NVML driver backed by the loaded shared library.
//!
//! Every query follows one protocol: resolve the entry point through the
//! symbol cache, build caller-allocated buffers per the layouts in
//! [`crate::nvml::sys`], invoke, then decode outputs when the status is the
//! success sentinel. Versioned entry points fall back to their older names so
//! older drivers keep working.

use crate::domain::{MemoryInfo, PciInfo, Utilization};
use crate::error::Result;
use crate::nvml::driver::{RawDeviceHandle, RawDriver, RawProcess, RawResult};
use crate::nvml::loader;
use crate::nvml::symbols::SymbolCache;
use crate::nvml::sys;
use crate::status::{self, Status};
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint, c_ulonglong};
use std::ptr;

/// NVML driver that resolves and invokes the native entry points.
pub struct LibNvml {
    symbols: SymbolCache,
}

impl LibNvml {
    /// Acquire the process-wide library handle and prepare a symbol cache.
    ///
    /// Loading failure is the one error that precedes every query path, so it
    /// surfaces here rather than from a query result.
    pub fn new() -> Result<Self> {
        let library = loader::global().acquire()?;
        Ok(Self {
            symbols: SymbolCache::new(library),
        })
    }

    fn text_query(
        &self,
        f: sys::DeviceGetNameFn,
        device: RawDeviceHandle,
        capacity: usize,
    ) -> RawResult<String> {
        let mut buf = vec![0 as c_char; capacity];
        let code = unsafe { f(device.as_ptr(), buf.as_mut_ptr(), capacity as c_uint) };
        finish(code, || sys::decode_text(&buf))
    }

    fn counter_query(
        &self,
        f: sys::DeviceGetPowerUsageFn,
        device: RawDeviceHandle,
    ) -> RawResult<u32> {
        let mut value: c_uint = 0;
        let code = unsafe { f(device.as_ptr(), &mut value) };
        finish(code, || value)
    }

    fn process_query(&self, f: sys::DeviceGetRunningProcessesFn, device: RawDeviceHandle) -> RawResult<Vec<RawProcess>> {
        let mut entries = [sys::NvmlProcessInfo::default(); sys::NVML_MAX_PROCESS_ENTRIES];
        let mut count = entries.len() as c_uint;
        let code = unsafe { f(device.as_ptr(), &mut count, entries.as_mut_ptr()) };
        if !status::is_success(code) {
            return Err(code);
        }
        Ok(sys::valid_process_entries(&entries, count)
            .into_iter()
            .map(|p| RawProcess {
                pid: p.pid,
                used_gpu_memory: p.used_gpu_memory,
                gpu_instance_id: p.gpu_instance_id,
                compute_instance_id: p.compute_instance_id,
            })
            .collect())
    }
}

fn finish<T>(code: Status, decode: impl FnOnce() -> T) -> RawResult<T> {
    if status::is_success(code) {
        Ok(decode())
    } else {
        Err(code)
    }
}

impl RawDriver for LibNvml {
    fn init(&self) -> Status {
        let f = match self
            .symbols
            .resolve::<sys::InitFn>("nvmlInit_v2")
            .or_else(|_| self.symbols.resolve("nvmlInit"))
        {
            Ok(f) => f,
            Err(code) => return code,
        };
        unsafe { f() }
    }

    fn shutdown(&self) -> Status {
        let f = match self.symbols.resolve::<sys::ShutdownFn>("nvmlShutdown") {
            Ok(f) => f,
            Err(code) => return code,
        };
        unsafe { f() }
    }

    fn device_count(&self) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetCountFn>("nvmlDeviceGetCount_v2")
            .or_else(|_| self.symbols.resolve("nvmlDeviceGetCount"))?;
        let mut count: c_uint = 0;
        let code = unsafe { f(&mut count) };
        finish(code, || count)
    }

    fn device_handle_by_index(&self, index: u32) -> RawResult<RawDeviceHandle> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetHandleByIndexFn>("nvmlDeviceGetHandleByIndex_v2")
            .or_else(|_| self.symbols.resolve("nvmlDeviceGetHandleByIndex"))?;
        let mut handle: sys::NvmlDevicePtr = ptr::null_mut();
        let code = unsafe { f(index, &mut handle) };
        finish(code, || RawDeviceHandle::from_ptr(handle))
    }

    fn device_handle_by_uuid(&self, uuid: &str) -> RawResult<RawDeviceHandle> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetHandleByUuidFn>("nvmlDeviceGetHandleByUUID")?;
        let c_uuid = CString::new(uuid).map_err(|_| status::NVML_ERROR_INVALID_ARGUMENT)?;
        let mut handle: sys::NvmlDevicePtr = ptr::null_mut();
        let code = unsafe { f(c_uuid.as_ptr(), &mut handle) };
        finish(code, || RawDeviceHandle::from_ptr(handle))
    }

    fn device_name(&self, device: RawDeviceHandle) -> RawResult<String> {
        let f = self.symbols.resolve::<sys::DeviceGetNameFn>("nvmlDeviceGetName")?;
        self.text_query(f, device, sys::NVML_DEVICE_NAME_BUFFER_SIZE)
    }

    fn device_uuid(&self, device: RawDeviceHandle) -> RawResult<String> {
        let f = self.symbols.resolve::<sys::DeviceGetUuidFn>("nvmlDeviceGetUUID")?;
        self.text_query(f, device, sys::NVML_DEVICE_UUID_BUFFER_SIZE)
    }

    fn device_memory_info(&self, device: RawDeviceHandle) -> RawResult<MemoryInfo> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetMemoryInfoFn>("nvmlDeviceGetMemoryInfo")?;
        let mut info = sys::NvmlMemory::default();
        let code = unsafe { f(device.as_ptr(), &mut info) };
        finish(code, || MemoryInfo::new(info.total, info.free, info.used))
    }

    fn device_utilization(&self, device: RawDeviceHandle) -> RawResult<Utilization> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetUtilizationRatesFn>("nvmlDeviceGetUtilizationRates")?;
        let mut util = sys::NvmlUtilization::default();
        let code = unsafe { f(device.as_ptr(), &mut util) };
        finish(code, || Utilization::new(util.gpu, util.memory))
    }

    fn device_temperature(&self, device: RawDeviceHandle) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetTemperatureFn>("nvmlDeviceGetTemperature")?;
        let mut temp: c_uint = 0;
        let code = unsafe { f(device.as_ptr(), sys::NVML_TEMPERATURE_GPU, &mut temp) };
        finish(code, || temp)
    }

    fn device_power_usage(&self, device: RawDeviceHandle) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetPowerUsageFn>("nvmlDeviceGetPowerUsage")?;
        self.counter_query(f, device)
    }

    fn device_power_limit(&self, device: RawDeviceHandle) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetPowerManagementLimitFn>("nvmlDeviceGetPowerManagementLimit")?;
        self.counter_query(f, device)
    }

    fn device_fan_speed(&self, device: RawDeviceHandle) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetFanSpeedFn>("nvmlDeviceGetFanSpeed")?;
        self.counter_query(f, device)
    }

    fn device_performance_state(&self, device: RawDeviceHandle) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetPerformanceStateFn>("nvmlDeviceGetPerformanceState")?;
        self.counter_query(f, device)
    }

    fn device_pci_info(&self, device: RawDeviceHandle) -> RawResult<PciInfo> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetPciInfoFn>("nvmlDeviceGetPciInfo_v3")
            .or_else(|_| self.symbols.resolve("nvmlDeviceGetPciInfo_v2"))?;
        let mut info = sys::NvmlPciInfo::default();
        let code = unsafe { f(device.as_ptr(), &mut info) };
        finish(code, || PciInfo {
            bus_id: sys::decode_text(&info.bus_id),
            bus_id_legacy: sys::decode_text(&info.bus_id_legacy),
            domain: info.domain,
            bus: info.bus,
            device: info.device,
            pci_device_id: info.pci_device_id,
            pci_sub_system_id: info.pci_sub_system_id,
        })
    }

    fn device_persistence_mode(&self, device: RawDeviceHandle) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetPersistenceModeFn>("nvmlDeviceGetPersistenceMode")?;
        self.counter_query(f, device)
    }

    fn device_display_active(&self, device: RawDeviceHandle) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetDisplayActiveFn>("nvmlDeviceGetDisplayActive")?;
        self.counter_query(f, device)
    }

    fn device_compute_mode(&self, device: RawDeviceHandle) -> RawResult<u32> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetComputeModeFn>("nvmlDeviceGetComputeMode")?;
        self.counter_query(f, device)
    }

    fn device_mig_mode(&self, device: RawDeviceHandle) -> RawResult<(u32, u32)> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetMigModeFn>("nvmlDeviceGetMigMode")?;
        let mut current: c_uint = 0;
        let mut pending: c_uint = 0;
        let code = unsafe { f(device.as_ptr(), &mut current, &mut pending) };
        finish(code, || (current, pending))
    }

    fn device_corrected_ecc_total(&self, device: RawDeviceHandle) -> RawResult<u64> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetTotalEccErrorsFn>("nvmlDeviceGetTotalEccErrors")?;
        let mut count: c_ulonglong = 0;
        let code = unsafe {
            f(
                device.as_ptr(),
                sys::NVML_MEMORY_ERROR_TYPE_CORRECTED,
                sys::NVML_VOLATILE_ECC,
                &mut count,
            )
        };
        finish(code, || count)
    }

    fn device_compute_processes(&self, device: RawDeviceHandle) -> RawResult<Vec<RawProcess>> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetRunningProcessesFn>("nvmlDeviceGetComputeRunningProcesses_v3")
            .or_else(|_| {
                self.symbols
                    .resolve("nvmlDeviceGetComputeRunningProcesses_v2")
            })?;
        self.process_query(f, device)
    }

    fn device_graphics_processes(&self, device: RawDeviceHandle) -> RawResult<Vec<RawProcess>> {
        let f = self
            .symbols
            .resolve::<sys::DeviceGetRunningProcessesFn>("nvmlDeviceGetGraphicsRunningProcesses_v3")
            .or_else(|_| {
                self.symbols
                    .resolve("nvmlDeviceGetGraphicsRunningProcesses_v2")
            })?;
        self.process_query(f, device)
    }

    fn system_process_name(&self, pid: u32) -> RawResult<String> {
        let f = self
            .symbols
            .resolve::<sys::SystemGetProcessNameFn>("nvmlSystemGetProcessName")?;
        let mut buf = vec![0 as c_char; sys::NVML_PROCESS_NAME_BUFFER_SIZE];
        let code = unsafe { f(pid, buf.as_mut_ptr(), buf.len() as c_uint) };
        finish(code, || sys::decode_text(&buf))
    }

    fn system_driver_version(&self) -> RawResult<String> {
        let f = self
            .symbols
            .resolve::<sys::SystemGetDriverVersionFn>("nvmlSystemGetDriverVersion")?;
        let mut buf = vec![0 as c_char; sys::NVML_SYSTEM_DRIVER_VERSION_BUFFER_SIZE];
        let code = unsafe { f(buf.as_mut_ptr(), buf.len() as c_uint) };
        finish(code, || sys::decode_text(&buf))
    }

    fn system_nvml_version(&self) -> RawResult<String> {
        let f = self
            .symbols
            .resolve::<sys::SystemGetNvmlVersionFn>("nvmlSystemGetNVMLVersion")?;
        let mut buf = vec![0 as c_char; sys::NVML_SYSTEM_NVML_VERSION_BUFFER_SIZE];
        let code = unsafe { f(buf.as_mut_ptr(), buf.len() as c_uint) };
        finish(code, || sys::decode_text(&buf))
    }

    fn system_cuda_driver_version(&self) -> RawResult<i32> {
        let f = self
            .symbols
            .resolve::<sys::SystemGetCudaDriverVersionFn>("nvmlSystemGetCudaDriverVersion_v2")
            .or_else(|_| self.symbols.resolve("nvmlSystemGetCudaDriverVersion"))?;
        let mut version: c_int = 0;
        let code = unsafe { f(&mut version) };
        finish(code, || version)
    }
}
