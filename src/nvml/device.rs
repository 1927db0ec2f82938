//! Typed query facade over one GPU.

use crate::domain::{
    ComputeMode, GpuInfo, GpuProcess, GpuStatus, MemoryInfo, MigMode, PciInfo, PerformanceState,
    Power, ProcessKind, Utilization,
};
use crate::error::Result;
use crate::nvml::driver::{optional, required, RawDeviceHandle, RawDriver, RawProcess};
use std::collections::HashSet;

/// Handle to one GPU, borrowed from the manager that produced it.
///
/// Methods translate raw outcomes into the typed error model. Fan speed, MIG
/// mode, and ECC counts are the only queries where a not-supported answer is
/// a valid absence; everywhere else it is an error.
#[derive(Debug)]
pub struct Device<'a, D: RawDriver> {
    driver: &'a D,
    handle: RawDeviceHandle,
    index: i32,
}

impl<'a, D: RawDriver> Device<'a, D> {
    pub(crate) fn new(driver: &'a D, handle: RawDeviceHandle, index: i32) -> Self {
        Self {
            driver,
            handle,
            index,
        }
    }

    /// Enumeration index, or -1 when opened by UUID.
    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn name(&self) -> Result<String> {
        required(self.driver.device_name(self.handle), "Failed to get device name")
    }

    pub fn uuid(&self) -> Result<String> {
        required(self.driver.device_uuid(self.handle), "Failed to get device UUID")
    }

    pub fn memory_info(&self) -> Result<MemoryInfo> {
        required(
            self.driver.device_memory_info(self.handle),
            "Failed to get memory info",
        )
    }

    pub fn utilization(&self) -> Result<Utilization> {
        required(
            self.driver.device_utilization(self.handle),
            "Failed to get utilization rates",
        )
    }

    /// Core temperature in degrees Celsius.
    pub fn temperature(&self) -> Result<u32> {
        required(
            self.driver.device_temperature(self.handle),
            "Failed to get temperature",
        )
    }

    pub fn power_usage(&self) -> Result<Power> {
        required(
            self.driver.device_power_usage(self.handle),
            "Failed to get power usage",
        )
        .map(Power::from_milliwatts)
    }

    pub fn power_limit(&self) -> Result<Power> {
        required(
            self.driver.device_power_limit(self.handle),
            "Failed to get power limit",
        )
        .map(Power::from_milliwatts)
    }

    /// Fan speed percentage; `None` on passively cooled boards.
    pub fn fan_speed(&self) -> Result<Option<u32>> {
        optional(
            self.driver.device_fan_speed(self.handle),
            "Failed to get fan speed",
        )
    }

    pub fn performance_state(&self) -> Result<PerformanceState> {
        required(
            self.driver.device_performance_state(self.handle),
            "Failed to get performance state",
        )
        .map(PerformanceState::from_raw)
    }

    pub fn pci_info(&self) -> Result<PciInfo> {
        required(self.driver.device_pci_info(self.handle), "Failed to get PCI info")
    }

    pub fn persistence_mode(&self) -> Result<bool> {
        required(
            self.driver.device_persistence_mode(self.handle),
            "Failed to get persistence mode",
        )
        .map(|mode| mode != 0)
    }

    pub fn display_active(&self) -> Result<bool> {
        required(
            self.driver.device_display_active(self.handle),
            "Failed to get display state",
        )
        .map(|state| state != 0)
    }

    pub fn compute_mode(&self) -> Result<ComputeMode> {
        required(
            self.driver.device_compute_mode(self.handle),
            "Failed to get compute mode",
        )
        .map(ComputeMode::from_raw)
    }

    /// MIG mode; `None` on GPUs without MIG support.
    pub fn mig_mode(&self) -> Result<Option<MigMode>> {
        optional(self.driver.device_mig_mode(self.handle), "Failed to get MIG mode")
            .map(|mode| mode.map(|(current, pending)| MigMode::from_raw(current, pending)))
    }

    /// Volatile corrected ECC total; `None` on GPUs without ECC.
    pub fn corrected_ecc_errors(&self) -> Result<Option<u64>> {
        optional(
            self.driver.device_corrected_ecc_total(self.handle),
            "Failed to get ECC error count",
        )
    }

    /// All processes holding a context on this GPU.
    ///
    /// Compute processes come first; a pid appearing on both lists is
    /// reported once as compute. Name lookup failures degrade to a
    /// `pid:<id>` placeholder rather than failing the enumeration; a lookup
    /// that succeeds with an empty string is treated as unresolved too.
    pub fn running_processes(&self) -> Result<Vec<GpuProcess>> {
        let compute = required(
            self.driver.device_compute_processes(self.handle),
            "Failed to get compute processes",
        )?;
        let graphics = required(
            self.driver.device_graphics_processes(self.handle),
            "Failed to get graphics processes",
        )?;

        let mut seen = HashSet::new();
        let mut processes = Vec::with_capacity(compute.len() + graphics.len());
        for (raw, kind) in compute
            .iter()
            .map(|p| (p, ProcessKind::Compute))
            .chain(graphics.iter().map(|p| (p, ProcessKind::Graphics)))
        {
            if seen.insert(raw.pid) {
                processes.push(self.decode_process(raw, kind));
            }
        }
        Ok(processes)
    }

    fn decode_process(&self, raw: &RawProcess, kind: ProcessKind) -> GpuProcess {
        let name = match self.driver.system_process_name(raw.pid) {
            Ok(name) if !name.is_empty() => name,
            _ => format!("pid:{}", raw.pid),
        };
        GpuProcess {
            pid: raw.pid,
            name,
            used_memory: raw.used_gpu_memory,
            gpu_instance_id: raw.gpu_instance_id,
            compute_instance_id: raw.compute_instance_id,
            kind,
        }
    }

    /// Static identity: name, UUID, and PCI location.
    pub fn basic_info(&self) -> Result<GpuInfo> {
        Ok(GpuInfo {
            index: self.index,
            name: self.name()?,
            uuid: self.uuid()?,
            pci_bus_id: self.pci_info()?.bus_id,
        })
    }

    /// Full telemetry record, queried in a fixed order.
    ///
    /// The first failing required query aborts the record with that query's
    /// error unchanged.
    pub fn status(&self) -> Result<GpuStatus> {
        Ok(GpuStatus {
            index: self.index,
            name: self.name()?,
            memory: self.memory_info()?,
            utilization: self.utilization()?,
            temperature: self.temperature()?,
            power_usage: self.power_usage()?,
            power_limit: self.power_limit()?,
            fan_speed: self.fan_speed()?,
            performance_state: self.performance_state()?,
        })
    }
}
