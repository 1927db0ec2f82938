//! In-memory driver for tests.
//!
//! Implements the raw call surface over plain data so lifecycle, mapping,
//! and aggregation logic can be exercised without hardware. Failure
//! injection works by replacing a field's stored outcome with an error code.

use crate::domain::MemoryInfo;
use crate::nvml::driver::{RawDeviceHandle, RawDriver, RawProcess, RawResult};
use crate::nvml::sys;
use crate::status;
use std::collections::HashMap;

/// Scripted state for one fake GPU.
#[derive(Debug, Clone)]
pub struct MockGpu {
    pub name: String,
    pub uuid: String,
    pub memory: MemoryInfo,
    /// Overrides `memory` with a failure when nonzero
    pub memory_status: status::Status,
    pub utilization: (u32, u32),
    pub temperature: RawResult<u32>,
    pub power_usage_mw: u32,
    pub power_limit_mw: u32,
    pub fan_speed: RawResult<u32>,
    pub performance_state: u32,
    pub pci_bus_id: String,
    pub persistence_mode: u32,
    pub display_active: u32,
    pub compute_mode: u32,
    pub mig_mode: RawResult<(u32, u32)>,
    pub corrected_ecc: RawResult<u64>,
    pub compute_processes: Vec<RawProcess>,
    pub graphics_processes: Vec<RawProcess>,
}

impl MockGpu {
    pub fn new(index: u32) -> Self {
        Self {
            name: format!("Mock GPU {}", index),
            uuid: format!("GPU-mock-{}", index),
            memory: MemoryInfo::new(
                8 * 1024 * 1024 * 1024,
                6 * 1024 * 1024 * 1024,
                2 * 1024 * 1024 * 1024,
            ),
            memory_status: status::NVML_SUCCESS,
            utilization: (75, 40),
            temperature: Ok(55),
            power_usage_mw: 150_000,
            power_limit_mw: 300_000,
            fan_speed: Ok(50),
            performance_state: 2,
            pci_bus_id: format!("00000000:{:02x}:00.0", index + 1),
            persistence_mode: 1,
            display_active: 0,
            compute_mode: 0,
            mig_mode: Ok((0, 0)),
            corrected_ecc: Ok(0),
            compute_processes: Vec::new(),
            graphics_processes: Vec::new(),
        }
    }
}

/// Scripted driver backing a whole fake system.
#[derive(Debug)]
pub struct MockDriver {
    pub gpus: Vec<MockGpu>,
    pub driver_version: String,
    pub nvml_version: String,
    pub cuda_version: i32,
    pub init_status: status::Status,
    pub shutdown_status: status::Status,
    /// Known process names; pids absent here fail name lookup
    pub process_names: HashMap<u32, String>,
}

impl MockDriver {
    pub fn new(gpus: Vec<MockGpu>) -> Self {
        Self {
            gpus,
            driver_version: "535.154.05".to_string(),
            nvml_version: "12.535.154.05".to_string(),
            cuda_version: 12040,
            init_status: status::NVML_SUCCESS,
            shutdown_status: status::NVML_SUCCESS,
            process_names: HashMap::new(),
        }
    }

    /// One GPU with a compute process (pid 4242, named), a graphics process
    /// sharing that pid, and a second graphics process (pid 777) whose name
    /// cannot be resolved.
    pub fn single_gpu() -> Self {
        let mut gpu = MockGpu::new(0);
        gpu.compute_processes = vec![RawProcess {
            pid: 4242,
            used_gpu_memory: 1024 * 1024 * 1024,
            gpu_instance_id: 0,
            compute_instance_id: 0,
        }];
        gpu.graphics_processes = vec![
            RawProcess {
                pid: 4242,
                used_gpu_memory: 256 * 1024 * 1024,
                gpu_instance_id: 0,
                compute_instance_id: 0,
            },
            RawProcess {
                pid: 777,
                used_gpu_memory: 512 * 1024 * 1024,
                gpu_instance_id: 0,
                compute_instance_id: 0,
            },
        ];

        let mut driver = Self::new(vec![gpu]);
        driver
            .process_names
            .insert(4242, "/usr/bin/python3".to_string());
        driver
    }

    fn gpu(&self, handle: RawDeviceHandle) -> RawResult<&MockGpu> {
        // Handles are index + 1 so that zero stays an invalid handle.
        self.gpus
            .get(handle.0.wrapping_sub(1))
            .ok_or(status::NVML_ERROR_INVALID_ARGUMENT)
    }
}

impl RawDriver for MockDriver {
    fn init(&self) -> status::Status {
        self.init_status
    }

    fn shutdown(&self) -> status::Status {
        self.shutdown_status
    }

    fn device_count(&self) -> RawResult<u32> {
        Ok(self.gpus.len() as u32)
    }

    fn device_handle_by_index(&self, index: u32) -> RawResult<RawDeviceHandle> {
        if (index as usize) < self.gpus.len() {
            Ok(RawDeviceHandle(index as usize + 1))
        } else {
            Err(status::NVML_ERROR_INVALID_ARGUMENT)
        }
    }

    fn device_handle_by_uuid(&self, uuid: &str) -> RawResult<RawDeviceHandle> {
        self.gpus
            .iter()
            .position(|g| g.uuid == uuid)
            .map(|i| RawDeviceHandle(i + 1))
            .ok_or(status::NVML_ERROR_NOT_FOUND)
    }

    fn device_name(&self, device: RawDeviceHandle) -> RawResult<String> {
        Ok(self.gpu(device)?.name.clone())
    }

    fn device_uuid(&self, device: RawDeviceHandle) -> RawResult<String> {
        Ok(self.gpu(device)?.uuid.clone())
    }

    fn device_memory_info(&self, device: RawDeviceHandle) -> RawResult<MemoryInfo> {
        let gpu = self.gpu(device)?;
        if !status::is_success(gpu.memory_status) {
            return Err(gpu.memory_status);
        }
        Ok(gpu.memory)
    }

    fn device_utilization(&self, device: RawDeviceHandle) -> RawResult<crate::domain::Utilization> {
        let (gpu, memory) = self.gpu(device)?.utilization;
        Ok(crate::domain::Utilization::new(gpu, memory))
    }

    fn device_temperature(&self, device: RawDeviceHandle) -> RawResult<u32> {
        self.gpu(device)?.temperature
    }

    fn device_power_usage(&self, device: RawDeviceHandle) -> RawResult<u32> {
        Ok(self.gpu(device)?.power_usage_mw)
    }

    fn device_power_limit(&self, device: RawDeviceHandle) -> RawResult<u32> {
        Ok(self.gpu(device)?.power_limit_mw)
    }

    fn device_fan_speed(&self, device: RawDeviceHandle) -> RawResult<u32> {
        self.gpu(device)?.fan_speed
    }

    fn device_performance_state(&self, device: RawDeviceHandle) -> RawResult<u32> {
        Ok(self.gpu(device)?.performance_state)
    }

    fn device_pci_info(&self, device: RawDeviceHandle) -> RawResult<crate::domain::PciInfo> {
        let gpu = self.gpu(device)?;
        Ok(crate::domain::PciInfo {
            bus_id: gpu.pci_bus_id.clone(),
            bus_id_legacy: gpu
                .pci_bus_id
                .get(..sys::NVML_DEVICE_PCI_BUS_ID_BUFFER_V2_SIZE - 1)
                .unwrap_or(&gpu.pci_bus_id)
                .to_string(),
            domain: 0,
            bus: 1,
            device: 0,
            pci_device_id: 0x2684_10de,
            pci_sub_system_id: 0,
        })
    }

    fn device_persistence_mode(&self, device: RawDeviceHandle) -> RawResult<u32> {
        Ok(self.gpu(device)?.persistence_mode)
    }

    fn device_display_active(&self, device: RawDeviceHandle) -> RawResult<u32> {
        Ok(self.gpu(device)?.display_active)
    }

    fn device_compute_mode(&self, device: RawDeviceHandle) -> RawResult<u32> {
        Ok(self.gpu(device)?.compute_mode)
    }

    fn device_mig_mode(&self, device: RawDeviceHandle) -> RawResult<(u32, u32)> {
        self.gpu(device)?.mig_mode
    }

    fn device_corrected_ecc_total(&self, device: RawDeviceHandle) -> RawResult<u64> {
        self.gpu(device)?.corrected_ecc
    }

    fn device_compute_processes(&self, device: RawDeviceHandle) -> RawResult<Vec<RawProcess>> {
        Ok(self.gpu(device)?.compute_processes.clone())
    }

    fn device_graphics_processes(&self, device: RawDeviceHandle) -> RawResult<Vec<RawProcess>> {
        Ok(self.gpu(device)?.graphics_processes.clone())
    }

    fn system_process_name(&self, pid: u32) -> RawResult<String> {
        self.process_names
            .get(&pid)
            .cloned()
            .ok_or(status::NVML_ERROR_NOT_FOUND)
    }

    fn system_driver_version(&self) -> RawResult<String> {
        Ok(self.driver_version.clone())
    }

    fn system_nvml_version(&self) -> RawResult<String> {
        Ok(self.nvml_version.clone())
    }

    fn system_cuda_driver_version(&self) -> RawResult<i32> {
        Ok(self.cuda_version)
    }
}
