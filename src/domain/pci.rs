//! PCI bus location and identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// PCI location of a device, decoded from the native info struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PciInfo {
    /// Canonical bus id string, e.g. `00000000:01:00.0`
    pub bus_id: String,
    /// Deprecated short-form bus id retained for older tooling
    pub bus_id_legacy: String,
    pub domain: u32,
    pub bus: u32,
    pub device: u32,
    /// Combined device and vendor id (device in the upper 16 bits)
    pub pci_device_id: u32,
    pub pci_sub_system_id: u32,
}

impl fmt::Display for PciInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bus_id)
    }
}
