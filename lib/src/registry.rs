// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Set of the PCI Express devices polled by the monitor.

use crate::access::Backend;
use crate::capability;
use crate::device::{Address, Device};
use crate::error::Error;
use crate::regs::header;

/// PCI Express devices found on the platform.
///
/// The membership of the registry is established once at startup. Afterwards, only the error
/// snapshots of the devices are updated.
#[derive(Debug, Default)]
pub struct Registry {
    devices: Vec<Device>,
}

impl Registry {
    /// Lists all the PCI functions exposed by the `backend`, without filtering.
    pub fn enumerate(backend: &dyn Backend) -> Result<Self, Error> {
        Ok(Self {
            devices: backend.list_devices()?,
        })
    }

    /// Lists the PCI Express devices exposed by the `backend` and locates their capabilities.
    pub fn discover(backend: &dyn Backend) -> Result<Self, Error> {
        let mut registry = Self::enumerate(backend)?;
        registry.prune_non_express(backend);

        if registry.is_empty() {
            log::error!(
                "No PCIe devices found in {}",
                backend.access_dir().display()
            );
            return Err(Error::NoDevicesFound(backend.access_dir().to_path_buf()));
        }

        Ok(registry)
    }

    /// Removes the devices that are not PCI Express devices or that cannot be opened.
    ///
    /// The offsets of the PCI Express and AER capabilities are recorded for the remaining
    /// devices.
    pub fn prune_non_express(&mut self, backend: &dyn Backend) {
        self.devices.retain_mut(|device| {
            let space = match backend.open(&device.address) {
                Ok(space) => space,
                Err(err) => {
                    log::error!("{}: failed to open: {err}", device.address);
                    return false;
                }
            };

            let status = space.read_u16(header::STATUS);
            if status & header::STATUS_CAP_LIST != 0 {
                device.express_cap = capability::find_express_capability(&*space);
            }

            // Every PCIe device must have the PCI Express Capability Structure
            if device.express_cap.is_none() {
                log::debug!("Not PCI Express device: {}", device.address);
                return false;
            }

            device.aer_cap = capability::find_aer_capability(&*space);
            if device.aer_cap.is_none() {
                log::info!("Device is not AER capable: {}", device.address);
            }

            true
        });
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    pub fn get(&self, address: &Address) -> Option<&Device> {
        self.devices.iter().find(|device| device.address == *address)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl From<Vec<Device>> for Registry {
    fn from(devices: Vec<Device>) -> Self {
        Self { devices }
    }
}
