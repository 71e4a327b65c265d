// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::{Backend, ConfigSpace, FileConfigSpace};
use crate::device::{Address, Device};
use crate::error::Error;
use std::path::{Path, PathBuf};

pub const DEFAULT_SYSFS_DIR: &str = "/sys/bus/pci";

/// Reads the configuration space from the `devices/DDDD:BB:DD.F/config` files of sysfs.
pub struct SysfsBackend {
    root: PathBuf,
}

impl SysfsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn devices_dir(&self) -> PathBuf {
        self.root.join("devices")
    }
}

impl Default for SysfsBackend {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_SYSFS_DIR))
    }
}

impl Backend for SysfsBackend {
    fn access_dir(&self) -> &Path {
        &self.root
    }

    fn list_devices(&self) -> Result<Vec<Device>, Error> {
        let path = self.devices_dir();
        let entries = std::fs::read_dir(&path).map_err(|err| {
            log::error!("Cannot open dir {} to get devices list: {err}", path.display());
            Error::DeviceListUnavailable(path.clone(), err)
        })?;

        let mut addresses: Vec<Address> = entries
            .filter_map(|entry| {
                entry
                    .inspect_err(|err| log::error!("Cannot access directory entry: {err}"))
                    .ok()
            })
            .filter_map(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();

                // Omit special non-device entries
                if name.starts_with('.') {
                    return None;
                }

                name.parse::<Address>()
                    .inspect_err(|_| log::error!("Failed to parse entry {name}"))
                    .ok()
            })
            .collect();

        // Directory entries come in no particular order
        addresses.sort();

        Ok(addresses
            .into_iter()
            .inspect(|address| log::debug!("pci device added to list: {address}"))
            .map(Device::new)
            .collect())
    }

    fn open(&self, address: &Address) -> Result<Box<dyn ConfigSpace>, Error> {
        let path = self.devices_dir().join(address.to_string()).join("config");
        Ok(Box::new(FileConfigSpace::open(*address, path)?))
    }
}
