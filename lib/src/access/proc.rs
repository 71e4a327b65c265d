// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::{Backend, ConfigSpace, FileConfigSpace};
use crate::device::{Address, Device};
use crate::error::Error;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROC_DIR: &str = "/proc/bus/pci";

/// Reads the configuration space from the `BB/DD.F` files of procfs.
///
/// The device list is taken from the `devices` table, where each line starts with the hexadecimal
/// slot value of a function.
pub struct ProcBackend {
    root: PathBuf,
}

impl ProcBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Default for ProcBackend {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_PROC_DIR))
    }
}

/// Extracts the slot value from a line of the proc device table.
pub(crate) fn parse_slot(line: &str) -> Option<u32> {
    let field = line.split_whitespace().next()?;
    u32::from_str_radix(field, 16).ok()
}

impl Backend for ProcBackend {
    fn access_dir(&self) -> &Path {
        &self.root
    }

    fn list_devices(&self) -> Result<Vec<Device>, Error> {
        let path = self.root.join("devices");
        let table = std::fs::read_to_string(&path).map_err(|err| {
            log::error!("Cannot open file {} to get devices list: {err}", path.display());
            Error::DeviceListUnavailable(path.clone(), err)
        })?;

        let devices = table
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                parse_slot(line)
                    .or_else(|| {
                        log::error!("Failed to read line {} from {}", i + 1, path.display());
                        None
                    })
                    .map(Address::from_proc_slot)
            })
            .inspect(|address| log::debug!("pci device added to list: {address}"))
            .map(Device::new)
            .collect();

        Ok(devices)
    }

    fn open(&self, address: &Address) -> Result<Box<dyn ConfigSpace>, Error> {
        let path = self
            .root
            .join(format!("{:02x}", address.bus))
            .join(format!("{:02x}.{}", address.device, address.function));
        Ok(Box::new(FileConfigSpace::open(*address, path)?))
    }
}
