// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Access to the configuration space of the PCI devices.
//!
//! The registers can be read through two interfaces exposed by the kernel:
//! - [`ProcBackend`]: the legacy `/proc/bus/pci` tree, which has no notion of PCI domains.
//! - [`SysfsBackend`]: the per-device `config` files of `/sys/bus/pci/devices`.
//!
//! Both provide the same [`ConfigSpace`] abstraction to the rest of the crate.

mod memory;
mod proc;
mod sysfs;

use crate::config::{Config, Source};
use crate::device::{Address, Device};
use crate::error::Error;
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

pub use memory::MemoryConfigSpace;
pub use proc::{DEFAULT_PROC_DIR, ProcBackend};
pub use sysfs::{DEFAULT_SYSFS_DIR, SysfsBackend};

/// Read access to the configuration space of a single PCI function.
pub trait ConfigSpace {
    /// Returns the address of the function backing this configuration space.
    fn address(&self) -> Address;

    /// Fills `buf` with the bytes located at `offset`. Anything short of a complete read is an
    /// error.
    fn read(&self, buf: &mut [u8], offset: u16) -> Result<(), Error>;

    fn try_read_u8(&self, offset: u16) -> Result<u8, Error> {
        let mut buf = [0; 1];
        self.read(&mut buf, offset)?;
        Ok(buf[0])
    }

    fn try_read_u16(&self, offset: u16) -> Result<u16, Error> {
        let mut buf = [0; 2];
        self.read(&mut buf, offset)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn try_read_u32(&self, offset: u16) -> Result<u32, Error> {
        let mut buf = [0; 4];
        self.read(&mut buf, offset)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a byte register. Failures are logged and read as zero.
    fn read_u8(&self, offset: u16) -> u8 {
        self.try_read_u8(offset)
            .inspect_err(|err| log::error!("{err}"))
            .unwrap_or(0)
    }

    /// Reads a word register. Failures are logged and read as zero.
    fn read_u16(&self, offset: u16) -> u16 {
        self.try_read_u16(offset)
            .inspect_err(|err| log::error!("{err}"))
            .unwrap_or(0)
    }

    /// Reads a dword register. Failures are logged and read as zero.
    fn read_u32(&self, offset: u16) -> u32 {
        self.try_read_u32(offset)
            .inspect_err(|err| log::error!("{err}"))
            .unwrap_or(0)
    }
}

/// Platform interface used to discover the PCI devices and open their configuration space.
pub trait Backend {
    /// Root of the tree accessed by the backend.
    fn access_dir(&self) -> &Path;

    /// Lists all the PCI functions present on the platform.
    fn list_devices(&self) -> Result<Vec<Device>, Error>;

    /// Opens the configuration space of a PCI function.
    fn open(&self, address: &Address) -> Result<Box<dyn ConfigSpace>, Error>;
}

/// Selects the backend requested in the configuration.
///
/// Returns [`None`] when the configured source disables device polling.
pub fn from_config(config: &Config) -> Option<Box<dyn Backend>> {
    let access_dir = config.access_dir();
    match config.source {
        Source::Sysfs => Some(Box::new(SysfsBackend::new(access_dir?))),
        Source::Proc => Some(Box::new(ProcBackend::new(access_dir?))),
        Source::Other => None,
    }
}

/// Configuration space backed by a file exposed by the kernel.
pub struct FileConfigSpace {
    address: Address,
    file: File,
}

impl FileConfigSpace {
    pub fn open(address: Address, path: PathBuf) -> Result<Self, Error> {
        let file = File::open(&path).map_err(|err| {
            log::error!("Failed to open file {}: {err}", path.display());
            Error::OpenFailed(address, err)
        })?;

        Ok(Self { address, file })
    }
}

impl ConfigSpace for FileConfigSpace {
    fn address(&self) -> Address {
        self.address
    }

    fn read(&self, buf: &mut [u8], offset: u16) -> Result<(), Error> {
        let len = self
            .file
            .read_at(buf, offset.into())
            .map_err(|err| Error::ReadFailed {
                address: self.address,
                offset,
                err,
            })?;

        if len != buf.len() {
            return Err(Error::ShortRead {
                address: self.address,
                offset,
                expected: buf.len(),
                actual: len,
            });
        }

        Ok(())
    }
}
