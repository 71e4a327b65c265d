// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::ConfigSpace;
use crate::device::Address;
use crate::error::Error;

/// Size of the PCI Express extended configuration space.
pub const CONFIG_SPACE_SIZE: usize = 4096;

/// Configuration space stored in memory.
///
/// Used to inspect configuration space dumps and to emulate devices.
///
/// # Examples
///
/// ```
/// use pcie_errors::prelude::*;
///
/// let mut space = MemoryConfigSpace::new(Address::default());
/// space.write_u16(0x0a, 0x4);
/// assert_eq!(space.read_u16(0x0a), 0x4);
/// assert_eq!(space.read_u32(0x1000), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryConfigSpace {
    address: Address,
    data: Vec<u8>,
}

impl MemoryConfigSpace {
    /// Returns a zeroed configuration space of 4KiB.
    pub fn new(address: Address) -> Self {
        Self::from_slice(address, &[0; CONFIG_SPACE_SIZE])
    }

    /// Wraps a configuration space dump. The dump can be truncated, in which case reading past
    /// its end fails.
    pub fn from_slice(address: Address, s: &[u8]) -> Self {
        Self {
            address,
            data: Vec::from(s),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn write(&mut self, offset: u16, bytes: &[u8]) {
        let begin = offset as usize;
        let end = begin + bytes.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[begin..end].copy_from_slice(bytes);
    }

    pub fn write_u8(&mut self, offset: u16, value: u8) {
        self.write(offset, &[value])
    }

    pub fn write_u16(&mut self, offset: u16, value: u16) {
        self.write(offset, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, offset: u16, value: u32) {
        self.write(offset, &value.to_le_bytes())
    }
}

impl ConfigSpace for MemoryConfigSpace {
    fn address(&self) -> Address {
        self.address
    }

    fn read(&self, buf: &mut [u8], offset: u16) -> Result<(), Error> {
        let begin = (offset as usize).min(self.data.len());
        let available = &self.data[begin..];
        if available.len() < buf.len() {
            return Err(Error::ShortRead {
                address: self.address,
                offset,
                expected: buf.len(),
                actual: available.len(),
            });
        }
        buf.copy_from_slice(&available[..buf.len()]);
        Ok(())
    }
}
