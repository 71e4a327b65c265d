// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! PCI devices tracked by the monitor.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Location of a PCI function in the platform hierarchy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    pub domain: u32,
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl Address {
    pub fn new(domain: u32, bus: u8, device: u8, function: u8) -> Self {
        Self {
            domain,
            bus,
            device,
            function,
        }
    }

    /// Decodes the slot value listed in the proc device table.
    ///
    /// The bus number is stored in the upper byte and the lower byte packs the device (bits 3-7)
    /// and the function (bits 0-2). The domain is not available in this format and defaults to 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use pcie_errors::prelude::*;
    ///
    /// let address = Address::from_proc_slot(0x0300);
    /// assert_eq!(address, Address::new(0, 3, 0, 0));
    /// ```
    pub fn from_proc_slot(slot: u32) -> Self {
        Self {
            domain: 0,
            bus: (slot >> 8) as u8,
            device: ((slot >> 3) & 0x1f) as u8,
            function: (slot & 0x07) as u8,
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parses a `DDDD:BB:DD.F` device name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidDeviceAddress(s.to_string());

        let mut fields = s.split(':');
        let (Some(domain), Some(bus), Some(slot), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };
        let (device, function) = slot.split_once('.').ok_or_else(invalid)?;

        let address = Address {
            domain: u32::from_str_radix(domain, 16).map_err(|_| invalid())?,
            bus: u8::from_str_radix(bus, 16).map_err(|_| invalid())?,
            device: u8::from_str_radix(device, 16).map_err(|_| invalid())?,
            function: function.parse().map_err(|_| invalid())?,
        };

        if address.device > 0x1f || address.function > 0x07 {
            return Err(invalid());
        }

        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:02x}:{:02x}.{}",
            self.domain, self.bus, self.device, self.function
        )
    }
}

/// Error bits observed on a device during the previous poll cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Error bits of the Device Status register
    pub device_status: u16,
    /// AER Correctable Error Status register
    pub correctable_errors: u32,
    /// AER Uncorrectable Error Status register
    pub uncorrectable_errors: u32,
}

/// A PCI function registered for polling.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Device {
    pub address: Address,
    /// Offset of the PCI Express capability structure
    pub express_cap: Option<u16>,
    /// Offset of the Advanced Error Reporting extended capability
    pub aer_cap: Option<u16>,
    /// Last observed state of the error registers
    pub snapshot: Snapshot,
}

impl Device {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Device::default()
        }
    }

    /// Returns the classification of the device established by the capability walk.
    pub fn kind(&self) -> DeviceKind {
        match (self.express_cap, self.aer_cap) {
            (None, _) => DeviceKind::Conventional,
            (Some(_), None) => DeviceKind::Express,
            (Some(_), Some(_)) => DeviceKind::ExpressWithAer,
        }
    }
}

/// Classification of a PCI function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Not a PCI Express device
    Conventional,
    /// PCI Express device without Advanced Error Reporting
    Express,
    /// PCI Express device with Advanced Error Reporting
    ExpressWithAer,
}
