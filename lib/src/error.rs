// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::device::Address;
use std::path::PathBuf;
use std::{fmt, io};

/// Errors reported by the PCIe error monitor.
#[derive(Debug)]
pub enum Error {
    InvalidConfig(String),
    NoDataSource,
    DeviceListUnavailable(PathBuf, io::Error),
    NoDevicesFound(PathBuf),
    InvalidDeviceAddress(String),
    OpenFailed(Address, io::Error),
    ReadFailed {
        address: Address,
        offset: u16,
        err: io::Error,
    },
    ShortRead {
        address: Address,
        offset: u16,
        expected: usize,
        actual: usize,
    },
    InvalidPattern {
        parser: String,
        pattern: String,
        err: regex::Error,
    },
    LogRead(PathBuf, io::Error),
    CycleFailed(usize),
    JsonError(serde_json::Error),
    IOError(io::Error),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidConfig(reason) => write!(f, "Invalid configuration: {reason}"),
            Error::NoDataSource => write!(f, "Not configured for any source of data"),
            Error::DeviceListUnavailable(path, err) => {
                write!(f, "Cannot get devices list from {}: {err}", path.display())
            }
            Error::NoDevicesFound(path) => {
                write!(f, "No PCIe devices found in {}", path.display())
            }
            Error::InvalidDeviceAddress(name) => write!(f, "Invalid device address: {name}"),
            Error::OpenFailed(address, err) => write!(f, "{address}: failed to open: {err}"),
            Error::ReadFailed {
                address,
                offset,
                err,
            } => write!(f, "Failed to read {address} at pos {offset:#x}: {err}"),
            Error::ShortRead {
                address,
                offset,
                expected,
                actual,
            } => write!(
                f,
                "{address}: read only {actual} bytes at pos {offset:#x}, should be {expected}"
            ),
            Error::InvalidPattern {
                parser,
                pattern,
                err,
            } => write!(f, "Invalid regex in {parser} parser, pattern {pattern}: {err}"),
            Error::LogRead(path, err) => {
                write!(f, "Failed to read from log file {}: {err}", path.display())
            }
            Error::CycleFailed(count) => {
                write!(f, "Failed to read the state of {count} device(s)")
            }
            Error::JsonError(err) => write!(f, "Invalid JSON file: {err}"),
            Error::IOError(err) => write!(f, "Encountered IO error: {err}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IOError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}
