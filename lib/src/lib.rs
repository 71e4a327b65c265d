// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Monitoring of the errors reported by PCI Express devices.
//!
//! The errors are collected from two sources:
//! - the error status registers of the PCI Express and Advanced Error Reporting (AER)
//!   capabilities, read from the configuration space of the devices;
//! - the AER messages printed by the kernel in a log file.
//!
//! Every error that appears or disappears is notified as an [`Event`](event::Event).
//!
//! # Example
//!
//! ```no_run
//! use pcie_errors::prelude::*;
//!
//! let mut monitor = Monitor::new(Config::default()).unwrap();
//! let mut events: Vec<Event> = Vec::new();
//! monitor.read(&mut events).unwrap();
//!
//! for event in events {
//!     println!("{event}");
//! }
//! ```

pub mod access;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod device;
mod error;
pub mod event;
pub mod logfile;
pub mod monitor;
pub mod prelude;
pub mod registry;
pub mod regs;
pub mod tracker;

pub use error::Error;
