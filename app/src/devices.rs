// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use pcie_errors::access;
use pcie_errors::prelude::*;

fn discover(config: &Config) -> Result<Registry, Error> {
    let backend = access::from_config(config).ok_or_else(|| {
        Error::InvalidConfig(format!("device polling disabled for {:?}", config.source))
    })?;
    Registry::discover(backend.as_ref())
}

fn offset(offset: Option<u16>) -> String {
    offset.map_or("-".to_string(), |offset| format!("{offset:#05x}"))
}

pub fn compact(config: &Config) -> Result<(), Error> {
    let registry = discover(config)?;

    println!("Device        PCIe   AER  ");
    println!("------------- ------ -----");
    for device in registry.devices() {
        println!(
            "{:<13} {:<6} {}",
            device.address.to_string(),
            offset(device.express_cap),
            offset(device.aer_cap)
        );
    }

    Ok(())
}

pub fn markdown(config: &Config) -> Result<(), Error> {
    let registry = discover(config)?;

    let header = format!("| {:<12} | {:<6} | {:<6} |", "Device", "PCIe", "AER");
    println!("{header}");
    println!("{}", "-".repeat(header.len()));

    for device in registry.devices() {
        println!(
            "| {:<12} | {:<6} | {:<6} |",
            device.address.to_string(),
            offset(device.express_cap),
            offset(device.aer_cap)
        );
    }

    Ok(())
}
