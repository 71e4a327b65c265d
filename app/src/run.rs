// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::sink::JsonLines;
use pcie_errors::prelude::*;
use std::thread;
use std::time::Duration;

pub fn run(config: Config, interval: u64, once: bool) -> Result<(), Error> {
    let mut monitor = Monitor::new(config)?;
    log::info!(
        "Monitoring {} PCIe devices and {} log parsers",
        monitor.registry().len(),
        monitor.parsers().len()
    );

    for parser in monitor.parsers() {
        log::info!("{} parser reading {}", parser.name(), parser.path().display());
    }

    let mut sink = JsonLines::new(std::io::stdout().lock());

    if once {
        return monitor.read(&mut sink);
    }

    loop {
        if let Err(err) = monitor.read(&mut sink) {
            log::error!("Poll cycle failed: {err}");
        }
        thread::sleep(Duration::from_secs(interval));
    }
}
