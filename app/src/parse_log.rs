// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::sink::JsonLines;
use pcie_errors::logfile::to_event;
use pcie_errors::prelude::*;
use std::path::Path;

pub fn parse_log(config: &Config, input: &Path) -> Result<(), Error> {
    let mut sink = JsonLines::new(std::io::stdout().lock());

    for parser in config.parsers() {
        let mut parser = LogParser::new(&parser, input)?;
        let messages = parser.read(true)?;
        log::info!("{}: {} messages found", parser.name(), messages.len());

        for message in &messages {
            sink.dispatch(to_event(message));
        }
    }

    Ok(())
}
