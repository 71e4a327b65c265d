// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use pcie_errors::prelude::*;
use serde::Serialize;
use std::io::Write;

const HOSTNAME_PATH: &str = "/proc/sys/kernel/hostname";

#[derive(Serialize)]
struct HostEvent<'a> {
    host: &'a str,
    #[serde(flatten)]
    event: &'a Event,
}

/// Writes the events as JSON objects, one per line.
pub struct JsonLines<W: Write> {
    host: String,
    writer: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(writer: W) -> Self {
        let host = std::fs::read_to_string(HOSTNAME_PATH)
            .map(|host| host.trim().to_string())
            .ok()
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| "localhost".to_string());

        Self { host, writer }
    }
}

impl<W: Write> EventSink for JsonLines<W> {
    fn dispatch(&mut self, event: Event) {
        log::debug!("{event}");

        let line = HostEvent {
            host: &self.host,
            event: &event,
        };
        let result = serde_json::to_writer(&mut self.writer, &line)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.writer))
            .and_then(|()| self.writer.flush());

        if let Err(err) = result {
            log::error!("Failed to write event: {err}");
        }
    }
}
