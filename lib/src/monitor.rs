// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Poll cycle of the PCIe error monitor.
//!
//! A [`Monitor`] owns everything a poll cycle needs: the backend used to read the devices, the
//! registry of the polled devices and the log parsers. It is created once at startup and released
//! on shutdown.

use crate::access::{self, Backend};
use crate::config::Config;
use crate::error::Error;
use crate::event::{Event, EventSink};
use crate::logfile::{LogParser, to_event};
use crate::registry::Registry;
use crate::tracker::ErrorTracker;

pub struct Monitor {
    backend: Option<Box<dyn Backend>>,
    registry: Registry,
    tracker: ErrorTracker,
    parsers: Vec<LogParser>,
    first_read: bool,
}

impl Monitor {
    /// Creates a monitor from its configuration, discovering the PCIe devices of the platform.
    pub fn new(config: Config) -> Result<Self, Error> {
        let backend = if config.read_devices() {
            access::from_config(&config)
        } else {
            None
        };

        Self::with_backend(config, backend)
    }

    /// Creates a monitor reading the devices through the given `backend`.
    pub fn with_backend(config: Config, backend: Option<Box<dyn Backend>>) -> Result<Self, Error> {
        config
            .validate()
            .inspect_err(|err| log::error!("Invalid configuration: {err}"))?;

        let registry = match &backend {
            Some(backend) => Registry::discover(backend.as_ref())?,
            None => Registry::default(),
        };

        let parsers = if config.read_log {
            if config.msg_patterns.is_empty() {
                log::info!("Using default message parser");
            }
            config
                .parsers()
                .iter()
                .map(|parser| LogParser::new(parser, &config.log_file))
                .collect::<Result<Vec<_>, Error>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            tracker: ErrorTracker::new(config.policy()),
            first_read: config.first_full_read,
            backend,
            registry,
            parsers,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn parsers(&self) -> &[LogParser] {
        &self.parsers
    }

    /// Runs a single poll cycle, dispatching the events to `sink`.
    ///
    /// The log file is not read if a device could not be polled.
    pub fn read(&mut self, sink: &mut dyn EventSink) -> Result<(), Error> {
        if let Some(backend) = &self.backend {
            self.tracker
                .poll(&mut self.registry, backend.as_ref(), sink)?;
        }

        let replay = self.first_read;
        for parser in &mut self.parsers {
            let messages = parser.read(replay).map_err(|err| {
                log::error!("{}: {err}", parser.name());
                sink.dispatch(Event::failure("", "Failed to read from log file"));
                err
            })?;

            for message in &messages {
                sink.dispatch(to_event(message));
            }
        }

        self.first_read = false;
        Ok(())
    }
}
