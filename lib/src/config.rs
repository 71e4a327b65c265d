// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Configuration of the PCIe error monitor.
//!
//! The configuration is read from a JSON document. Every field is optional:
//!
//! ```
//! use pcie_errors::prelude::*;
//!
//! let config = Config::from_slice(br#"{ "source": "proc", "read_log": true }"#).unwrap();
//! assert_eq!(config.source, Source::Proc);
//! assert_eq!(config.access_dir().unwrap().to_str(), Some("/proc/bus/pci"));
//! ```


use crate::access::{DEFAULT_PROC_DIR, DEFAULT_SYSFS_DIR};
use crate::error::Error;
use crate::logfile::{LogParser, ParserConfig, default_parser};
use crate::tracker::Policy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "/var/log/syslog";

/// Interface used to read the configuration space of the devices.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Source {
    #[default]
    Sysfs,
    Proc,
    /// Unsupported interface. Device polling is disabled.
    Other,
}

impl From<String> for Source {
    fn from(source: String) -> Self {
        match source.to_lowercase().as_str() {
            "sysfs" => Source::Sysfs,
            "proc" => Source::Proc,
            _ => {
                log::warn!("Unsupported source: {source}");
                Source::Other
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: Source,
    /// Root of the `source` tree. The default location of the source is used when empty.
    pub access_dir: Option<PathBuf>,
    pub report_masked: bool,
    pub persistent_notifications: bool,
    pub log_file: PathBuf,
    pub read_log: bool,
    /// Parse the content already present in the log file during the first poll cycle
    pub first_full_read: bool,
    pub msg_patterns: Vec<ParserConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: Source::default(),
            access_dir: None,
            report_masked: false,
            persistent_notifications: false,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            read_log: false,
            first_full_read: false,
            msg_patterns: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        let config: Config = serde_json::from_slice(slice)?;
        log::trace!("Loading config: {config:?}");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = fs::read(path)
            .inspect_err(|err| log::error!("Cannot read {}: {err}", path.display()))?;
        Self::from_slice(&content)
    }

    /// Tells whether the configuration space of the devices is polled.
    pub fn read_devices(&self) -> bool {
        self.source != Source::Other
    }

    /// Returns the root of the tree used to access the devices.
    pub fn access_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.access_dir {
            if !dir.as_os_str().is_empty() {
                return Some(dir.clone());
            }
        }

        match self.source {
            Source::Sysfs => Some(PathBuf::from(DEFAULT_SYSFS_DIR)),
            Source::Proc => Some(PathBuf::from(DEFAULT_PROC_DIR)),
            Source::Other => None,
        }
    }

    pub fn policy(&self) -> Policy {
        Policy {
            persistent: self.persistent_notifications,
            report_masked: self.report_masked,
        }
    }

    /// Returns the configured log parsers, or the default one if none is configured.
    pub fn parsers(&self) -> Vec<ParserConfig> {
        if self.msg_patterns.is_empty() {
            vec![default_parser()]
        } else {
            self.msg_patterns.clone()
        }
    }

    /// Checks the consistency of the configuration.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.read_devices() && !self.read_log {
            log::error!("Plugin is not configured for any source of data");
            return Err(Error::NoDataSource);
        }

        for parser in &self.msg_patterns {
            if parser.name.is_empty() {
                return Err(Error::InvalidConfig("parser without name".to_string()));
            }
            LogParser::new(parser, &self.log_file)?;
        }

        Ok(())
    }
}
