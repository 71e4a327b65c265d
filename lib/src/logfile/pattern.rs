// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use serde::Deserialize;

/// Names of the fields interpreted when building an event from a log message.
pub mod fields {
    pub const ROOT_PORT: &str = "root port";
    pub const DEVICE: &str = "device";
    pub const SEVERITY: &str = "severity";
    pub const ERROR_TYPE: &str = "error type";
    pub const ID: &str = "id";
}

/// Rule extracting a single field out of a log line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessagePattern {
    /// Name of the field
    pub name: String,
    /// Regular expression matched against the log lines
    pub regex: String,
    /// Index of the capture group holding the value of the field
    #[serde(default = "default_submatch_idx")]
    pub submatch_idx: usize,
    /// Lines matching this regular expression are ignored by the pattern
    #[serde(default)]
    pub exclude_regex: Option<String>,
    /// Messages are dropped if this field is missing
    #[serde(default)]
    pub is_mandatory: bool,
}

// A single capture group is the most common case
fn default_submatch_idx() -> usize {
    1
}

impl MessagePattern {
    pub fn new(name: &str, regex: &str, is_mandatory: bool) -> Self {
        Self {
            name: name.to_string(),
            regex: regex.to_string(),
            submatch_idx: default_submatch_idx(),
            exclude_regex: None,
            is_mandatory,
        }
    }
}

/// Named and ordered set of patterns evaluated against the same log file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    pub name: String,
    pub matches: Vec<MessagePattern>,
}

/// Returns the parser used when none is configured. It matches the AER messages printed by the
/// `pcieport` driver of the Linux kernel.
pub fn default_parser() -> ParserConfig {
    ParserConfig {
        name: "default".to_string(),
        matches: vec![
            MessagePattern::new(fields::ROOT_PORT, "pcieport (.*): AER:", true),
            MessagePattern::new(fields::DEVICE, r" ([0-9a-fA-F:\.]*): PCIe Bus Error", true),
            MessagePattern::new(fields::SEVERITY, "severity=([^,]*)", true),
            MessagePattern::new(fields::ERROR_TYPE, "type=(.*),", false),
            MessagePattern::new(fields::ID, ", id=(.*)", true),
        ],
    }
}
