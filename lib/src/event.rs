// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Notifications emitted by the monitor.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const PLUGIN: &str = "pcie_errors";
/// Category of the notifications that report PCIe errors.
pub const PCIE_ERROR: &str = "pcie_error";

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Failure,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "OKAY"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Class of a PCIe error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Correctable,
    Fatal,
    NonFatal,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Correctable => "correctable",
            ErrorClass::Fatal => "fatal",
            ErrorClass::NonFatal => "non_fatal",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured notification describing an error transition or a failure of the monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub plugin: &'static str,
    /// Device or port the event relates to
    pub subject: String,
    /// Empty for failures of the monitor itself
    pub category: &'static str,
    pub type_instance: Option<ErrorClass>,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Event {
    /// Returns a PCIe error notification.
    pub fn pcie_error(
        severity: Severity,
        subject: impl Into<String>,
        class: Option<ErrorClass>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            plugin: PLUGIN,
            subject: subject.into(),
            category: PCIE_ERROR,
            type_instance: class,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Returns a notification reporting that the monitor failed to collect data.
    pub fn failure(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: "",
            ..Event::pcie_error(Severity::Failure, subject, None, message)
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] ", self.severity)?;
        if !self.subject.is_empty() {
            write!(f, "{}: ", self.subject)?;
        }
        write!(f, "{}", self.message)
    }
}

/// Destination of the events produced by the monitor.
pub trait EventSink {
    fn dispatch(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn dispatch(&mut self, event: Event) {
        self.push(event)
    }
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn dispatch(&mut self, event: Event) {
        (**self).dispatch(event)
    }
}
