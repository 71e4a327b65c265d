// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::parser::Message;
use super::pattern::fields;
use crate::event::{ErrorClass, Event, Severity};

/// Classifies the severity printed in a log message.
///
/// "fatal" is also a substring of "non-fatal", so the non-fatal errors must be tested first.
///
/// # Examples
///
/// ```
/// use pcie_errors::prelude::*;
/// use pcie_errors::logfile::classify_severity;
///
/// assert_eq!(classify_severity("Uncorrected (Non-Fatal)"), (Severity::Warning, ErrorClass::NonFatal));
/// assert_eq!(classify_severity("Uncorrected (Fatal)"), (Severity::Failure, ErrorClass::Fatal));
/// assert_eq!(classify_severity("Corrected"), (Severity::Warning, ErrorClass::Correctable));
/// ```
pub fn classify_severity(value: &str) -> (Severity, ErrorClass) {
    let value = value.to_lowercase();
    if value.contains("non-fatal") {
        (Severity::Warning, ErrorClass::NonFatal)
    } else if value.contains("fatal") {
        (Severity::Failure, ErrorClass::Fatal)
    } else {
        (Severity::Warning, ErrorClass::Correctable)
    }
}

/// Builds the event notifying an error reported in the log file.
///
/// The severity field sets the class of the error, the device field identifies the subject of the
/// event and all the other fields are attached as metadata.
pub fn to_event(message: &Message) -> Event {
    let mut severity = Severity::Warning;
    let mut class = None;
    let mut subject = String::new();
    let mut metadata = Vec::new();

    for (i, item) in message.items.iter().enumerate() {
        if item.value.is_empty() {
            continue;
        }

        log::debug!("[{i:02}] {}:{}", item.name, item.value);

        if item.name.starts_with(fields::SEVERITY) {
            let (item_severity, item_class) = classify_severity(&item.value);
            severity = item_severity;
            class = Some(item_class);
        } else if item.name.starts_with(fields::DEVICE) {
            subject = item.value.clone();
        } else {
            metadata.push((item.name.clone(), item.value.clone()));
        }
    }

    let message = format!(
        "AER {} error reported in log",
        class.map(|class| class.as_str()).unwrap_or_default()
    );

    metadata.into_iter().fold(
        Event::pcie_error(severity, subject, class, message),
        |event, (key, value)| event.with_metadata(key, value),
    )
}
