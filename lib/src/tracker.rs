// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Edge detection on the error status registers of the PCIe devices.
//!
//! The status bits are sticky: the hardware keeps them set until software clears them, which the
//! monitor never does. Instead, every device remembers the bits it reported during the previous
//! poll cycle and only the transitions are notified.


use crate::access::{Backend, ConfigSpace};
use crate::catalog::{
    CORRECTABLE_ERRORS, DEVICE_STATUS_ERRORS, ErrorDescriptor, UNCORRECTABLE_ERRORS,
};
use crate::device::{Device, Snapshot};
use crate::error::Error;
use crate::event::{ErrorClass, Event, EventSink, Severity};
use crate::registry::Registry;
use crate::regs::{aer, express};

/// Notification policy applied to the error bits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Notify the errors that are still set at every poll cycle instead of once
    pub persistent: bool,
    /// Notify the errors masked in the AER mask registers
    pub report_masked: bool,
}

/// Change of an error bit since the previous poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Set,
    Cleared,
}

impl Policy {
    /// Tells whether a status register must be evaluated bit by bit.
    #[inline]
    fn has_news(&self, current: u32, previous: u32) -> bool {
        (self.persistent && current != 0) || current != previous
    }

    /// Returns the error bits of `catalog` that must be notified.
    pub fn transitions<'a>(
        &self,
        catalog: &'a [ErrorDescriptor],
        current: u32,
        previous: u32,
        masked: u32,
    ) -> impl Iterator<Item = (&'a ErrorDescriptor, Transition)> + 'a {
        let policy = *self;
        catalog.iter().filter_map(move |error| {
            if !policy.report_masked && error.is_set(masked) {
                return None;
            }

            if error.is_set(current) {
                // Error already reported, notify only if persistent is set
                if !policy.persistent && error.is_set(previous) {
                    return None;
                }
                Some((error, Transition::Set))
            } else if error.is_set(previous) {
                Some((error, Transition::Cleared))
            } else {
                None
            }
        })
    }
}

/// Class of the errors reported in the Device Status register.
fn device_status_class(error: &ErrorDescriptor) -> ErrorClass {
    match error.mask as u16 {
        express::DEVSTA_FED => ErrorClass::Fatal,
        express::DEVSTA_CED => ErrorClass::Correctable,
        _ => ErrorClass::NonFatal,
    }
}

/// Detects the error transitions of the registered devices.
#[derive(Debug, Default, Clone)]
pub struct ErrorTracker {
    policy: Policy,
}

impl ErrorTracker {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Reads the error status registers of a device.
    ///
    /// The registers of the capabilities the device lacks keep their previous value.
    pub fn read_status(
        &self,
        device: &Device,
        space: &dyn ConfigSpace,
    ) -> Result<Snapshot, Error> {
        let mut snapshot = device.snapshot;

        if let Some(cap) = device.express_cap {
            snapshot.device_status =
                space.try_read_u16(cap + express::DEVICE_STATUS)? & express::DEVSTA_ERRORS;
        }

        if let Some(pos) = device.aer_cap {
            snapshot.uncorrectable_errors = space.try_read_u32(pos + aer::UNCOR_STATUS)?;
            snapshot.correctable_errors = space.try_read_u32(pos + aer::COR_STATUS)?;
        }

        Ok(snapshot)
    }

    /// Reports the errors found in the Device Status register.
    pub fn check_device_status(&self, device: &mut Device, status: u16, sink: &mut dyn EventSink) {
        if device.express_cap.is_none() {
            return;
        }

        let previous = device.snapshot.device_status;

        if !self.policy.has_news(status.into(), previous.into()) {
            return;
        }

        let subject = device.address.to_string();
        for (error, transition) in
            self.policy
                .transitions(&DEVICE_STATUS_ERRORS, status.into(), previous.into(), 0)
        {
            let class = device_status_class(error);
            let event = match transition {
                Transition::Set => {
                    log::debug!("{subject}: {} set", error.name);
                    let severity = if class == ErrorClass::Fatal {
                        Severity::Failure
                    } else {
                        Severity::Warning
                    };
                    Event::pcie_error(
                        severity,
                        &subject,
                        Some(class),
                        format!("Device Status Error set: {}", error.name),
                    )
                }
                Transition::Cleared => {
                    log::debug!("{subject}: {} cleared", error.name);
                    Event::pcie_error(
                        Severity::Ok,
                        &subject,
                        Some(class),
                        format!("Device Status Error cleared: {}", error.name),
                    )
                }
            };
            sink.dispatch(event);
        }

        device.snapshot.device_status = status;
    }

    /// Reports the errors found in the AER Uncorrectable Error Status register.
    ///
    /// The class of each error is taken from the AER Uncorrectable Error Severity register as
    /// read during this cycle, including for the errors that were cleared.
    pub fn check_uncorrectable_errors(
        &self,
        device: &mut Device,
        space: &dyn ConfigSpace,
        errors: u32,
        sink: &mut dyn EventSink,
    ) {
        let Some(pos) = device.aer_cap else {
            return;
        };

        let previous = device.snapshot.uncorrectable_errors;

        if self.policy.has_news(errors, previous) {
            let masked = space.read_u32(pos + aer::UNCOR_MASK);
            let severity = space.read_u32(pos + aer::UNCOR_SEVER);
            let subject = device.address.to_string();

            for (error, transition) in
                self.policy
                    .transitions(&UNCORRECTABLE_ERRORS, errors, previous, masked)
            {
                let class = if error.is_set(severity) {
                    ErrorClass::Fatal
                } else {
                    ErrorClass::NonFatal
                };
                let event = match transition {
                    Transition::Set => {
                        log::debug!("{subject}: {}({class}) set", error.name);
                        let severity = if class == ErrorClass::Fatal {
                            Severity::Failure
                        } else {
                            Severity::Warning
                        };
                        Event::pcie_error(
                            severity,
                            &subject,
                            Some(class),
                            format!("Uncorrectable({class}) Error set: {}", error.name),
                        )
                    }
                    Transition::Cleared => {
                        log::debug!("{subject}: {}({class}) cleared", error.name);
                        Event::pcie_error(
                            Severity::Ok,
                            &subject,
                            Some(class),
                            format!("Uncorrectable({class}) Error cleared: {}", error.name),
                        )
                    }
                };
                sink.dispatch(event);
            }
        }

        device.snapshot.uncorrectable_errors = errors;
    }

    /// Reports the errors found in the AER Correctable Error Status register.
    pub fn check_correctable_errors(
        &self,
        device: &mut Device,
        space: &dyn ConfigSpace,
        errors: u32,
        sink: &mut dyn EventSink,
    ) {
        let Some(pos) = device.aer_cap else {
            return;
        };

        let previous = device.snapshot.correctable_errors;

        if self.policy.has_news(errors, previous) {
            let masked = space.read_u32(pos + aer::COR_MASK);
            let subject = device.address.to_string();

            for (error, transition) in
                self.policy
                    .transitions(&CORRECTABLE_ERRORS, errors, previous, masked)
            {
                let (severity, message) = match transition {
                    Transition::Set => {
                        log::debug!("{subject}: {} set", error.name);
                        (Severity::Warning, "Correctable Error set")
                    }
                    Transition::Cleared => {
                        log::debug!("{subject}: {} cleared", error.name);
                        (Severity::Ok, "Correctable Error cleared")
                    }
                };
                sink.dispatch(Event::pcie_error(
                    severity,
                    &subject,
                    Some(ErrorClass::Correctable),
                    format!("{message}: {}", error.name),
                ));
            }
        }

        device.snapshot.correctable_errors = errors;
    }

    /// Reports all the error transitions of a device.
    ///
    /// Nothing is reported and the snapshot of the device is left untouched unless all its status
    /// registers could be read.
    pub fn check(
        &self,
        device: &mut Device,
        space: &dyn ConfigSpace,
        sink: &mut dyn EventSink,
    ) -> Result<(), Error> {
        let status = self.read_status(device, space)?;
        self.check_device_status(device, status.device_status, sink);
        self.check_uncorrectable_errors(device, space, status.uncorrectable_errors, sink);
        self.check_correctable_errors(device, space, status.correctable_errors, sink);
        Ok(())
    }

    /// Runs a poll cycle over all the devices of the registry.
    ///
    /// A device that cannot be read is reported with a failure event and keeps the state observed
    /// during its last successful poll. The remaining devices are still polled.
    pub fn poll(
        &self,
        registry: &mut Registry,
        backend: &dyn Backend,
        sink: &mut dyn EventSink,
    ) -> Result<(), Error> {
        let mut failed = 0;

        for device in registry.devices_mut() {
            let result = backend
                .open(&device.address)
                .and_then(|space| self.check(device, &*space, sink));

            if let Err(err) = result {
                log::error!("{}: {err}", device.address);
                sink.dispatch(Event::failure(
                    device.address.to_string(),
                    "Failed to read device status",
                ));
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(Error::CycleFailed(failed));
        }
        Ok(())
    }
}
