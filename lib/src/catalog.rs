// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Static descriptions of the error bits reported by PCI Express devices.

use crate::regs::{aer, express};

/// Associates a bit of a status register to a human readable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub mask: u32,
    pub name: &'static str,
}

impl ErrorDescriptor {
    const fn new(mask: u32, name: &'static str) -> Self {
        Self { mask, name }
    }

    #[inline]
    pub fn is_set(&self, value: u32) -> bool {
        self.mask & value != 0
    }
}

/// Errors of the Device Status register.
pub const DEVICE_STATUS_ERRORS: [ErrorDescriptor; 4] = [
    ErrorDescriptor::new(express::DEVSTA_CED as u32, "Correctable Error"),
    ErrorDescriptor::new(express::DEVSTA_NFED as u32, "Non-Fatal Error"),
    ErrorDescriptor::new(express::DEVSTA_FED as u32, "Fatal Error"),
    ErrorDescriptor::new(express::DEVSTA_URD as u32, "Unsupported Request"),
];

/// Errors of the AER Uncorrectable Error Status register.
pub const UNCORRECTABLE_ERRORS: [ErrorDescriptor; 16] = [
    ErrorDescriptor::new(aer::UNC_DLP, "Data Link Protocol"),
    ErrorDescriptor::new(aer::UNC_SURPDN, "Surprise Down"),
    ErrorDescriptor::new(aer::UNC_POISON_TLP, "Poisoned TLP"),
    ErrorDescriptor::new(aer::UNC_FCP, "Flow Control Protocol"),
    ErrorDescriptor::new(aer::UNC_COMP_TIME, "Completion Timeout"),
    ErrorDescriptor::new(aer::UNC_COMP_ABORT, "Completer Abort"),
    ErrorDescriptor::new(aer::UNC_UNX_COMP, "Unexpected Completion"),
    ErrorDescriptor::new(aer::UNC_RX_OVER, "Receiver Overflow"),
    ErrorDescriptor::new(aer::UNC_MALF_TLP, "Malformed TLP"),
    ErrorDescriptor::new(aer::UNC_ECRC, "ECRC Error Status"),
    ErrorDescriptor::new(aer::UNC_UNSUP, "Unsupported Request"),
    ErrorDescriptor::new(aer::UNC_ACSV, "ACS Violation"),
    ErrorDescriptor::new(aer::UNC_INTN, "Internal"),
    ErrorDescriptor::new(aer::UNC_MCBTLP, "MC blocked TLP"),
    ErrorDescriptor::new(aer::UNC_ATOMEG, "Atomic egress blocked"),
    ErrorDescriptor::new(aer::UNC_TLPPRE, "TLP prefix blocked"),
];

/// Errors of the AER Correctable Error Status register.
pub const CORRECTABLE_ERRORS: [ErrorDescriptor; 8] = [
    ErrorDescriptor::new(aer::COR_RCVR, "Receiver Error Status"),
    ErrorDescriptor::new(aer::COR_BAD_TLP, "Bad TLP Status"),
    ErrorDescriptor::new(aer::COR_BAD_DLLP, "Bad DLLP Status"),
    ErrorDescriptor::new(aer::COR_REP_ROLL, "REPLAY_NUM Rollover"),
    ErrorDescriptor::new(aer::COR_REP_TIMER, "Replay Timer Timeout"),
    ErrorDescriptor::new(aer::COR_ADV_NFAT, "Advisory Non-Fatal"),
    ErrorDescriptor::new(aer::COR_INTERNAL, "Corrected Internal"),
    ErrorDescriptor::new(aer::COR_LOG_OVER, "Header Log Overflow"),
];
