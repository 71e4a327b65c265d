// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Discovery of the capability structures stored in the configuration space.
//!
//! Both the standard and the extended capabilities are stored as singly-linked lists whose
//! headers carry the ID of the capability and the offset of the next entry. The content of the
//! configuration space is not trusted: the walks stop on the terminator, on backward links and
//! after a bounded number of entries.


use crate::access::ConfigSpace;
use crate::regs::{cap, ecap, header};

/// Maximum number of entries in the standard capability list. Each entry takes at least 4 bytes
/// in the 192 bytes that follow the configuration header.
pub const MAX_CAPABILITIES: usize = 48;

/// Maximum number of entries in the extended capability list. Each entry takes at least 8 bytes
/// in the extended configuration space.
pub const MAX_EXTENDED_CAPABILITIES: usize = (4096 - ecap::START as usize) / 8;

/// Header of a capability found in the configuration space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability<T> {
    pub id: T,
    pub offset: u16,
}

/// An iterator over the standard capability list.
pub struct Capabilities<'a> {
    space: &'a dyn ConfigSpace,
    pos: u16,
    remaining: usize,
}

impl<'a> Capabilities<'a> {
    pub fn new(space: &'a dyn ConfigSpace) -> Self {
        Self {
            space,
            // List entries are DWORD-aligned
            pos: (space.read_u8(header::CAPABILITY_LIST) & !3).into(),
            remaining: MAX_CAPABILITIES,
        }
    }
}

impl Iterator for Capabilities<'_> {
    type Item = Capability<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos == 0 {
            return None;
        }

        if self.remaining == 0 {
            log::warn!(
                "{}: capability list exceeds {MAX_CAPABILITIES} entries",
                self.space.address()
            );
            self.pos = 0;
            return None;
        }
        self.remaining -= 1;

        let offset = self.pos;
        let id = self.space.read_u8(offset + cap::LIST_ID);
        if id == cap::ID_TERMINATOR {
            log::debug!(
                "{}: capability list terminated at {offset:#x}",
                self.space.address()
            );
            self.pos = 0;
            return None;
        }

        self.pos = (self.space.read_u8(offset + cap::LIST_NEXT) & !3).into();
        Some(Capability { id, offset })
    }
}

/// An iterator over the extended capability list.
pub struct ExtendedCapabilities<'a> {
    space: &'a dyn ConfigSpace,
    pos: u16,
    remaining: usize,
}

impl<'a> ExtendedCapabilities<'a> {
    pub fn new(space: &'a dyn ConfigSpace) -> Self {
        Self {
            space,
            pos: ecap::START,
            remaining: MAX_EXTENDED_CAPABILITIES,
        }
    }
}

impl Iterator for ExtendedCapabilities<'_> {
    type Item = Capability<u16>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos == 0 || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let offset = self.pos;
        let header = self.space.read_u32(offset);
        let id = ecap::id(header);
        let next = ecap::next(header);

        if offset == ecap::START && id == 0 && next == 0 {
            // No extended capabilities
            self.pos = 0;
            return None;
        }

        self.pos = match next {
            0 => 0,
            next if next <= ecap::START => {
                log::debug!(
                    "{}: invalid extended capability link {offset:#x} -> {next:#x}",
                    self.space.address()
                );
                0
            }
            next => next,
        };

        Some(Capability { id, offset })
    }
}

/// Returns the offset of the PCI Express capability structure, if the device has one.
pub fn find_express_capability(space: &dyn ConfigSpace) -> Option<u16> {
    let found = Capabilities::new(space)
        .find(|capability| capability.id == cap::ID_EXP)
        .map(|capability| capability.offset);

    if found.is_none() {
        log::debug!("Cannot find CAP EXP for {}", space.address());
    }

    found
}

/// Returns the offset of the Advanced Error Reporting extended capability, if the device has one.
pub fn find_aer_capability(space: &dyn ConfigSpace) -> Option<u16> {
    ExtendedCapabilities::new(space)
        .find(|capability| capability.id == ecap::ID_ERR)
        .map(|capability| capability.offset)
}
