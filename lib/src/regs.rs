// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Layout of the PCI configuration space registers read by the monitor.

/// Registers of the standard configuration header.
pub mod header {
    pub const STATUS: u16 = 0x06;
    /// Status register bit advertising a capability list.
    pub const STATUS_CAP_LIST: u16 = 0x10;
    /// Pointer to the first entry of the capability list.
    pub const CAPABILITY_LIST: u16 = 0x34;
}

/// Standard capability list.
pub mod cap {
    pub const LIST_ID: u16 = 0;
    pub const LIST_NEXT: u16 = 1;
    /// Capability ID of the PCI Express capability structure.
    pub const ID_EXP: u8 = 0x10;
    /// Reserved ID returned when reading unimplemented configuration space.
    pub const ID_TERMINATOR: u8 = 0xff;
}

/// Extended capability list.
pub mod ecap {
    /// Extended capabilities always begin at this offset.
    pub const START: u16 = 0x100;
    /// Extended capability ID of Advanced Error Reporting.
    pub const ID_ERR: u16 = 0x0001;

    #[inline]
    pub fn id(header: u32) -> u16 {
        (header & 0xffff) as u16
    }

    #[inline]
    pub fn next(header: u32) -> u16 {
        ((header >> 20) & 0xffc) as u16
    }
}

/// Registers of the PCI Express capability structure.
pub mod express {
    pub const DEVICE_STATUS: u16 = 0x0a;
    pub const DEVSTA_CED: u16 = 0x01;
    pub const DEVSTA_NFED: u16 = 0x02;
    pub const DEVSTA_FED: u16 = 0x04;
    pub const DEVSTA_URD: u16 = 0x08;
    /// Error bits of the Device Status register.
    pub const DEVSTA_ERRORS: u16 = 0x0f;
}

/// Registers of the Advanced Error Reporting extended capability.
pub mod aer {
    pub const UNCOR_STATUS: u16 = 0x04;
    pub const UNCOR_MASK: u16 = 0x08;
    pub const UNCOR_SEVER: u16 = 0x0c;
    pub const COR_STATUS: u16 = 0x10;
    pub const COR_MASK: u16 = 0x14;

    pub const UNC_DLP: u32 = 0x0000_0010;
    pub const UNC_SURPDN: u32 = 0x0000_0020;
    pub const UNC_POISON_TLP: u32 = 0x0000_1000;
    pub const UNC_FCP: u32 = 0x0000_2000;
    pub const UNC_COMP_TIME: u32 = 0x0000_4000;
    pub const UNC_COMP_ABORT: u32 = 0x0000_8000;
    pub const UNC_UNX_COMP: u32 = 0x0001_0000;
    pub const UNC_RX_OVER: u32 = 0x0002_0000;
    pub const UNC_MALF_TLP: u32 = 0x0004_0000;
    pub const UNC_ECRC: u32 = 0x0008_0000;
    pub const UNC_UNSUP: u32 = 0x0010_0000;
    pub const UNC_ACSV: u32 = 0x0020_0000;
    pub const UNC_INTN: u32 = 0x0040_0000;
    pub const UNC_MCBTLP: u32 = 0x0080_0000;
    pub const UNC_ATOMEG: u32 = 0x0100_0000;
    pub const UNC_TLPPRE: u32 = 0x0200_0000;

    pub const COR_RCVR: u32 = 0x0000_0001;
    pub const COR_BAD_TLP: u32 = 0x0000_0040;
    pub const COR_BAD_DLLP: u32 = 0x0000_0080;
    pub const COR_REP_ROLL: u32 = 0x0000_0100;
    pub const COR_REP_TIMER: u32 = 0x0000_1000;
    pub const COR_ADV_NFAT: u32 = 0x0000_2000;
    pub const COR_INTERNAL: u32 = 0x0000_4000;
    pub const COR_LOG_OVER: u32 = 0x0000_8000;
}
