// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use pcie_errors::prelude::*;

#[test]
fn parse_address() {
    let address: Address = "0000:00:1c.7".parse().unwrap();
    assert_eq!(address, Address::new(0, 0, 0x1c, 7));

    let address: Address = "10000:af:1F.0".parse().unwrap();
    assert_eq!(address, Address::new(0x10000, 0xaf, 0x1f, 0));
}

#[test]
fn parse_invalid_address() {
    for name in [
        "",
        "devices",
        "00:1c.0",
        "0000:00:1c",
        "0000:00:1c.8",
        "0000:00:20.0",
        "0000:100:00.0",
        "0000:00:00.0:0",
        "000g:00:00.0",
    ] {
        assert!(
            matches!(name.parse::<Address>(), Err(Error::InvalidDeviceAddress(_))),
            "{name} should be rejected"
        );
    }
}

#[test]
fn display_address() {
    assert_eq!(Address::new(0, 3, 0, 0).to_string(), "0000:03:00.0");
    assert_eq!(Address::new(0x1f, 0xaf, 0x1c, 7).to_string(), "001f:af:1c.7");

    let address = Address::new(0xa, 0x5e, 0x11, 3);
    assert_eq!(address.to_string().parse::<Address>().unwrap(), address);
}

#[test]
fn proc_slot() {
    assert_eq!(Address::from_proc_slot(0x0000), Address::new(0, 0, 0, 0));
    assert_eq!(Address::from_proc_slot(0x00e0), Address::new(0, 0, 0x1c, 0));
    assert_eq!(Address::from_proc_slot(0x00e7), Address::new(0, 0, 0x1c, 7));
    assert_eq!(Address::from_proc_slot(0xaf09), Address::new(0, 0xaf, 1, 1));
}

#[test]
fn device_kind() {
    let mut device = Device::new(Address::new(0, 3, 0, 0));
    assert_eq!(device.kind(), DeviceKind::Conventional);
    assert_eq!(device.snapshot, Snapshot::default());

    device.express_cap = Some(0x40);
    assert_eq!(device.kind(), DeviceKind::Express);

    device.aer_cap = Some(0x100);
    assert_eq!(device.kind(), DeviceKind::ExpressWithAer);
}
