// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use pcie_errors::prelude::*;
use pcie_errors::regs::{aer, cap, ecap, express, header};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const EXP: u16 = 0x40;
const AER: u16 = 0x100;
const DEVICE: &str = "0000:03:00.0";

const LOG_LINE: &str = "Oct 19 10:00:00 host kernel: pcieport 0000:00:1c.0: AER: \
    0000:03:00.0: PCIe Bus Error: severity=Corrected, type=Physical Layer, id=0300";

/// Emulated platform with a single PCIe device with AER.
struct Platform {
    root: TempDir,
    space: MemoryConfigSpace,
}

impl Platform {
    fn new() -> Self {
        let mut space = MemoryConfigSpace::new(DEVICE.parse().unwrap());
        space.write_u16(header::STATUS, header::STATUS_CAP_LIST);
        space.write_u8(header::CAPABILITY_LIST, EXP as u8);
        space.write_u8(EXP, cap::ID_EXP);
        space.write_u32(AER, u32::from(ecap::ID_ERR) | 0x0002_0000);

        let platform = Self {
            root: tempfile::tempdir().unwrap(),
            space,
        };
        fs::create_dir_all(platform.device_dir()).unwrap();
        platform.sync();
        platform
    }

    fn device_dir(&self) -> PathBuf {
        self.root.path().join("devices").join(DEVICE)
    }

    fn log_file(&self) -> PathBuf {
        self.root.path().join("syslog")
    }

    fn sync(&self) {
        fs::write(self.device_dir().join("config"), self.space.as_bytes()).unwrap();
    }

    fn config(&self) -> Config {
        Config {
            access_dir: Some(self.root.path().to_path_buf()),
            log_file: self.log_file(),
            ..Config::default()
        }
    }
}

fn append(path: &Path, line: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    writeln!(file, "{line}").unwrap();
}

fn read(monitor: &mut Monitor) -> Vec<Event> {
    let mut events = Vec::new();
    monitor.read(&mut events).unwrap();
    events
}

#[test]
fn register_transitions() {
    let mut platform = Platform::new();
    let mut monitor = Monitor::new(platform.config()).unwrap();

    assert_eq!(monitor.registry().len(), 1);
    assert!(monitor.parsers().is_empty());
    assert!(read(&mut monitor).is_empty());

    platform
        .space
        .write_u32(AER + aer::COR_STATUS, aer::COR_BAD_TLP);
    platform.sync();

    let events = read(&mut monitor);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Warning);
    assert_eq!(events[0].subject, DEVICE);
    assert_eq!(events[0].type_instance, Some(ErrorClass::Correctable));
    assert_eq!(events[0].message, "Correctable Error set: Bad TLP Status");

    // Sticky bits are only reported once
    assert!(read(&mut monitor).is_empty());

    platform.space.write_u32(AER + aer::COR_STATUS, 0);
    platform
        .space
        .write_u16(EXP + express::DEVICE_STATUS, express::DEVSTA_FED);
    platform
        .space
        .write_u32(AER + aer::UNCOR_STATUS, aer::UNC_SURPDN);
    platform
        .space
        .write_u32(AER + aer::UNCOR_SEVER, aer::UNC_SURPDN);
    platform.sync();

    let messages: Vec<(Severity, String)> = read(&mut monitor)
        .into_iter()
        .map(|event| (event.severity, event.message))
        .collect();
    assert_eq!(
        messages,
        [
            (Severity::Failure, "Device Status Error set: Fatal Error".to_string()),
            (
                Severity::Failure,
                "Uncorrectable(fatal) Error set: Surprise Down".to_string()
            ),
            (Severity::Ok, "Correctable Error cleared: Bad TLP Status".to_string()),
        ]
    );

    let device = &monitor.registry().devices()[0];
    assert_eq!(device.snapshot.device_status, express::DEVSTA_FED);
    assert_eq!(device.snapshot.uncorrectable_errors, aer::UNC_SURPDN);
    assert_eq!(device.snapshot.correctable_errors, 0);
}

#[test]
fn persistent_notifications() {
    let mut platform = Platform::new();
    let mut monitor = Monitor::new(Config {
        persistent_notifications: true,
        ..platform.config()
    })
    .unwrap();

    platform
        .space
        .write_u32(AER + aer::COR_STATUS, aer::COR_RCVR);
    platform.sync();

    for _ in 0..3 {
        let events = read(&mut monitor);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "Correctable Error set: Receiver Error Status");
    }
}

#[test]
fn device_read_failure() {
    let platform = Platform::new();
    let mut monitor = Monitor::new(Config {
        read_log: true,
        ..platform.config()
    })
    .unwrap();
    fs::write(platform.log_file(), "").unwrap();
    assert!(read(&mut monitor).is_empty());

    append(&platform.log_file(), LOG_LINE);
    fs::remove_file(platform.device_dir().join("config")).unwrap();

    let mut events: Vec<Event> = Vec::new();
    assert!(matches!(
        monitor.read(&mut events),
        Err(Error::CycleFailed(1))
    ));
    // The log file is not read during a failed cycle
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Failure);
    assert_eq!(events[0].subject, DEVICE);
    assert_eq!(events[0].category, "");
    assert_eq!(events[0].type_instance, None);
    assert_eq!(events[0].message, "Failed to read device status");

    // The device keeps its state and the log is read once the device is back
    platform.sync();
    let events = read(&mut monitor);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, "AER correctable error reported in log");
    assert_eq!(monitor.registry().devices()[0].snapshot, Snapshot::default());
}

#[test]
fn log_only() {
    let platform = Platform::new();
    append(&platform.log_file(), LOG_LINE);

    let mut monitor = Monitor::new(Config {
        source: Source::Other,
        read_log: true,
        first_full_read: true,
        ..platform.config()
    })
    .unwrap();
    assert!(monitor.registry().is_empty());
    assert_eq!(monitor.parsers().len(), 1);
    assert_eq!(monitor.parsers()[0].name(), "default");

    let events = read(&mut monitor);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].subject, DEVICE);
    assert_eq!(events[0].type_instance, Some(ErrorClass::Correctable));
    assert_eq!(
        events[0].metadata.get("root port").map(String::as_str),
        Some("0000:00:1c.0")
    );

    assert!(read(&mut monitor).is_empty());

    append(&platform.log_file(), &LOG_LINE.replace("Corrected", "Uncorrected (Fatal)"));
    let events = read(&mut monitor);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Failure);
    assert_eq!(events[0].type_instance, Some(ErrorClass::Fatal));
}

#[test]
fn skip_existing_log() {
    let platform = Platform::new();
    append(&platform.log_file(), LOG_LINE);

    let mut monitor = Monitor::new(Config {
        read_log: true,
        ..platform.config()
    })
    .unwrap();

    assert!(read(&mut monitor).is_empty());
    append(&platform.log_file(), LOG_LINE);
    assert_eq!(read(&mut monitor).len(), 1);
}

#[test]
fn log_read_failure() {
    let platform = Platform::new();
    let mut monitor = Monitor::new(Config {
        source: Source::Other,
        read_log: true,
        ..platform.config()
    })
    .unwrap();

    let mut events: Vec<Event> = Vec::new();
    assert!(matches!(monitor.read(&mut events), Err(Error::LogRead(..))));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Failure);
    assert_eq!(events[0].subject, "");
    assert_eq!(events[0].message, "Failed to read from log file");
}

#[test]
fn invalid_configuration() {
    let platform = Platform::new();

    assert!(matches!(
        Monitor::new(Config {
            source: Source::Other,
            ..platform.config()
        }),
        Err(Error::NoDataSource)
    ));

    let empty = tempfile::tempdir().unwrap();
    fs::create_dir(empty.path().join("devices")).unwrap();
    assert!(matches!(
        Monitor::new(Config {
            access_dir: Some(empty.path().to_path_buf()),
            ..platform.config()
        }),
        Err(Error::NoDevicesFound(_))
    ));

    assert!(matches!(
        Monitor::new(Config {
            read_log: true,
            msg_patterns: vec![ParserConfig {
                name: "broken".to_string(),
                matches: vec![MessagePattern::new("device", "[", true)],
            }],
            ..platform.config()
        }),
        Err(Error::InvalidPattern { .. })
    ));
}

#[test]
fn event_json() {
    let platform = Platform::new();
    append(&platform.log_file(), LOG_LINE);

    let mut monitor = Monitor::new(Config {
        source: Source::Other,
        read_log: true,
        first_full_read: true,
        ..platform.config()
    })
    .unwrap();

    let events = read(&mut monitor);
    let mut json = serde_json::to_value(&events[0]).unwrap();
    assert!(json["timestamp"].is_string());
    json.as_object_mut().unwrap().remove("timestamp");

    assert_eq!(
        json,
        serde_json::json!({
            "severity": "warning",
            "plugin": "pcie_errors",
            "subject": DEVICE,
            "category": "pcie_error",
            "type_instance": "correctable",
            "message": "AER correctable error reported in log",
            "metadata": {
                "root port": "0000:00:1c.0",
                "error type": "Physical Layer",
                "id": "0300"
            }
        })
    );
}
