// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Convenience re-export of common structs

pub use crate::access::{Backend, ConfigSpace, MemoryConfigSpace, ProcBackend, SysfsBackend};
pub use crate::config::{Config, Source};
pub use crate::device::{Address, Device, DeviceKind, Snapshot};
pub use crate::error::Error;
pub use crate::event::{ErrorClass, Event, EventSink, Severity};
pub use crate::logfile::{LogParser, Message, MessagePattern, ParserConfig};
pub use crate::monitor::Monitor;
pub use crate::registry::Registry;
pub use crate::tracker::{ErrorTracker, Policy};
