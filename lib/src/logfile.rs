// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Detection of the PCIe errors reported by the kernel in a log file.
//!
//! A [`LogParser`] tails the log file and groups the matched lines into [`Message`]s according to
//! an ordered list of [`MessagePattern`]s. Each message is then turned into an
//! [`Event`](crate::event::Event) by [`to_event`].

mod extract;
mod parser;
mod pattern;

pub use extract::{classify_severity, to_event};
pub use parser::{LogParser, Message, MessageItem};
pub use pattern::{MessagePattern, ParserConfig, default_parser, fields};
