// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use super::pattern::{MessagePattern, ParserConfig};
use crate::error::Error;
use regex::Regex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Value extracted from a log message for one of the patterns of a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageItem {
    pub name: String,
    pub value: String,
}

/// Fields extracted from a log message, in the order of the patterns that matched them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Message {
    pub items: Vec<MessageItem>,
}

impl Message {
    /// Returns the value of a field of the message.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value.as_str())
    }
}

struct CompiledPattern {
    name: String,
    regex: Regex,
    submatch_idx: usize,
    exclude: Option<Regex>,
    is_mandatory: bool,
}

impl CompiledPattern {
    fn new(parser: &str, pattern: &MessagePattern) -> Result<Self, Error> {
        let compile = |regex: &str| {
            Regex::new(regex).map_err(|err| Error::InvalidPattern {
                parser: parser.to_string(),
                pattern: pattern.name.clone(),
                err,
            })
        };

        Ok(Self {
            name: pattern.name.clone(),
            regex: compile(&pattern.regex)?,
            submatch_idx: pattern.submatch_idx,
            exclude: pattern.exclude_regex.as_deref().map(compile).transpose()?,
            is_mandatory: pattern.is_mandatory,
        })
    }

    fn capture(&self, line: &str) -> Option<String> {
        if self.exclude.as_ref().is_some_and(|exclude| exclude.is_match(line)) {
            return None;
        }
        let captures = self.regex.captures(line)?;
        Some(captures.get(self.submatch_idx)?.as_str().to_string())
    }
}

/// Extracts messages from the lines appended to a log file.
///
/// A message starts on a line matched by the first pattern and ends on a line matched by the
/// last pattern. Both can be the same line. A message missing a mandatory field is dropped.
pub struct LogParser {
    name: String,
    path: PathBuf,
    patterns: Vec<CompiledPattern>,
    /// Position reached in the log file, unknown until the first read
    offset: Option<u64>,
    /// Inode of the log file during the previous read
    inode: Option<u64>,
    /// Fields of the message being assembled
    pending: Option<Vec<Option<String>>>,
}

impl LogParser {
    pub fn new(config: &ParserConfig, path: &Path) -> Result<Self, Error> {
        if config.matches.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "{} parser has no patterns",
                config.name
            )));
        }

        let patterns = config
            .matches
            .iter()
            .map(|pattern| CompiledPattern::new(&config.name, pattern))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            name: config.name.clone(),
            path: path.to_path_buf(),
            patterns,
            offset: None,
            inode: None,
            pending: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the messages found in the lines appended to the log file since the previous call.
    ///
    /// On the first call, the content already present in the file is only parsed if `replay` is
    /// set. Otherwise, parsing starts from the current end of the file.
    pub fn read(&mut self, replay: bool) -> Result<Vec<Message>, Error> {
        let path = self.path.clone();
        let log_error = |err| Error::LogRead(path.clone(), err);

        let mut file = File::open(&self.path).map_err(log_error)?;
        let metadata = file.metadata().map_err(log_error)?;
        let len = metadata.len();

        // A new file was created in place of the previous one
        let rotated = self.inode.is_some_and(|inode| inode != metadata.ino());
        self.inode = Some(metadata.ino());

        let start = match self.offset {
            None if !replay => {
                log::debug!("{}: skipping {len} bytes of {}", self.name, path.display());
                self.offset = Some(len);
                return Ok(Vec::new());
            }
            None => 0,
            Some(offset) if offset <= len && !rotated => offset,
            Some(_) => {
                log::info!(
                    "{} was rotated or truncated, reading from the beginning",
                    path.display()
                );
                self.pending = None;
                0
            }
        };

        file.seek(SeekFrom::Start(start)).map_err(log_error)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(log_error)?;

        // An incomplete last line is parsed during the next read
        let consumed = buf
            .iter()
            .rposition(|byte| *byte == b'\n')
            .map_or(0, |pos| pos + 1);
        self.offset = Some(start + consumed as u64);

        let messages: Vec<Message> = buf[..consumed]
            .split(|byte| *byte == b'\n')
            .filter_map(|line| {
                let line = String::from_utf8_lossy(line);
                self.parse_line(line.trim_end_matches('\r'))
            })
            .collect();

        log::debug!("{}: read {} messages", self.name, messages.len());
        Ok(messages)
    }

    /// Feeds a single line to the parser. Returns the message completed by this line, if any.
    pub fn parse_line(&mut self, line: &str) -> Option<Message> {
        let captures: Vec<Option<String>> = self
            .patterns
            .iter()
            .map(|pattern| pattern.capture(line))
            .collect();

        if captures.first().is_some_and(Option::is_some) {
            if self.pending.is_some() {
                log::debug!("{}: dropping incomplete message", self.name);
            }
            self.pending = Some(vec![None; self.patterns.len()]);
        }

        let complete = captures.last().is_some_and(Option::is_some);
        let pending = self.pending.as_mut()?;
        for (field, capture) in pending.iter_mut().zip(captures) {
            if capture.is_some() {
                *field = capture;
            }
        }

        if !complete {
            return None;
        }

        let fields = self.pending.take()?;
        if let Some(pattern) = self
            .patterns
            .iter()
            .zip(fields.iter())
            .find_map(|(pattern, field)| (pattern.is_mandatory && field.is_none()).then_some(pattern))
        {
            log::debug!(
                "{}: dropping message without mandatory {}",
                self.name,
                pattern.name
            );
            return None;
        }

        Some(Message {
            items: self
                .patterns
                .iter()
                .zip(fields)
                .filter_map(|(pattern, field)| {
                    Some(MessageItem {
                        name: pattern.name.clone(),
                        value: field?,
                    })
                })
                .collect(),
        })
    }
}
