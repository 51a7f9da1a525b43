// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::Level;

/// The timestamp layout of persisted log lines, e.g. `2024-08-11 22:44:57.172`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S.%3f";

/// A single log record, created once per call and shared by every sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    timestamp: Timestamp,
    level: Level,
    tag: String,
    message: String,
}

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(level: Level, tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_timestamp(Timestamp::now(), level, tag, message)
    }

    /// Create a record with an explicit timestamp.
    pub fn with_timestamp(
        timestamp: Timestamp,
        level: Level,
        tag: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            tag: tag.into(),
            message: message.into(),
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render the line persisted to the log file, without the trailing newline.
    ///
    /// ```text
    /// 2024-08-11 22:44:57.172 I/CardApp|.(main.rs:42)	card saved
    /// ```
    pub fn file_line(&self, tz: &TimeZone) -> String {
        format!(
            "{} {}/{}\t{}",
            self.timestamp.to_zoned(tz.clone()).strftime(TIMESTAMP_FORMAT),
            self.level.abbrev(),
            self.tag,
            self.message
        )
    }
}

/// Where a record was logged from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    file: &'a str,
    line: u32,
}

impl<'a> CallSite<'a> {
    pub fn new(file: &'a str, line: u32) -> Self {
        Self { file, line }
    }

    /// The call site of the caller, resolved through `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> CallSite<'static> {
        let location = std::panic::Location::caller();
        CallSite::new(location.file(), location.line())
    }
}

impl fmt::Display for CallSite<'_> {
    /// Formats as `.(<file name>:<line>)`, keeping only the last path component.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self
            .file
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.file);
        write!(f, ".({file}:{})", self.line)
    }
}

/// Build the tag of a record: `<prefix>|.(<file>:<line>)`, or `<prefix>|` without a call site.
pub fn make_tag(prefix: &str, site: Option<CallSite<'_>>) -> String {
    match site {
        Some(site) => format!("{prefix}|{site}"),
        None => format!("{prefix}|"),
    }
}
