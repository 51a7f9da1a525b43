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

use std::io::Write;

use jiff::tz::TimeZone;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::Record;
use crate::append::Append;

/// Render a record for a terminal.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00    INFO CardApp|.(list.rs:51): card saved
/// 2024-08-11T22:44:57.172219+08:00    WARN CardApp|.(list.rs:52): low storage
/// ```
///
/// With the `colored` feature flag, log levels are colored.
#[derive(Debug, Clone)]
pub(crate) struct ConsoleLayout {
    tz: TimeZone,
    #[cfg_attr(not(feature = "colored"), allow(dead_code))]
    no_color: bool,
}

impl Default for ConsoleLayout {
    fn default() -> Self {
        Self {
            tz: TimeZone::system(),
            no_color: false,
        }
    }
}

impl ConsoleLayout {
    pub(crate) fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    pub(crate) fn format(&self, record: &Record) -> Vec<u8> {
        let time = record
            .timestamp()
            .to_zoned(self.tz.clone())
            .strftime("%Y-%m-%dT%H:%M:%S.%6f%:z");
        let level = self.level(record.level());
        let tag = record.tag();
        let message = record.message();
        format!("{time} {level:>7} {tag}: {message}\n").into_bytes()
    }

    #[cfg(feature = "colored")]
    fn level(&self, level: Level) -> String {
        use colored::Color;
        use colored::Colorize;

        if self.no_color {
            return level.to_string();
        }

        let color = match level {
            Level::Assert => Color::BrightRed,
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Green,
            Level::Debug => Color::Blue,
            Level::Verbose => Color::Magenta,
        };
        format!("{:>7}", level.as_str()).color(color).to_string()
    }

    #[cfg(not(feature = "colored"))]
    fn level(&self, level: Level) -> String {
        level.to_string()
    }
}

/// A console sink that prints log records to stdout.
#[derive(Debug, Default)]
pub struct Stdout {
    layout: ConsoleLayout,
}

impl Stdout {
    /// Disable level colors.
    pub fn no_color(mut self) -> Self {
        self.layout = self.layout.no_color();
        self
    }
}

impl Append for Stdout {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let bytes = self.layout.format(record);
        std::io::stdout().write_all(&bytes).map_err(|err| {
            Error::from_io_error(ErrorKind::Console, "failed to write to stdout", err)
        })
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stdout()
            .flush()
            .map_err(|err| Error::from_io_error(ErrorKind::Console, "failed to flush stdout", err))
    }
}

/// A console sink that prints log records to stderr.
#[derive(Debug, Default)]
pub struct Stderr {
    layout: ConsoleLayout,
}

impl Stderr {
    /// Disable level colors.
    pub fn no_color(mut self) -> Self {
        self.layout = self.layout.no_color();
        self
    }
}

impl Append for Stderr {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let bytes = self.layout.format(record);
        std::io::stderr().write_all(&bytes).map_err(|err| {
            Error::from_io_error(ErrorKind::Console, "failed to write to stderr", err)
        })
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stderr()
            .flush()
            .map_err(|err| Error::from_io_error(ErrorKind::Console, "failed to flush stderr", err))
    }
}
