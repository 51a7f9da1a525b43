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

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use jiff::tz::TimeZone;

use super::Config;
use super::Logger;
use super::config::mebibytes;
use crate::Append;
use crate::Level;
use crate::Trap;
use crate::append::Stderr;
use crate::trap::DefaultTrap;

/// A builder for configuring a [`Logger`].
///
/// ## Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use cardlog::Level;
/// use cardlog::Logger;
///
/// let logger = Logger::builder()
///     .tag_prefix("CardApp")
///     .min_level(Level::Info)
///     .max_file_size_mebibytes(4)
///     .flush_delay(Duration::from_millis(500))
///     .build();
/// ```
#[must_use = "call `build` to create the logger"]
#[derive(Debug)]
pub struct Builder {
    config: Config,
    // `None` means the default stderr console
    consoles: Option<Vec<Box<dyn Append>>>,
    trap: Box<dyn Trap>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Create a new [`Builder`] with the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            consoles: None,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the prefix of every facade-resolved tag.
    pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.tag_prefix = prefix.into();
        self
    }

    /// Set the minimum level; records below it are dropped before any work.
    pub fn min_level(mut self, level: Level) -> Self {
        self.config.min_level = level;
        self
    }

    /// Persist records to `path`, rotating to `<path>-prev`.
    ///
    /// Without a log file, the logger only emits to its console sinks.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_file = Some(path.into());
        self
    }

    /// Set the rotation threshold in mebibytes.
    pub fn max_file_size_mebibytes(mut self, n: u64) -> Self {
        self.config.max_file_size = mebibytes(n);
        self
    }

    /// Set the rotation threshold in bytes.
    pub fn max_file_size_bytes(mut self, n: u64) -> Self {
        self.config.max_file_size = n;
        self
    }

    /// Set how long the writer waits after the last record before flushing.
    pub fn flush_delay(mut self, delay: Duration) -> Self {
        self.config.flush_delay = delay;
        self
    }

    /// Set how long the writer waits after the last record before closing the file.
    ///
    /// [`Duration::MAX`] keeps the file open until the writer is torn down.
    pub fn close_delay(mut self, delay: Duration) -> Self {
        self.config.close_delay = delay;
        self
    }

    /// Set the time zone of persisted timestamps. Defaults to the system time zone.
    pub fn time_zone(mut self, tz: TimeZone) -> Self {
        self.config.time_zone = tz;
        self
    }

    /// Add a console sink. Replaces the default [`Stderr`] sink.
    pub fn console(mut self, append: impl Into<Box<dyn Append>>) -> Self {
        self.consoles
            .get_or_insert_with(Vec::new)
            .push(append.into());
        self
    }

    /// Emit to no console sink at all.
    pub fn no_console(mut self) -> Self {
        self.consoles = Some(vec![]);
        self
    }

    /// Set the trap receiving errors swallowed by the logger.
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Build the logger, starting the file writer if a log file is configured.
    pub fn build(self) -> Logger {
        let Self {
            config,
            consoles,
            trap,
        } = self;

        let consoles = consoles.unwrap_or_else(|| vec![Box::new(Stderr::default())]);
        Logger::new(config, consoles, Arc::from(trap))
    }
}
