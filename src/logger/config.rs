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

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use jiff::tz::TimeZone;

use crate::Level;

/// The tag prefix used until the host sets its own.
pub const DEFAULT_TAG_PREFIX: &str = "TopDefaultsLogger";
/// The default size threshold of a log file.
pub const DEFAULT_MAX_FILE_SIZE_MEBIBYTES: u64 = 2;
/// How long the writer waits after the last record before flushing.
pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_millis(1000);
/// How long the writer waits after the last record before closing the file.
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(60_000);

pub(crate) const fn mebibytes(n: u64) -> u64 {
    n.saturating_mul(1024 * 1024)
}

/// A snapshot of the logger configuration.
///
/// The logger swaps in a new snapshot on every setter, so a snapshot never changes once read.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) tag_prefix: String,
    pub(crate) min_level: Level,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) max_file_size: u64,
    pub(crate) flush_delay: Duration,
    pub(crate) close_delay: Duration,
    pub(crate) time_zone: TimeZone,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
            min_level: Level::Verbose,
            log_file: None,
            max_file_size: mebibytes(DEFAULT_MAX_FILE_SIZE_MEBIBYTES),
            flush_delay: DEFAULT_FLUSH_DELAY,
            close_delay: DEFAULT_CLOSE_DELAY,
            time_zone: TimeZone::system(),
        }
    }
}

impl Config {
    /// The prefix of every tag built by the logger.
    pub fn tag_prefix(&self) -> &str {
        &self.tag_prefix
    }

    /// The lowest level that is emitted.
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// The current log file, or `None` in console-only mode.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// The rotation threshold in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// How long after the last record the file is flushed.
    pub fn flush_delay(&self) -> Duration {
        self.flush_delay
    }

    /// How long after the last record the file is closed.
    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// The time zone of the timestamps persisted to the file.
    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }
}
