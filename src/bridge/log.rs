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

use std::borrow::Cow;
use std::sync::Arc;

use crate::Level;
use crate::Logger;
use crate::record::CallSite;

#[derive(Debug)]
struct LogCrateLogger(Arc<Logger>);

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        log::Log::enabled(&*self.0, metadata)
    }

    fn log(&self, record: &log::Record) {
        log::Log::log(&*self.0, record);
    }

    fn flush(&self) {
        log::Log::flush(&*self.0);
    }
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_boxed_logger`] so that all logs from the log crate are
/// forwarded to `logger` through [`Logger::log_from_adapter_at`], with the record target as the
/// tag and the record file and line as the call site.
///
/// This should be called early in the execution of a Rust program. Any log events that occur
/// before initialization will be ignored.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// let logger = Arc::new(cardlog::Logger::builder().tag_prefix("CardApp").build());
/// cardlog::bridge::try_setup_log_crate(logger).unwrap();
///
/// log::info!("forwarded to cardlog");
/// ```
pub fn try_setup_log_crate(logger: Arc<Logger>) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(LogCrateLogger(logger)))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// See [`try_setup_log_crate`] for details.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate(logger: Arc<Logger>) {
    try_setup_log_crate(logger).expect(
        "cardlog::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        if !Logger::enabled(self, level) {
            return;
        }

        let site = record
            .file()
            .zip(record.line())
            .map(|(file, line)| CallSite::new(file, line));
        let message = match record.args().as_str() {
            Some(message) => Cow::Borrowed(message),
            None => Cow::Owned(record.args().to_string()),
        };
        self.log_from_adapter_at(level, record.target(), site, &message);
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}
