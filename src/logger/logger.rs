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
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use arc_swap::ArcSwapOption;

use super::Builder;
use super::Config;
use super::config::mebibytes;
use crate::Append;
use crate::Level;
use crate::Record;
use crate::Trap;
use crate::file::FileSink;
use crate::file::FileStats;
use crate::file::PendingTimers;
use crate::filter::should_emit;
use crate::format;
use crate::record::CallSite;
use crate::record::make_tag;

/// A long-lived logger filtering, formatting and dispatching records to its console sinks and,
/// when a log file is configured, to a rotating file.
///
/// Share it across threads with an [`Arc`]. Every entry point takes `&self` and never fails: the
/// errors it swallows are delivered to the configured [`Trap`].
///
/// Configuration setters swap in a new [`Config`] snapshot and are expected to be called from one
/// thread at a time.
///
/// # Examples
///
/// ```
/// use cardlog::Level;
/// use cardlog::Logger;
///
/// let logger = Logger::builder().tag_prefix("CardApp").min_level(Level::Debug).build();
///
/// logger.v("dropped: below the minimum level", &[]);
/// logger.i("saved card {} for {}", &[&42, &"Ada"]);
/// ```
#[derive(Debug)]
pub struct Logger {
    config: Arc<ArcSwap<Config>>,
    file: ArcSwapOption<FileSink>,
    consoles: Vec<Box<dyn Append>>,
    trap: Arc<dyn Trap>,
}

impl Logger {
    /// Create a new [`Builder`].
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(super) fn new(config: Config, consoles: Vec<Box<dyn Append>>, trap: Arc<dyn Trap>) -> Self {
        let log_file = config.log_file.clone();
        let logger = Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            file: ArcSwapOption::empty(),
            consoles,
            trap,
        };
        if let Some(path) = log_file {
            logger.file.store(logger.spawn_file(path).map(Arc::new));
        }
        logger
    }

    /// The current configuration snapshot.
    pub fn config(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Replace the prefix of every tag built from now on.
    pub fn set_tag_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        self.update(|config| config.tag_prefix = prefix);
    }

    /// Drop records below `level` from now on.
    pub fn set_min_level(&self, level: Level) {
        self.update(|config| config.min_level = level);
    }

    /// Rotate the log file once it reaches `n` mebibytes.
    pub fn set_max_file_size_mebibytes(&self, n: u64) {
        self.update(|config| config.max_file_size = mebibytes(n));
    }

    /// Rotate the log file once it reaches `n` bytes.
    pub fn set_max_file_size_bytes(&self, n: u64) {
        self.update(|config| config.max_file_size = n);
    }

    /// Switch the log file, or go console-only with `None`.
    ///
    /// A different path tears down the current writer and timers and starts fresh ones. Lines
    /// already enqueued are written to the old file before this returns; records logged
    /// concurrently with the switch may be lost. Setting the path of the running writer again
    /// does nothing, while a path whose writer failed to start is retried.
    pub fn set_log_file(&self, path: Option<PathBuf>) {
        if self.config.load().log_file != path {
            self.update(|config| config.log_file = path.clone());
        }
        if self.active_log_file() == path {
            return;
        }

        // a producer may still hold the old sink; it must not be the one to drain it
        if let Some(old) = self.file.swap(None) {
            old.shutdown();
        }
        if let Some(path) = path {
            self.file.store(self.spawn_file(path).map(Arc::new));
        }
    }

    fn update(&self, f: impl FnOnce(&mut Config)) {
        let mut config = Config::clone(&self.config.load());
        f(&mut config);
        self.config.store(Arc::new(config));
    }

    fn spawn_file(&self, path: PathBuf) -> Option<FileSink> {
        match FileSink::spawn(path, self.config.clone(), self.trap.clone()) {
            Ok(sink) => Some(sink),
            Err(err) => {
                self.trap.trap(&err);
                None
            }
        }
    }

    /// Whether a record at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        should_emit(level, self.config.load().min_level)
    }

    #[track_caller]
    pub fn v(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Verbose, template, args);
    }

    #[track_caller]
    pub fn d(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Debug, template, args);
    }

    #[track_caller]
    pub fn i(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Info, template, args);
    }

    #[track_caller]
    pub fn w(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Warn, template, args);
    }

    #[track_caller]
    pub fn e(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Error, template, args);
    }

    /// Log a condition that should never happen.
    #[track_caller]
    pub fn assert(&self, template: &str, args: &[&dyn fmt::Display]) {
        self.log(Level::Assert, template, args);
    }

    /// Log at `level` with a tag of the form `<prefix>|.(<file>:<line>)` naming the caller.
    #[track_caller]
    pub fn log(&self, level: Level, template: &str, args: &[&dyn fmt::Display]) {
        let config = self.config.load();
        if !should_emit(level, config.min_level) {
            return;
        }

        let tag = make_tag(&config.tag_prefix, Some(CallSite::caller()));
        let message = format::render(template, args, &*self.trap);
        self.emit(&config, Record::new(level, tag, message));
    }

    /// Log a record handed over by another logging facade, with its own tag.
    ///
    /// An empty `tag` falls back to the tag prefix. The message is emitted verbatim.
    #[track_caller]
    pub fn log_from_adapter(&self, level: Level, tag: &str, message: &str) {
        self.log_from_adapter_at(level, tag, Some(CallSite::caller()), message);
    }

    /// Like [`Logger::log_from_adapter`], with the call site supplied by the adapter.
    pub fn log_from_adapter_at(
        &self,
        level: Level,
        tag: &str,
        site: Option<CallSite<'_>>,
        message: &str,
    ) {
        let config = self.config.load();
        if !should_emit(level, config.min_level) {
            return;
        }

        let tag = if tag.is_empty() {
            make_tag(&config.tag_prefix, site)
        } else {
            make_tag(tag, site)
        };
        self.emit(&config, Record::new(level, tag, message));
    }

    /// Log, at debug level, that the current thread starts running.
    #[track_caller]
    pub fn log_thread_start(&self) {
        let message = format!(">>>>>>>> {} start running >>>>>>>>", thread_label());
        self.log(Level::Debug, &message, &[]);
    }

    /// Log, at debug level, that the current thread finished running.
    #[track_caller]
    pub fn log_thread_finish(&self) {
        let message = format!("<<<<<<<< {} finished running <<<<<<<<", thread_label());
        self.log(Level::Debug, &message, &[]);
    }

    fn emit(&self, config: &Config, record: Record) {
        for console in &self.consoles {
            if let Err(err) = console.append(&record) {
                self.trap.trap(&err);
            }
        }

        if let Some(file) = &*self.file.load() {
            file.enqueue(record.file_line(&config.time_zone));
        }
    }

    /// Flush the console sinks and wait until every record logged so far is in the log file.
    pub fn flush(&self) {
        for console in &self.consoles {
            if let Err(err) = console.flush() {
                self.trap.trap(&err);
            }
        }

        if let Some(file) = &*self.file.load() {
            file.sync();
        }
    }

    /// Counters of the current log file writer, or `None` in console-only mode.
    pub fn file_stats(&self) -> Option<FileStats> {
        self.file.load().as_deref().map(FileSink::stats)
    }

    /// The maintenance timers currently waiting to fire.
    pub fn pending_timers(&self) -> PendingTimers {
        match &*self.file.load() {
            Some(file) => file.pending_timers(),
            None => PendingTimers::default(),
        }
    }

    /// The path the current writer appends to, if any.
    pub fn active_log_file(&self) -> Option<PathBuf> {
        self.file
            .load()
            .as_deref()
            .map(|file| file.path().to_path_buf())
    }
}

fn thread_label() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}
