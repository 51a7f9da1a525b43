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

//! The persisted side of the logger: one writer thread owning the log file, a size-bounded
//! two-file rotation, and debounced flush and idle-close timers.
//!
//! Lines are handed to the writer through an unbounded channel so producers never block on file
//! I/O. Under sustained overload the queue grows without bound; there is no backpressure and no
//! line is dropped before it reaches the writer.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use arc_swap::ArcSwap;
use crossbeam_channel::Sender;

use crate::Error;
use crate::ErrorKind;
use crate::Trap;
use crate::logger::Config;

pub use self::debounce::PendingTimers;
pub use self::rotation::prev_path;

mod debounce;
mod rotation;
mod worker;

use self::debounce::Debouncer;
use self::worker::Worker;

#[derive(Debug)]
enum Message {
    Line(String),
    Flush,
    CloseIdle,
    Sync(Sender<()>),
    Shutdown,
}

/// Counters of the work done by the file writer since the log file was configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct FileStats {
    /// Lines appended to the current file.
    pub lines_written: u64,
    /// Lines lost because the file could not be opened or written.
    pub lines_dropped: u64,
    /// Times a handle was opened on the current file.
    pub opens: u64,
    /// Debounced flush actions executed.
    pub flushes: u64,
    /// Idle-close actions executed.
    pub idle_closes: u64,
    /// Successful rotations of the current file to the `-prev` file.
    pub rotations: u64,
    /// Whether the writer holds an open handle right now.
    pub handle_open: bool,
}

#[derive(Debug, Default)]
struct Stats {
    lines_written: AtomicU64,
    lines_dropped: AtomicU64,
    opens: AtomicU64,
    flushes: AtomicU64,
    idle_closes: AtomicU64,
    rotations: AtomicU64,
    handle_open: AtomicBool,
}

impl Stats {
    fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FileStats {
        FileStats {
            lines_written: self.lines_written.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
            opens: self.opens.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            idle_closes: self.idle_closes.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            handle_open: self.handle_open.load(Ordering::Relaxed),
        }
    }
}

/// A running writer and debounce scheduler pair for one log path.
///
/// [`FileSink::shutdown`] cancels the pending timers, lets the writer drain every line already
/// enqueued, closes the file and joins the writer. Dropping the sink does the same if it was not
/// shut down yet, then joins the timer thread.
#[derive(Debug)]
pub(crate) struct FileSink {
    path: PathBuf,
    sender: Sender<Message>,
    worker: Mutex<Option<JoinHandle<()>>>,
    debouncer: Option<Debouncer>,
    stats: Arc<Stats>,
}

impl FileSink {
    pub(crate) fn spawn(
        path: PathBuf,
        config: Arc<ArcSwap<Config>>,
        trap: Arc<dyn Trap>,
    ) -> Result<FileSink, Error> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let stats = Arc::new(Stats::default());
        let (flush_delay, close_delay) = {
            let config = config.load();
            (config.flush_delay(), config.close_delay())
        };

        let worker = Worker::new(path.clone(), receiver, config, stats.clone(), trap);
        let handle = std::thread::Builder::new()
            .name("cardlog-file-writer".to_string())
            .spawn(move || worker.run())
            .map_err(|err| {
                Error::from_io_error(ErrorKind::Spawn, "failed to spawn log file writer", err)
            })?;

        let mut sink = FileSink {
            path,
            sender: sender.clone(),
            worker: Mutex::new(Some(handle)),
            debouncer: None,
            stats,
        };

        // on failure the half-built sink is dropped, which stops the writer again
        let debouncer = Debouncer::spawn(flush_delay, close_delay, sender).map_err(|err| {
            Error::from_io_error(ErrorKind::Spawn, "failed to spawn log file timer", err)
        })?;
        sink.debouncer = Some(debouncer);
        Ok(sink)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Queue a line for the writer and restart both maintenance timers.
    pub(crate) fn enqueue(&self, line: String) {
        if self.sender.send(Message::Line(line)).is_err() {
            return;
        }
        if let Some(debouncer) = &self.debouncer {
            debouncer.schedule();
        }
    }

    /// Block until every line enqueued so far is written and flushed.
    pub(crate) fn sync(&self) {
        let (ack, done) = crossbeam_channel::bounded(1);
        if self.sender.send(Message::Sync(ack)).is_ok() {
            // a disconnect means the writer is gone, nothing left to wait for
            let _ = done.recv();
        }
    }

    /// Stop the writer once it has drained its queue. Lines enqueued afterwards are discarded.
    ///
    /// Returns once the file is closed, so a new sink on the same path never overlaps this one.
    pub(crate) fn shutdown(&self) {
        if let Some(debouncer) = &self.debouncer {
            debouncer.cancel();
        }

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = self.sender.send(Message::Shutdown);
            let _ = handle.join();
        }
    }

    pub(crate) fn stats(&self) -> FileStats {
        self.stats.snapshot()
    }

    pub(crate) fn pending_timers(&self) -> PendingTimers {
        self.debouncer
            .as_ref()
            .map(Debouncer::pending)
            .unwrap_or_default()
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.shutdown();
        // actions the timer submits from now on find the writer gone
        drop(self.debouncer.take());
    }
}
