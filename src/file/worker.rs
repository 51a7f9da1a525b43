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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use arc_swap::ArcSwap;
use crossbeam_channel::Receiver;

use super::Message;
use super::Stats;
use super::rotation;
use crate::Error;
use crate::ErrorKind;
use crate::Trap;
use crate::logger::Config;

/// An open, buffered handle on the current log file.
#[derive(Debug)]
pub(super) struct Handle {
    writer: BufWriter<File>,
    size: u64,
}

impl Handle {
    fn open(path: &Path) -> io::Result<Handle> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(Handle {
            writer: BufWriter::new(file),
            size,
        })
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.size += line.len() as u64 + 1;
        Ok(())
    }

    /// Bytes in the file, including what is still buffered.
    pub(super) fn size(&self) -> u64 {
        self.size
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub(super) fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// The handle on the current file, if any. Only the writer thread touches it.
#[derive(Debug, Default)]
pub(super) struct WriterState {
    handle: Option<Handle>,
}

impl WriterState {
    pub(super) fn take(&mut self) -> Option<Handle> {
        self.handle.take()
    }

    pub(super) fn is_open(&self) -> bool {
        self.handle.is_some()
    }
}

pub(super) struct Worker {
    path: PathBuf,
    receiver: Receiver<Message>,
    config: Arc<ArcSwap<Config>>,
    state: WriterState,
    stats: Arc<Stats>,
    trap: Arc<dyn Trap>,
}

impl Worker {
    pub(super) fn new(
        path: PathBuf,
        receiver: Receiver<Message>,
        config: Arc<ArcSwap<Config>>,
        stats: Arc<Stats>,
        trap: Arc<dyn Trap>,
    ) -> Worker {
        Self {
            path,
            receiver,
            config,
            state: WriterState::default(),
            stats,
            trap,
        }
    }

    pub(super) fn run(mut self) {
        while let Ok(message) = self.receiver.recv() {
            match message {
                Message::Line(line) => self.write_line(&line),
                Message::Flush => {
                    Stats::incr(&self.stats.flushes);
                    self.flush(ErrorKind::Flush);
                }
                Message::CloseIdle => {
                    Stats::incr(&self.stats.idle_closes);
                    self.close(ErrorKind::Close, "failed to close idle log file");
                }
                Message::Sync(ack) => {
                    self.flush(ErrorKind::Flush);
                    let _ = ack.send(());
                }
                Message::Shutdown => break,
            }
        }

        self.close(ErrorKind::Close, "failed to close log file on shutdown");
    }

    fn write_line(&mut self, line: &str) {
        if !self.state.is_open() {
            match Handle::open(&self.path) {
                Ok(handle) => {
                    self.state.handle = Some(handle);
                    Stats::incr(&self.stats.opens);
                    self.sync_open_flag();
                }
                Err(err) => {
                    Stats::incr(&self.stats.lines_dropped);
                    self.report(ErrorKind::Write, "failed to open log file", err);
                    return;
                }
            }
        }

        let Some(handle) = self.state.handle.as_mut() else {
            return;
        };
        let size = match handle.append(line) {
            Ok(()) => handle.size(),
            Err(err) => {
                // discard the handle so the next line retries with a fresh open
                self.state.handle = None;
                self.sync_open_flag();
                Stats::incr(&self.stats.lines_dropped);
                self.report(ErrorKind::Write, "failed to append log line", err);
                return;
            }
        };
        Stats::incr(&self.stats.lines_written);

        let max_size = self.config.load().max_file_size();
        let rotated = rotation::after_write(&mut self.state, &self.path, size, max_size);
        self.sync_open_flag();
        match rotated {
            Ok(true) => Stats::incr(&self.stats.rotations),
            Ok(false) => {}
            Err(err) => self.trap.trap(&err),
        }
    }

    fn flush(&mut self, kind: ErrorKind) {
        let Some(handle) = self.state.handle.as_mut() else {
            return;
        };
        if let Err(err) = handle.flush() {
            self.state.handle = None;
            self.sync_open_flag();
            self.report(kind, "failed to flush log file", err);
        }
    }

    fn close(&mut self, kind: ErrorKind, message: &str) {
        let Some(handle) = self.state.take() else {
            return;
        };
        self.sync_open_flag();
        if let Err(err) = handle.close() {
            self.report(kind, message, err);
        }
    }

    fn sync_open_flag(&self) {
        self.stats
            .handle_open
            .store(self.state.is_open(), Ordering::Relaxed);
    }

    fn report(&self, kind: ErrorKind, message: &str, err: io::Error) {
        let err = Error::from_io_error(kind, message, err).with_context("path", self.path.display());
        self.trap.trap(&err);
    }
}
