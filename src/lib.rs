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

//! Cardlog is a tagged, level-filtered logger that persists records to a size-bounded, two-file
//! rotating log without ever blocking the caller on file I/O.
//!
//! # Overview
//!
//! A [`Logger`] is an explicit, long-lived instance. Every record passing the minimum level is
//! rendered once and sent to the console sinks and, when a log file is configured, to a single
//! background writer. The writer appends lines to `<path>`, moves the file to `<path>-prev` once
//! it reaches the size threshold, and flushes or closes the file only after logging has been
//! quiet for a while. Failures never reach the caller; they go to a [`Trap`].
//!
//! # Examples
//!
//! ```
//! use cardlog::Level;
//! use cardlog::Logger;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = Logger::builder()
//!     .tag_prefix("CardApp")
//!     .min_level(Level::Debug)
//!     .log_file(dir.path().join("cards.log"))
//!     .max_file_size_mebibytes(2)
//!     .build();
//!
//! logger.i("loaded {} cards", &[&12]);
//! logger.w("color {} is not supported, using {}", &[&"#zzz", &"#000"]);
//!
//! logger.flush();
//! let content = std::fs::read_to_string(dir.path().join("cards.log")).unwrap();
//! assert_eq!(content.lines().count(), 2);
//! ```
//!
//! Records are persisted one per line:
//!
//! ```text
//! 2024-08-11 22:44:57.172 I/CardApp|.(main.rs:12)	loaded 12 cards
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod bridge;
pub mod filter;
pub mod format;
pub mod record;
pub mod trap;

mod error;
mod file;
mod level;
mod logger;

pub use self::append::Append;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::file::FileStats;
pub use self::file::PendingTimers;
pub use self::file::prev_path;
pub use self::level::Level;
pub use self::logger::Builder;
pub use self::logger::Config;
pub use self::logger::Logger;
pub use self::record::Record;
pub use self::trap::Trap;

/// Default values of the logger configuration.
pub mod defaults {
    pub use crate::logger::config::DEFAULT_CLOSE_DELAY;
    pub use crate::logger::config::DEFAULT_FLUSH_DELAY;
    pub use crate::logger::config::DEFAULT_MAX_FILE_SIZE_MEBIBYTES;
    pub use crate::logger::config::DEFAULT_TAG_PREFIX;
}
