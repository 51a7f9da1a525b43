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

use crate::Level;

/// Whether a record at `level` passes the configured minimum.
///
/// Returns `false` iff `level < min`.
#[inline]
pub fn should_emit(level: Level, min: Level) -> bool {
    level >= min
}

/// A filter that rejects records below a minimum level.
///
/// From least to most severe, the levels are:
///
/// - `Verbose`
/// - `Debug`
/// - `Info`
/// - `Warn`
/// - `Error`
/// - `Assert`
///
/// If the minimum is `Info`, it will allow `Info`, `Warn`, `Error` and `Assert` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinLevel(pub Level);

impl MinLevel {
    pub fn enabled(&self, level: Level) -> bool {
        should_emit(level, self.0)
    }
}

impl Default for MinLevel {
    fn default() -> Self {
        MinLevel(Level::Verbose)
    }
}

impl From<Level> for MinLevel {
    fn from(level: Level) -> Self {
        MinLevel(level)
    }
}
