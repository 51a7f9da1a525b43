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

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use super::worker::WriterState;
use crate::Error;
use crate::ErrorKind;

const PREV_SUFFIX: &str = "-prev";

/// The file that keeps the last completed rotation of `path`: `<path>-prev`.
pub fn prev_path(path: &Path) -> PathBuf {
    let mut prev = OsString::from(path.as_os_str());
    prev.push(PREV_SUFFIX);
    PathBuf::from(prev)
}

pub(super) fn should_rotate(size: u64, max_size: u64) -> bool {
    size >= max_size
}

/// Rotate the current file once it reaches `max_size` bytes.
///
/// The handle is closed and `<path>` replaces `<path>-prev`, so the next write opens a brand-new
/// file. The writer state is cleared even if closing or renaming fails. Returns whether a
/// rotation took place.
pub(super) fn after_write(
    state: &mut WriterState,
    path: &Path,
    size: u64,
    max_size: u64,
) -> Result<bool, Error> {
    if !should_rotate(size, max_size) {
        return Ok(false);
    }

    let closed = match state.take() {
        Some(handle) => handle.close(),
        None => Ok(()),
    };
    let prev = prev_path(path);
    let renamed = fs::rename(path, &prev);

    if let Err(err) = closed {
        return Err(
            Error::from_io_error(ErrorKind::Rotation, "failed to close rotated log file", err)
                .with_context("path", path.display()),
        );
    }
    if let Err(err) = renamed {
        return Err(
            Error::from_io_error(ErrorKind::Rotation, "failed to rename rotated log file", err)
                .with_context("from", path.display())
                .with_context("to", prev.display()),
        );
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_prev_path() {
        assert_eq!(
            prev_path(Path::new("/data/logs/app.log")),
            PathBuf::from("/data/logs/app.log-prev")
        );
    }

    #[test]
    fn test_threshold() {
        let max = 2 * 1024 * 1024;
        assert!(!should_rotate(max - 1, max));
        assert!(should_rotate(max, max));
        assert!(should_rotate(max + 1, max));
    }

    #[test]
    fn test_rotation_replaces_prev() {
        let dir = TempDir::new().expect("failed to create a temporary directory");
        let path = dir.path().join("app.log");
        fs::write(&path, "current\n").unwrap();
        fs::write(prev_path(&path), "stale\n").unwrap();

        let mut state = WriterState::default();
        assert!(!after_write(&mut state, &path, 8, 9).unwrap());
        assert!(path.exists());

        assert!(after_write(&mut state, &path, 8, 8).unwrap());
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(prev_path(&path)).unwrap(), "current\n");
    }

    #[test]
    fn test_failed_rotation_still_clears_state() {
        let dir = TempDir::new().expect("failed to create a temporary directory");
        let path = dir.path().join("missing.log");

        let mut state = WriterState::default();
        let err = after_write(&mut state, &path, 10, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rotation);
        assert!(!state.is_open());
    }
}
