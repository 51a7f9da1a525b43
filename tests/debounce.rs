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
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use cardlog::Level;
use cardlog::Logger;
use cardlog::PendingTimers;
use tempfile::TempDir;

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path)
        .map(|content| content.lines().count())
        .unwrap_or(0)
}

#[test]
fn test_bursts_collapse_into_one_flush() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    let logger = Logger::builder()
        .no_console()
        .log_file(&path)
        .flush_delay(Duration::from_millis(200))
        .close_delay(Duration::from_secs(30))
        .build();

    for i in 0..10 {
        logger.i("burst {}", &[&i]);
        sleep(Duration::from_millis(5));
    }
    assert_eq!(
        logger.pending_timers(),
        PendingTimers {
            flush: true,
            close: true
        }
    );
    assert_eq!(logger.file_stats().unwrap().flushes, 0);

    sleep(Duration::from_millis(600));

    let stats = logger.file_stats().unwrap();
    assert_eq!(stats.flushes, 1);
    assert_eq!(stats.idle_closes, 0);
    assert!(stats.handle_open);
    assert!(!logger.pending_timers().flush);
    assert!(logger.pending_timers().close);

    // the debounced flush alone made the burst visible
    assert_eq!(line_count(&path), 10);
}

#[test]
fn test_idle_close_then_reopen() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    let logger = Logger::builder()
        .no_console()
        .log_file(&path)
        .flush_delay(Duration::from_millis(20))
        .close_delay(Duration::from_millis(100))
        .build();

    logger.w("before idle", &[]);
    logger.flush();
    assert!(logger.file_stats().unwrap().handle_open);

    sleep(Duration::from_millis(400));
    let stats = logger.file_stats().unwrap();
    assert!(!stats.handle_open);
    assert_eq!(stats.idle_closes, 1);
    assert_eq!(logger.pending_timers(), PendingTimers::default());

    logger.w("after idle", &[]);
    logger.flush();

    let content = fs::read_to_string(&path).unwrap();
    let messages: Vec<_> = content
        .lines()
        .map(|line| line.rsplit('\t').next().unwrap())
        .collect();
    assert_eq!(messages, vec!["before idle", "after idle"]);

    let stats = logger.file_stats().unwrap();
    assert_eq!(stats.opens, 2);
    assert!(stats.handle_open);
}

#[test]
fn test_disable_cancels_timers_and_reenable_starts_fresh() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    let logger = Logger::builder()
        .no_console()
        .log_file(&path)
        .flush_delay(Duration::from_secs(30))
        .close_delay(Duration::from_secs(60))
        .build();

    logger.log(Level::Error, "pending {}", &[&"flush"]);
    assert!(logger.pending_timers().flush);

    logger.set_log_file(None);
    assert_eq!(logger.pending_timers(), PendingTimers::default());
    assert_eq!(logger.file_stats(), None);
    assert_eq!(logger.config().log_file(), None);
    // teardown drains the queue and closes the file
    assert_eq!(line_count(&path), 1);

    logger.e("console only", &[]);
    assert_eq!(line_count(&path), 1);

    logger.set_log_file(Some(path.clone()));
    assert_eq!(logger.pending_timers(), PendingTimers::default());
    let stats = logger.file_stats().unwrap();
    assert_eq!(stats.opens, 0);
    assert!(!stats.handle_open);

    logger.e("back on file", &[]);
    logger.flush();
    assert_eq!(line_count(&path), 2);
}

#[test]
fn test_switching_paths() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let first = temp_dir.path().join("first.log");
    let second = temp_dir.path().join("nested").join("second.log");
    let logger = Logger::builder().no_console().log_file(&first).build();

    logger.i("one", &[]);
    logger.set_log_file(Some(first.clone()));
    assert_eq!(logger.active_log_file(), Some(first.clone()));

    logger.set_log_file(Some(second.clone()));
    assert_eq!(logger.active_log_file(), Some(second.clone()));
    logger.i("two", &[]);
    logger.flush();

    assert_eq!(line_count(&first), 1);
    assert_eq!(line_count(&second), 1);
}

#[test]
fn test_unbounded_delays_never_fire() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    let logger = Logger::builder()
        .no_console()
        .log_file(&path)
        .flush_delay(Duration::MAX)
        .close_delay(Duration::MAX)
        .build();

    logger.i("never closed", &[]);
    logger.i("never closed", &[]);
    assert_eq!(logger.pending_timers(), PendingTimers::default());

    logger.flush();
    assert_eq!(line_count(&path), 2);

    let stats = logger.file_stats().unwrap();
    assert_eq!(stats.flushes, 0);
    assert_eq!(stats.idle_closes, 0);
    assert!(stats.handle_open);
}
