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
use std::sync::Arc;

use cardlog::Level;
use cardlog::Logger;
use cardlog::prev_path;
use cardlog::trap::ChannelTrap;
use jiff::tz::TimeZone;
use tempfile::TempDir;

fn read_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(_) => vec![],
    }
}

/// Check `<yyyy-MM-dd HH:mm:ss.SSS> <L>/<tag>\t<message>` and return the message.
fn parse_line(line: &str, abbrev: char, tag: &str) -> String {
    let shape: String = line[..23]
        .chars()
        .map(|c| if c.is_ascii_digit() { '9' } else { c })
        .collect();
    assert_eq!(shape, "9999-99-99 99:99:99.999", "bad timestamp in {line:?}");

    let rest = &line[23..];
    let prefix = format!(" {abbrev}/{tag}\t");
    assert!(rest.starts_with(&prefix), "bad level or tag in {line:?}");
    rest[prefix.len()..].to_string()
}

fn logger(path: &Path, max_bytes: u64) -> Logger {
    Logger::builder()
        .no_console()
        .log_file(path)
        .max_file_size_bytes(max_bytes)
        .time_zone(TimeZone::UTC)
        .build()
}

#[test]
fn test_lines_below_threshold_keep_enqueue_order() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    let logger = logger(&path, 1024 * 1024);

    for i in 0..100 {
        logger.log_from_adapter_at(Level::Info, "Seq", None, &format!("record {i}"));
    }
    logger.flush();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 100);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(parse_line(line, 'I', "Seq|"), format!("record {i}"));
    }
    assert!(!prev_path(&path).exists());
    assert_eq!(logger.file_stats().unwrap().rotations, 0);
}

#[test]
fn test_rotation_right_after_threshold() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");

    // each line is 23 (timestamp) + 6 (" I/T|\t") + 13 (message) + 1 (newline) = 43 bytes, so
    // the cumulative size first reaches 100 bytes after the third record
    let logger = logger(&path, 100);
    for i in 1..=5 {
        logger.log_from_adapter_at(Level::Info, "T", None, &format!("message-{i:05}"));
    }
    logger.flush();

    let prev: Vec<_> = read_lines(&prev_path(&path))
        .iter()
        .map(|line| parse_line(line, 'I', "T|"))
        .collect();
    let current: Vec<_> = read_lines(&path)
        .iter()
        .map(|line| parse_line(line, 'I', "T|"))
        .collect();
    assert_eq!(prev, vec!["message-00001", "message-00002", "message-00003"]);
    assert_eq!(current, vec!["message-00004", "message-00005"]);
    assert_eq!(fs::metadata(prev_path(&path)).unwrap().len(), 129);
    assert_eq!(fs::metadata(&path).unwrap().len(), 86);

    let stats = logger.file_stats().unwrap();
    assert_eq!(stats.rotations, 1);
    assert_eq!(stats.lines_written, 5);
    assert_eq!(stats.opens, 2);
}

#[test]
fn test_rotation_keeps_only_two_files() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    let logger = logger(&path, 200);

    for i in 0..50 {
        logger.log_from_adapter_at(Level::Debug, "Bulk", None, &format!("{i:04} {}", "A".repeat(50)));
    }
    logger.flush();

    let files: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert!(files.len() <= 2, "unexpected files: {files:?}");
    assert!(fs::metadata(&path).map(|m| m.len() < 200).unwrap_or(true));

    // the newest records survive, in order, across both files
    let mut lines = read_lines(&prev_path(&path));
    lines.extend(read_lines(&path));
    let last = parse_line(lines.last().unwrap(), 'D', "Bulk|");
    assert!(last.starts_with("0049 "));
}

#[test]
fn test_existing_file_is_appended_not_truncated() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    fs::write(&path, "earlier session\n").unwrap();

    let logger = logger(&path, 1024 * 1024);
    logger.log_from_adapter_at(Level::Warn, "W", None, "later session");
    logger.flush();

    let lines = read_lines(&path);
    assert_eq!(lines[0], "earlier session");
    assert_eq!(parse_line(&lines[1], 'W', "W|"), "later session");
}

#[test]
fn test_concurrent_producers() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    let logger = Arc::new(logger(&path, 1024 * 1024));

    let handles: Vec<_> = (0..4)
        .map(|producer| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..250 {
                    logger.log_from_adapter_at(Level::Info, "P", None, &format!("{producer} {i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1000);

    let mut next = [0usize; 4];
    for line in &lines {
        let message = parse_line(line, 'I', "P|");
        let (producer, i) = message.split_once(' ').unwrap();
        let producer: usize = producer.parse().unwrap();
        assert_eq!(i.parse::<usize>().unwrap(), next[producer]);
        next[producer] += 1;
    }
}

#[test]
fn test_unwritable_path_is_trapped() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let (trap, events) = ChannelTrap::new();

    // a directory cannot be opened for appending
    let logger = Logger::builder()
        .no_console()
        .log_file(temp_dir.path())
        .trap(trap)
        .build();
    logger.e("lost {}", &[&1]);
    logger.e("lost {}", &[&2]);
    logger.flush();

    let kinds: Vec<_> = events.try_iter().map(|event| event.kind).collect();
    assert_eq!(kinds, vec![cardlog::ErrorKind::Write, cardlog::ErrorKind::Write]);

    let stats = logger.file_stats().unwrap();
    assert_eq!(stats.lines_dropped, 2);
    assert_eq!(stats.lines_written, 0);
    assert!(!stats.handle_open);
}

#[test]
fn test_write_recovers_once_path_is_writable() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    fs::create_dir(&path).unwrap();
    let (trap, events) = ChannelTrap::new();

    let logger = Logger::builder()
        .no_console()
        .log_file(&path)
        .trap(trap)
        .build();
    logger.e("lost", &[]);
    logger.flush();
    assert_eq!(events.try_iter().count(), 1);

    fs::remove_dir(&path).unwrap();
    logger.e("kept", &[]);
    logger.flush();
    assert_eq!(events.try_iter().count(), 0);

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("\tkept"));

    let stats = logger.file_stats().unwrap();
    assert_eq!(stats.opens, 1);
    assert_eq!(stats.lines_written, 1);
    assert_eq!(stats.lines_dropped, 1);
    assert!(stats.handle_open);
}
