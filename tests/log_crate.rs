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
use std::sync::Arc;

use cardlog::Level;
use cardlog::Logger;
use tempfile::TempDir;

#[test]
fn test_log_crate_bridge() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("cards.log");
    let logger = Arc::new(
        Logger::builder()
            .no_console()
            .min_level(Level::Debug)
            .log_file(&path)
            .build(),
    );
    cardlog::bridge::setup_log_crate(logger.clone());

    log::trace!("below the minimum level");
    let line = line!() + 1;
    log::info!(target: "Timber", "saved card {}", 7);
    log::warn!("plain");
    log::logger().flush();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(
        lines[0].ends_with(&format!(" I/Timber|.(log_crate.rs:{line})\tsaved card 7")),
        "{}",
        lines[0]
    );
    assert!(lines[1].contains(" W/log_crate|.(log_crate.rs:"), "{}", lines[1]);
    assert!(lines[1].ends_with("\tplain"));
}
