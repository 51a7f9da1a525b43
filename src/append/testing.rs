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

use crate::Error;
use crate::Record;
use crate::append::Append;
use crate::append::stdio::ConsoleLayout;

/// A console sink that writes log records that can be captured by a test harness (like
/// `cargo test`), and thus the outputs are suppressed unless `--nocapture` or `--show-output` is
/// specified.
///
/// # Examples
///
/// ```
/// use cardlog::Logger;
/// use cardlog::append::Testing;
///
/// let logger = Logger::builder().console(Testing::default()).build();
/// ```
#[derive(Debug)]
pub struct Testing {
    layout: ConsoleLayout,
}

impl Default for Testing {
    fn default() -> Self {
        Self {
            layout: ConsoleLayout::default().no_color(),
        }
    }
}

impl Append for Testing {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let bytes = self.layout.format(record);
        eprint!("{}", String::from_utf8_lossy(&bytes));
        Ok(())
    }
}
