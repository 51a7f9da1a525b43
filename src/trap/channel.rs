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

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;

use crate::Error;
use crate::ErrorKind;
use crate::trap::Trap;

/// A snapshot of a trapped [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapEvent {
    pub kind: ErrorKind,
    pub message: String,
}

/// A trap that forwards every error to a channel the host can observe.
///
/// # Examples
///
/// ```
/// use cardlog::Logger;
/// use cardlog::trap::ChannelTrap;
///
/// let (trap, events) = ChannelTrap::new();
/// let logger = Logger::builder().no_console().trap(trap).build();
///
/// logger.i("{} {}", &[&"only one"]);
/// assert_eq!(events.try_recv().unwrap().kind, cardlog::ErrorKind::Format);
/// ```
#[derive(Debug, Clone)]
pub struct ChannelTrap {
    sender: Sender<TrapEvent>,
}

impl ChannelTrap {
    /// Create a new trap and the receiving end of its unbounded channel.
    pub fn new() -> (ChannelTrap, Receiver<TrapEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (ChannelTrap { sender }, receiver)
    }
}

impl Trap for ChannelTrap {
    fn trap(&self, err: &Error) {
        let event = TrapEvent {
            kind: err.kind(),
            message: err.to_string(),
        };
        // the host may have dropped the receiver
        let _ = self.sender.send(event);
    }
}
