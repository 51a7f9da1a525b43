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

//! Traps receive the errors that logging swallows.
//!
//! No logging entry point ever returns or panics on failure. Format mismatches, file write
//! failures and rotation failures are instead delivered to the [`Trap`] configured on the
//! [`Logger`](crate::Logger), which defaults to [`DefaultTrap`].

use std::fmt;

use crate::Error;

pub use self::channel::ChannelTrap;
pub use self::channel::TrapEvent;
pub use self::default::DefaultTrap;

mod channel;
mod default;

/// A trap that receives errors that occur during logging.
pub trait Trap: fmt::Debug + Send + Sync + 'static {
    /// Handle an error. Implementations must not panic.
    fn trap(&self, err: &Error);
}

impl<T: Trap> From<T> for Box<dyn Trap> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
