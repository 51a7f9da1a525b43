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

use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use crossbeam_channel::Receiver;
use crossbeam_channel::RecvTimeoutError;
use crossbeam_channel::Sender;

use super::Message;

/// Which maintenance timers are waiting to fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingTimers {
    /// A debounced flush is scheduled.
    pub flush: bool,
    /// An idle close is scheduled.
    pub close: bool,
}

/// One slot per timer kind. Scheduling overwrites a slot, so an unfired timer is replaced
/// rather than duplicated.
#[derive(Debug, Default)]
struct Slots {
    flush: Option<Instant>,
    close: Option<Instant>,
}

impl Slots {
    fn next_deadline(&self) -> Option<Instant> {
        match (self.flush, self.close) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Empty every slot due at `now`, returning which ones fired.
    fn take_due(&mut self, now: Instant) -> (bool, bool) {
        let flush = self.flush.is_some_and(|at| at <= now);
        let close = self.close.is_some_and(|at| at <= now);
        if flush {
            self.flush = None;
        }
        if close {
            self.close = None;
        }
        (flush, close)
    }
}

fn lock(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives the debounced flush and idle-close actions from a dedicated timer thread.
///
/// The timer thread never touches the file: a due timer only submits its action to the writer
/// channel, behind every line already enqueued.
#[derive(Debug)]
pub(super) struct Debouncer {
    slots: Arc<Mutex<Slots>>,
    waker: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    flush_delay: Duration,
    close_delay: Duration,
}

impl Debouncer {
    pub(super) fn spawn(
        flush_delay: Duration,
        close_delay: Duration,
        writer: Sender<Message>,
    ) -> io::Result<Debouncer> {
        let slots = Arc::new(Mutex::new(Slots::default()));
        // a single pending wakeup is enough to make the timer thread re-read the slots
        let (waker, wakeups) = crossbeam_channel::bounded(1);

        let timer_slots = slots.clone();
        let handle = std::thread::Builder::new()
            .name("cardlog-file-timer".to_string())
            .spawn(move || run(timer_slots, wakeups, writer))?;

        Ok(Debouncer {
            slots,
            waker: Some(waker),
            handle: Some(handle),
            flush_delay,
            close_delay,
        })
    }

    /// Replace both pending timers with fresh ones counted from now.
    ///
    /// A delay too long to be represented as an [`Instant`] leaves its slot empty: that timer
    /// never fires.
    pub(super) fn schedule(&self) {
        let now = Instant::now();
        {
            let mut slots = lock(&self.slots);
            slots.flush = now.checked_add(self.flush_delay);
            slots.close = now.checked_add(self.close_delay);
        }
        if let Some(waker) = &self.waker {
            let _ = waker.try_send(());
        }
    }

    /// Empty both slots without stopping the timer thread.
    pub(super) fn cancel(&self) {
        *lock(&self.slots) = Slots::default();
    }

    pub(super) fn pending(&self) -> PendingTimers {
        let slots = lock(&self.slots);
        PendingTimers {
            flush: slots.flush.is_some(),
            close: slots.close.is_some(),
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
        // disconnecting the waker ends the timer loop
        drop(self.waker.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(slots: Arc<Mutex<Slots>>, wakeups: Receiver<()>, writer: Sender<Message>) {
    loop {
        let deadline = lock(&slots).next_deadline();
        let woken = match deadline {
            Some(deadline) => wakeups.recv_deadline(deadline),
            None => wakeups
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };

        match woken {
            Ok(()) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let (flush, close) = lock(&slots).take_due(Instant::now());
                // the writer may already be shutting down; a lost action is harmless then
                if flush {
                    let _ = writer.send(Message::Flush);
                }
                if close {
                    let _ = writer.send(Message::CloseIdle);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots() {
        let now = Instant::now();
        let mut slots = Slots::default();
        assert_eq!(slots.next_deadline(), None);

        slots.flush = Some(now + Duration::from_secs(1));
        slots.close = Some(now + Duration::from_secs(60));
        assert_eq!(slots.next_deadline(), slots.flush);

        assert_eq!(slots.take_due(now), (false, false));
        assert_eq!(slots.take_due(now + Duration::from_secs(2)), (true, false));
        assert_eq!(slots.next_deadline(), slots.close);
        assert_eq!(slots.take_due(now + Duration::from_secs(60)), (false, true));
        assert_eq!(slots.next_deadline(), None);
    }

    #[test]
    fn test_reschedule_replaces_pending_timers() {
        let (writer, actions) = crossbeam_channel::unbounded();
        let debouncer =
            Debouncer::spawn(Duration::from_millis(50), Duration::from_secs(60), writer).unwrap();
        assert_eq!(debouncer.pending(), PendingTimers::default());

        for _ in 0..10 {
            debouncer.schedule();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(
            debouncer.pending(),
            PendingTimers {
                flush: true,
                close: true
            }
        );

        std::thread::sleep(Duration::from_millis(300));
        let fired: Vec<_> = actions.try_iter().collect();
        assert_eq!(fired.len(), 1);
        assert!(matches!(fired[0], Message::Flush));
        assert!(!debouncer.pending().flush);
        assert!(debouncer.pending().close);
    }

    #[test]
    fn test_unrepresentable_delay_never_fires() {
        let (writer, actions) = crossbeam_channel::unbounded();
        let debouncer =
            Debouncer::spawn(Duration::from_millis(20), Duration::MAX, writer).unwrap();
        debouncer.schedule();
        assert_eq!(
            debouncer.pending(),
            PendingTimers {
                flush: true,
                close: false
            }
        );

        std::thread::sleep(Duration::from_millis(200));
        let fired: Vec<_> = actions.try_iter().collect();
        assert_eq!(fired.len(), 1);
        assert!(matches!(fired[0], Message::Flush));
    }

    #[test]
    fn test_drop_cancels_timers() {
        let (writer, actions) = crossbeam_channel::unbounded();
        let debouncer =
            Debouncer::spawn(Duration::from_millis(20), Duration::from_millis(20), writer).unwrap();
        debouncer.schedule();
        drop(debouncer);

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(actions.try_iter().count(), 0);
    }
}
