//! Deferred execution of one-shot tasks.
//!
//! `ThreadScheduler` runs tasks on a background thread after a real delay;
//! `ManualScheduler` keeps a virtual clock that only moves when told to.

use log::debug;
use std::io;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed. Must not block for the delay.
    fn schedule(&self, delay: Duration, task: Task) -> io::Result<()>;
}

/// Sleeps on a dedicated thread per task.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> io::Result<()> {
        thread::Builder::new()
            .name("sheetgrab-publish".to_string())
            .spawn(move || {
                thread::sleep(delay);
                task();
            })?;
        Ok(())
    }
}

struct Pending {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending>,
}

/// A scheduler driven by an explicit clock, for deterministic tests.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks not run yet.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Move the clock forward by `by` and run every task that became due,
    /// earliest first. Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let due = {
            let mut state = self.lock();
            state.now += by;
            let now = state.now;
            let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending)
                .into_iter()
                .partition(|pending| pending.due <= now);
            state.pending = rest;
            due.sort_by_key(|pending| (pending.due, pending.seq));
            due
        };
        // Tasks run unlocked so they may schedule follow-ups.
        let ran = due.len();
        for pending in due {
            debug!("Running task due at {:?}", pending.due);
            (pending.task)();
        }
        ran
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> io::Result<()> {
        let mut state = self.lock();
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.pending.push(Pending { due, seq, task });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;
    use std::sync::Arc;

    #[test]
    fn test_manual_task_waits_for_clock() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        scheduler
            .schedule(
                Duration::from_millis(2000),
                Box::new(move || sink.lock().unwrap().push("fired")),
            )
            .unwrap();

        assert_eq!(scheduler.advance(Duration::from_millis(1999)), 0);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(*log.lock().unwrap(), vec!["fired"]);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.now(), Duration::from_millis(2000));
    }

    #[test]
    fn test_manual_tasks_run_in_due_order() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for (name, delay) in [("late", 30), ("early", 10), ("tie", 10)] {
            let sink = Arc::clone(&log);
            scheduler
                .schedule(
                    Duration::from_millis(delay),
                    Box::new(move || sink.lock().unwrap().push(name)),
                )
                .unwrap();
        }

        assert_eq!(scheduler.advance(Duration::from_millis(50)), 3);
        assert_eq!(*log.lock().unwrap(), vec!["early", "tie", "late"]);
    }

    #[test]
    fn test_thread_scheduler_does_not_block() {
        let (tx, rx) = mpsc::channel();
        ThreadScheduler
            .schedule(
                Duration::from_millis(50),
                Box::new(move || {
                    let _ = tx.send(());
                }),
            )
            .unwrap();

        assert!(rx.try_recv().is_err());
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
