//! Progress ticker
//!
//! A cancellable periodic timer used to report elapsed time while lint jobs
//! run. The ticker is a two-state machine {suspended, resumed} with
//! idempotent transitions: resuming a resumed ticker or suspending a
//! suspended one is a no-op, so callers never have to track the current
//! state to tear it down safely.
//!
//! The backing mechanism is a dedicated thread blocking on a control
//! channel: `recv_timeout(interval)` while resumed (a timeout is a tick),
//! plain `recv` while suspended. Dropping the ticker sends a shutdown
//! message that wakes the thread from either state and joins it, so no tick
//! fires after the ticker is gone and the handler (plus anything it
//! captured) is released with the thread.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Ticker state: the timer either fires on its interval or sits idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickerState {
    Suspended,
    Resumed,
}

enum Control {
    Resume,
    Suspend,
    Shutdown,
}

/// A periodic timer invoking a handler once per interval.
///
/// Created suspended; call [`resume`](Self::resume) to start ticking. The
/// handler runs on the ticker's own thread, never on the caller's, and the
/// first invocation happens one full interval after resume (not
/// immediately). Any state the handler touches is owned by the handler
/// unless the caller synchronizes explicitly.
pub struct ProgressTicker {
    tx: Sender<Control>,
    handle: Option<JoinHandle<()>>,
    /// Caller-side view of the state, kept so repeated resume/suspend calls
    /// are no-ops and never reset the tick phase.
    resumed: bool,
}

impl ProgressTicker {
    /// Create a suspended ticker firing `handler` once per `interval`.
    ///
    /// `interval` must be non-zero; a zero interval would spin the ticker
    /// thread and is rejected by clamping to one millisecond.
    pub fn new<F>(interval: Duration, handler: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let interval = interval.max(Duration::from_millis(1));
        let (tx, rx) = mpsc::channel::<Control>();

        let handle = std::thread::spawn(move || {
            let mut handler = handler;
            let mut state = TickerState::Suspended;
            loop {
                match state {
                    TickerState::Resumed => match rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => handler(),
                        Ok(Control::Suspend) => state = TickerState::Suspended,
                        Ok(Control::Resume) => {}
                        Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    },
                    TickerState::Suspended => match rx.recv() {
                        Ok(Control::Resume) => state = TickerState::Resumed,
                        Ok(Control::Suspend) => {}
                        Ok(Control::Shutdown) | Err(_) => break,
                    },
                }
            }
        });

        Self {
            tx,
            handle: Some(handle),
            resumed: false,
        }
    }

    /// Start (or keep) ticking. No-op when already resumed.
    pub fn resume(&mut self) {
        if self.resumed {
            return;
        }
        self.resumed = true;
        let _ = self.tx.send(Control::Resume);
    }

    /// Halt ticking until the next resume. No-op when already suspended.
    pub fn suspend(&mut self) {
        if !self.resumed {
            return;
        }
        self.resumed = false;
        let _ = self.tx.send(Control::Suspend);
    }

    /// True when the ticker is currently firing.
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        // The shutdown message wakes the thread whether it is blocked in
        // recv (suspended) or recv_timeout (resumed), so teardown is safe
        // from either state and no tick fires after the join.
        let _ = self.tx.send(Control::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread::sleep;

    fn counting_ticker(interval: Duration) -> (ProgressTicker, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let ticker = ProgressTicker::new(interval, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (ticker, ticks)
    }

    #[test]
    fn test_created_suspended_fires_nothing() {
        let (ticker, ticks) = counting_ticker(Duration::from_millis(20));
        sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        assert!(!ticker.is_resumed());
    }

    #[test]
    fn test_resume_fires_after_one_interval() {
        let (mut ticker, ticks) = counting_ticker(Duration::from_millis(40));
        ticker.resume();

        // Less than one interval elapsed: no tick yet.
        sleep(Duration::from_millis(15));
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(150));
        assert!(ticks.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_double_resume_does_not_double_cadence() {
        let (mut ticker, ticks) = counting_ticker(Duration::from_millis(30));
        ticker.resume();
        ticker.resume();
        ticker.resume();

        sleep(Duration::from_millis(160));
        // A doubled cadence would land near 10; one cadence stays near 5.
        let count = ticks.load(Ordering::SeqCst);
        assert!(count >= 2 && count <= 7, "unexpected tick count {}", count);
    }

    #[test]
    fn test_suspend_halts_ticks_and_is_idempotent() {
        let (mut ticker, ticks) = counting_ticker(Duration::from_millis(20));
        ticker.resume();
        sleep(Duration::from_millis(70));
        ticker.suspend();
        ticker.suspend();

        let after_suspend = ticks.load(Ordering::SeqCst);
        sleep(Duration::from_millis(80));
        assert_eq!(ticks.load(Ordering::SeqCst), after_suspend);
    }

    #[test]
    fn test_resume_after_suspend_ticks_again() {
        let (mut ticker, ticks) = counting_ticker(Duration::from_millis(20));
        ticker.resume();
        sleep(Duration::from_millis(50));
        ticker.suspend();
        let halted = ticks.load(Ordering::SeqCst);

        ticker.resume();
        sleep(Duration::from_millis(70));
        assert!(ticks.load(Ordering::SeqCst) > halted);
    }

    #[test]
    fn test_drop_while_suspended_is_safe_and_fires_nothing() {
        let (ticker, ticks) = counting_ticker(Duration::from_millis(10));
        // Never resumed: this covers the platform hazard of cancelling a
        // still-suspended timer.
        drop(ticker);
        sleep(Duration::from_millis(60));
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_while_resumed_stops_ticks() {
        let (mut ticker, ticks) = counting_ticker(Duration::from_millis(15));
        ticker.resume();
        sleep(Duration::from_millis(60));
        drop(ticker);

        let at_drop = ticks.load(Ordering::SeqCst);
        sleep(Duration::from_millis(60));
        assert_eq!(ticks.load(Ordering::SeqCst), at_drop);
    }
}
