//! The `Locking` capability and its two implementations.
//!
//! A lock instance owns the state it protects and hands out RAII guards, so
//! "unlock" is simply dropping the guard. The bounded wait releases the guard
//! while suspended and re-acquires it before returning, which gives the
//! completion callback's state write a happens-before edge to the waiter's
//! observation of that state.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Mutual exclusion plus a single-producer/single-consumer bounded rendezvous.
///
/// # Contract
///
/// - [`lock`](Locking::lock) provides standard mutual exclusion over the
///   protected state; the lock is released when the returned guard drops.
/// - [`wait_with_timeout`](Locking::wait_with_timeout) must be called with a
///   guard obtained from the same instance. It atomically releases the guard,
///   suspends the caller until either a signal is posted or the timeout
///   elapses, and re-acquires the guard before returning. Returns `true` if
///   signaled before the timeout, `false` otherwise.
/// - [`signal`](Locking::signal) wakes the current waiter and must be called
///   while *not* holding the lock. The signal is sticky: once posted, any
///   subsequent wait returns `true` immediately.
///
/// # Constraints
///
/// This is a rendezvous between exactly one opener thread and one waiter
/// thread, not a general condition variable. Multiple concurrent waiters are
/// not supported. Spurious wakeups are possible; callers must re-check their
/// state predicate after every wait.
pub trait Locking<T>: Send + Sync {
    /// Acquires the lock, blocking until it is available.
    fn lock(&self) -> MutexGuard<'_, T>;

    /// Releases `guard`, suspends until signaled or until `timeout` elapses,
    /// then re-acquires `guard` before returning.
    fn wait_with_timeout(&self, guard: &mut MutexGuard<'_, T>, timeout: Duration) -> bool;

    /// Posts the (sticky) signal and wakes the waiter, if any.
    fn signal(&self);
}

/// Condition-variable-backed [`Locking`] implementation.
///
/// Used wherever a caller thread must block until a completion callback
/// running on another thread terminalizes the protected state.
pub struct BoundedWaitLock<T> {
    state: Mutex<T>,
    cond: Condvar,
    signaled: AtomicBool,
}

impl<T> BoundedWaitLock<T> {
    pub fn new(state: T) -> Self {
        Self {
            state: Mutex::new(state),
            cond: Condvar::new(),
            signaled: AtomicBool::new(false),
        }
    }
}

impl<T: Send> Locking<T> for BoundedWaitLock<T> {
    fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock()
    }

    fn wait_with_timeout(&self, guard: &mut MutexGuard<'_, T>, timeout: Duration) -> bool {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            // Unrepresentable deadline: treat the wait as unbounded.
            None => {
                while !self.signaled.load(Ordering::Acquire) {
                    self.cond.wait(guard);
                }
                return true;
            }
        };
        while !self.signaled.load(Ordering::Acquire) {
            if self.cond.wait_until(guard, deadline).timed_out() {
                return self.signaled.load(Ordering::Acquire);
            }
        }
        true
    }

    fn signal(&self) {
        // Taking the mutex here orders the flag store against a waiter that
        // has checked the flag but not yet parked. Callers must have dropped
        // their guard before signaling.
        let _guard = self.state.lock();
        self.signaled.store(true, Ordering::Release);
        self.cond.notify_one();
    }
}

impl<T> std::fmt::Debug for BoundedWaitLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedWaitLock")
            .field("signaled", &self.signaled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Wait-free [`Locking`] implementation.
///
/// The mutex is real (the protected state still needs exclusive access), but
/// [`wait_with_timeout`](Locking::wait_with_timeout) returns `true`
/// immediately and [`signal`](Locking::signal) is a no-op. Valid only on
/// paths where no thread ever needs to be woken: a synchronous file open, or
/// an asset open in asynchronous mode where reads never block.
pub struct NullLock<T> {
    state: Mutex<T>,
}

impl<T> NullLock<T> {
    pub fn new(state: T) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl<T: Send> Locking<T> for NullLock<T> {
    fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock()
    }

    fn wait_with_timeout(&self, _guard: &mut MutexGuard<'_, T>, _timeout: Duration) -> bool {
        true
    }

    fn signal(&self) {}
}

impl<T> std::fmt::Debug for NullLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullLock").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn signal_before_wait_returns_immediately() {
        let lock = BoundedWaitLock::new(());
        lock.signal();

        let mut guard = lock.lock();
        let start = Instant::now();
        assert!(lock.wait_with_timeout(&mut guard, Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn wait_times_out_without_signal() {
        let lock = BoundedWaitLock::new(());

        let mut guard = lock.lock();
        let start = Instant::now();
        assert!(!lock.wait_with_timeout(&mut guard, Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn cross_thread_signal_wakes_waiter() {
        let lock = Arc::new(BoundedWaitLock::new(0u32));

        let opener = lock.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            *opener.lock() = 7;
            opener.signal();
        });

        let mut guard = lock.lock();
        while *guard == 0 {
            assert!(
                lock.wait_with_timeout(&mut guard, Duration::from_secs(5)),
                "waiter timed out before the opener signaled"
            );
        }
        assert_eq!(*guard, 7);
        drop(guard);
        handle.join().unwrap();
    }

    #[test]
    fn signal_is_sticky() {
        let lock = BoundedWaitLock::new(());
        lock.signal();

        let mut guard = lock.lock();
        assert!(lock.wait_with_timeout(&mut guard, Duration::from_millis(10)));
        assert!(lock.wait_with_timeout(&mut guard, Duration::from_millis(10)));
    }

    #[test]
    fn null_lock_wait_returns_immediately() {
        let lock = NullLock::new(());

        let mut guard = lock.lock();
        let start = Instant::now();
        assert!(lock.wait_with_timeout(&mut guard, Duration::from_secs(60)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn null_lock_guards_state() {
        let lock = Arc::new(NullLock::new(Vec::<u8>::new()));

        let writer = lock.clone();
        let handle = thread::spawn(move || {
            writer.lock().extend_from_slice(&[1, 2, 3]);
        });
        handle.join().unwrap();

        assert_eq!(*lock.lock(), vec![1, 2, 3]);
    }

    // A strictly synchronous sequence must observe the same results no matter
    // which lock implementation backs it.
    #[test]
    fn null_lock_substitutes_for_bounded_wait_on_synchronous_paths() {
        fn run(lock: Arc<dyn Locking<Option<u64>>>) -> (bool, Option<u64>) {
            {
                let mut guard = lock.lock();
                *guard = Some(10);
            }
            lock.signal();
            let mut guard = lock.lock();
            let signaled = lock.wait_with_timeout(&mut guard, Duration::from_millis(10));
            (signaled, *guard)
        }

        let bounded_lock: Arc<dyn Locking<Option<u64>>> = Arc::new(BoundedWaitLock::new(None));
        let null_lock: Arc<dyn Locking<Option<u64>>> = Arc::new(NullLock::new(None));
        let bounded = run(bounded_lock);
        let null = run(null_lock);
        assert_eq!(bounded, null);
        assert_eq!(bounded, (true, Some(10)));
    }
}
