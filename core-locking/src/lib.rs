//! Bounded-wait locking primitives for blob data sources.
//!
//! This crate provides the synchronization layer that lets a data source with
//! an asynchronous open operation present a synchronous pull API to its
//! consumer:
//!
//! - [`Locking`]: the capability trait, combining mutual exclusion over the
//!   adapter's state with a bounded wait-for-signal rendezvous
//! - [`BoundedWaitLock`]: mutex + condition variable implementation, used
//!   wherever a caller thread must block until a completion callback fires
//! - [`NullLock`]: wait-free implementation for paths where no cross-thread
//!   handoff occurs
//!
//! # Threading Model
//!
//! Each lock instance is owned by exactly one data-source handle and
//! coordinates exactly two parties: the opener (signals once) and the waiter
//! (waits with a timeout). Multiple concurrent waiters are not supported.
//!
//! # Examples
//!
//! ```rust
//! use core_locking::{BoundedWaitLock, Locking};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let lock = Arc::new(BoundedWaitLock::new(0u32));
//!
//! let opener = lock.clone();
//! std::thread::spawn(move || {
//!     *opener.lock() = 42;
//!     opener.signal();
//! });
//!
//! let mut guard = lock.lock();
//! while *guard == 0 {
//!     if !lock.wait_with_timeout(&mut guard, Duration::from_secs(5)) {
//!         break;
//!     }
//! }
//! assert_eq!(*guard, 42);
//! ```

mod lock;

pub use lock::{BoundedWaitLock, Locking, NullLock};
