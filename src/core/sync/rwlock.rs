/*!
 * Bounded Reader/Writer Lock
 *
 * Reader/writer lock built from a `parking_lot::Mutex` and a single
 * `parking_lot::Condvar`, with a cap on concurrent readers.
 *
 * # Semantics
 *
 * - `write()` waits until no reader and no writer hold the lock
 * - `read()` waits until no writer holds the lock and fewer than
 *   `max_readers` readers do
 * - Releasing a write guard wakes every waiter
 * - Releasing a read guard wakes waiters only when the reader count hits zero
 *
 * # Known liveness weakness
 *
 * A reader blocked only because the cap is reached is not woken when a
 * single reader leaves; it waits until the reader count drops to zero (or a
 * writer releases). Readers never starve permanently, but admission past a
 * saturated cap is batched.
 */

use crate::core::limits::{DEFAULT_MAX_READERS, MIN_MAX_READERS};
use parking_lot::{Condvar, Mutex};
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Counters guarded by the internal mutex
#[derive(Debug, Default)]
struct Counts {
    read_count: usize,
    write_count: usize,
}

/// Snapshot of the lock's bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockState {
    pub read_count: usize,
    pub write_count: usize,
    pub max_readers: usize,
}

/// Reader/writer lock with a bounded number of concurrent readers
pub struct BoundedRwLock<T> {
    counts: Mutex<Counts>,
    condition: Condvar,
    max_readers: usize,
    data: UnsafeCell<T>,
}

// Safety: access to `data` is serialized by the counts protocol exactly like
// std's RwLock: shared refs only while write_count == 0, a unique ref only
// while read_count == 0 && write_count == 1.
unsafe impl<T: Send> Send for BoundedRwLock<T> {}
unsafe impl<T: Send + Sync> Sync for BoundedRwLock<T> {}

impl<T> BoundedRwLock<T> {
    /// Create a lock admitting up to `DEFAULT_MAX_READERS` readers
    pub fn new(value: T) -> Self {
        Self::with_max_readers(value, DEFAULT_MAX_READERS)
    }

    /// Create a lock with an explicit reader cap (clamped to at least 1)
    pub fn with_max_readers(value: T, max_readers: usize) -> Self {
        Self {
            counts: Mutex::new(Counts::default()),
            condition: Condvar::new(),
            max_readers: max_readers.max(MIN_MAX_READERS),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquire exclusive access, blocking while any reader or writer holds the lock
    pub fn write(&self) -> WriteGuard<'_, T> {
        let mut counts = self.counts.lock();
        while counts.read_count > 0 || counts.write_count > 0 {
            self.condition.wait(&mut counts);
        }
        counts.write_count += 1;
        WriteGuard { lock: self }
    }

    /// Acquire shared access, blocking while a writer holds the lock or the
    /// reader cap is reached
    pub fn read(&self) -> ReadGuard<'_, T> {
        let mut counts = self.counts.lock();
        while counts.write_count > 0 || counts.read_count >= self.max_readers {
            self.condition.wait(&mut counts);
        }
        counts.read_count += 1;
        ReadGuard { lock: self }
    }

    /// Current counters
    pub fn state(&self) -> LockState {
        let counts = self.counts.lock();
        LockState {
            read_count: counts.read_count,
            write_count: counts.write_count,
            max_readers: self.max_readers,
        }
    }

    #[inline]
    pub fn max_readers(&self) -> usize {
        self.max_readers
    }

    /// Consume the lock, returning the protected value
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    fn write_unlock(&self) {
        let mut counts = self.counts.lock();
        counts.write_count -= 1;
        self.condition.notify_all();
    }

    fn read_unlock(&self) {
        let mut counts = self.counts.lock();
        counts.read_count -= 1;
        if counts.read_count == 0 {
            self.condition.notify_all();
        }
    }
}

impl<T: Default> Default for BoundedRwLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for BoundedRwLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedRwLock")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Shared access to the protected value; releases on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ReadGuard<'a, T> {
    lock: &'a BoundedRwLock<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: read_count > 0 and write_count == 0 while this guard lives
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.read_unlock();
    }
}

/// Exclusive access to the protected value; releases on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct WriteGuard<'a, T> {
    lock: &'a BoundedRwLock<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: this guard is the only holder while it lives
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: this guard is the only holder while it lives
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.write_unlock();
    }
}
