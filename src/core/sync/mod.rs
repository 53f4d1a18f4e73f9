/*!
 * Synchronization Primitives
 *
 * - `BoundedRwLock`: mutex + condvar reader/writer lock with a reader cap
 * - `lockfree::MsQueue`: Michael-Scott queue with epoch-based reclamation
 *
 * # Architecture
 *
 * The queue hands requests from the producer to the worker pool without
 * blocking; the lock serializes every access to the shared timeline.
 */

pub mod lockfree;
mod rwlock;

pub use lockfree::MsQueue;
pub use rwlock::{BoundedRwLock, LockState, ReadGuard, WriteGuard};
