/*!
 * Michael-Scott Lock-Free Queue
 * Unbounded MPMC FIFO built on atomic pointer CAS with epoch-based reclamation
 */

use crossbeam_epoch::{self as epoch, Atomic, Owned, Shared};
use std::mem::MaybeUninit;
use std::ops::Deref;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed, Release};

/// Queue link. The dummy at `head` holds no initialized task.
struct Node<T> {
    task: MaybeUninit<T>,
    next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    fn sentinel() -> Self {
        Self {
            task: MaybeUninit::uninit(),
            next: Atomic::null(),
        }
    }
}

/// Keeps `head` and `tail` on separate cache lines
#[repr(C, align(64))]
struct CacheAligned<T>(T);

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

/// Unbounded lock-free FIFO queue
///
/// # Performance
///
/// - **Enqueue**: Lock-free, one successful CAS on `tail.next` plus a
///   best-effort swing of `tail`
/// - **Dequeue**: Lock-free, one successful CAS on `head`
/// - **Memory reclamation**: Retired heads are deferred via epochs, never
///   freed while another thread may still read them
///
/// # Ordering
///
/// Single producer/single consumer sees strict FIFO. With several producers
/// or consumers every operation still linearizes, but arrival order across
/// producers is not preserved.
pub struct MsQueue<T> {
    head: CacheAligned<Atomic<Node<T>>>,
    tail: CacheAligned<Atomic<Node<T>>>,
}

// Safety: tasks move between threads by value, each is read out exactly once
// by the consumer whose head CAS succeeded
unsafe impl<T: Send> Send for MsQueue<T> {}
unsafe impl<T: Send> Sync for MsQueue<T> {}

impl<T> MsQueue<T> {
    /// Create an empty queue holding only the dummy node
    pub fn new() -> Self {
        let queue = Self {
            head: CacheAligned(Atomic::null()),
            tail: CacheAligned(Atomic::null()),
        };

        // Safety: the queue is not shared yet
        unsafe {
            let guard = epoch::unprotected();
            let sentinel = Owned::new(Node::sentinel()).into_shared(guard);
            queue.head.store(sentinel, Relaxed);
            queue.tail.store(sentinel, Relaxed);
        }

        queue
    }

    /// Append a task at the logical tail. Never blocks.
    pub fn enqueue(&self, task: T) {
        let guard = &epoch::pin();
        let node = Owned::new(Node {
            task: MaybeUninit::new(task),
            next: Atomic::null(),
        })
        .into_shared(guard);

        loop {
            let tail = self.tail.load(Acquire, guard);
            // Safety: tail is never null and the guard keeps it alive
            let tail_ref = unsafe { tail.deref() };
            let next = tail_ref.next.load(Acquire, guard);

            if tail != self.tail.load(Acquire, guard) {
                continue;
            }

            if !next.is_null() {
                // Tail is lagging; help swing it and retry
                let _ = self.tail.compare_exchange(tail, next, Release, Relaxed, guard);
                continue;
            }

            if tail_ref
                .next
                .compare_exchange(Shared::null(), node, Release, Relaxed, guard)
                .is_ok()
            {
                // Failure is fine: whoever observes the lag finishes the swing
                let _ = self.tail.compare_exchange(tail, node, Release, Relaxed, guard);
                return;
            }
        }
    }

    /// Remove the oldest task, or `None` if the queue was observed empty.
    /// Never blocks.
    pub fn dequeue(&self) -> Option<T> {
        let guard = &epoch::pin();

        loop {
            let head = self.head.load(Acquire, guard);
            let tail = self.tail.load(Acquire, guard);
            // Safety: head is never null and the guard keeps it alive
            let next = unsafe { head.deref() }.next.load(Acquire, guard);

            if head != self.head.load(Acquire, guard) {
                continue;
            }

            if head == tail {
                if next.is_null() {
                    return None;
                }
                let _ = self.tail.compare_exchange(tail, next, Release, Relaxed, guard);
                continue;
            }

            // Safety: the guard keeps next alive
            let Some(next_ref) = (unsafe { next.as_ref() }) else {
                continue;
            };

            if self
                .head
                .compare_exchange(head, next, AcqRel, Acquire, guard)
                .is_ok()
            {
                // Safety: only the winner of the head CAS reads the task out of
                // `next`, which is now the dummy and is never read again. The
                // old dummy is unreachable from the queue from here on.
                unsafe {
                    let task = next_ref.task.assume_init_read();
                    guard.defer_destroy(head);
                    return Some(task);
                }
            }
        }
    }

    /// True when the dummy has no successor
    pub fn is_empty(&self) -> bool {
        let guard = &epoch::pin();
        let head = self.head.load(Acquire, guard);
        // Safety: head is never null and the guard keeps it alive
        unsafe { head.deref() }.next.load(Acquire, guard).is_null()
    }
}

impl<T> Default for MsQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for MsQueue<T> {
    fn drop(&mut self) {
        while self.dequeue().is_some() {}

        // Safety: &mut self means no other thread can reach the dummy
        unsafe {
            let guard = epoch::unprotected();
            let sentinel = self.head.load(Relaxed, guard);
            drop(sentinel.into_owned());
        }
    }
}
