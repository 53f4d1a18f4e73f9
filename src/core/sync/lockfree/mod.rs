/*!
 * Lock-Free Synchronization Primitives
 *
 * Structures whose operations never take a mutex; contention is resolved
 * by CAS retry loops and retired memory is reclaimed through epochs.
 */

mod queue;

// Re-export public API
pub use queue::MsQueue;
