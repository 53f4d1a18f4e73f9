/*!
 * Feed Traits
 */

use super::types::FeedItem;

/// Operations a user's feed supports
///
/// Implementations serialize mutation internally, so every method takes
/// `&self` and the feed can be shared across worker threads.
pub trait Feed: Send + Sync {
    /// Insert a post, keeping the feed ordered by descending timestamp.
    /// Callers do not insert duplicate timestamps.
    fn add(&self, body: String, timestamp: f64);

    /// Remove the post with exactly this timestamp; false if absent
    fn remove(&self, timestamp: f64) -> bool;

    /// Whether a post with exactly this timestamp exists
    fn contains(&self, timestamp: f64) -> bool;

    /// Ordered copy of the feed, newest first
    fn feed_data(&self) -> Vec<FeedItem>;
}
