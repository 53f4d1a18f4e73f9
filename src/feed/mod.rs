/*!
 * Feed Module
 * Per-user timeline of posts ordered newest first
 */

pub mod timeline;
pub mod traits;
pub mod types;

// Re-export public API
pub use timeline::Timeline;
pub use traits::Feed;
pub use types::FeedItem;
