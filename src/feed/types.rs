/*!
 * Feed Types
 */

use serde::{Deserialize, Serialize};

/// One entry of a feed snapshot
///
/// The timestamp is truncated toward zero from the stored float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub body: String,
    pub timestamp: i64,
}

impl FeedItem {
    pub fn new(body: impl Into<String>, timestamp: i64) -> Self {
        Self {
            body: body.into(),
            timestamp,
        }
    }
}
