/*!
 * Timeline
 * Singly-linked post list sorted by descending timestamp, guarded by a
 * bounded reader/writer lock
 */

use super::traits::Feed;
use super::types::FeedItem;
use crate::core::sync::BoundedRwLock;
use tracing::trace;

type Link = Option<Box<Post>>;

/// A post on the timeline
struct Post {
    body: String,
    timestamp: f64,
    next: Link,
}

/// Owner of the post chain
#[derive(Default)]
struct PostList {
    start: Link,
}

impl PostList {
    fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.start.as_deref(),
        }
    }
}

impl Drop for PostList {
    // Unlink iteratively so long timelines don't overflow the stack
    fn drop(&mut self) {
        let mut link = self.start.take();
        while let Some(mut post) = link {
            link = post.next.take();
        }
    }
}

struct Iter<'a> {
    next: Option<&'a Post>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Post;

    fn next(&mut self) -> Option<&'a Post> {
        self.next.map(|post| {
            self.next = post.next.as_deref();
            post
        })
    }
}

/// A user's timeline
///
/// `add` and `remove` take the write side of the lock; `contains`,
/// `feed_data` and `len` take the read side.
pub struct Timeline {
    posts: BoundedRwLock<PostList>,
}

impl Timeline {
    /// Create an empty timeline with the default reader cap
    pub fn new() -> Self {
        Self {
            posts: BoundedRwLock::new(PostList::default()),
        }
    }

    /// Create an empty timeline admitting at most `max_readers` concurrent readers
    pub fn with_max_readers(max_readers: usize) -> Self {
        Self {
            posts: BoundedRwLock::with_max_readers(PostList::default(), max_readers),
        }
    }

    pub fn len(&self) -> usize {
        self.posts.read().iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.read().start.is_none()
    }

    #[inline]
    pub fn max_readers(&self) -> usize {
        self.posts.max_readers()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Feed for Timeline {
    fn add(&self, body: String, timestamp: f64) {
        let mut list = self.posts.write();

        // Only a strictly newer post replaces the start; otherwise splice
        // somewhere after it
        let mut cursor = &mut list.start;
        let newest = cursor
            .as_ref()
            .map_or(true, |start| timestamp > start.timestamp);
        if !newest {
            if let Some(start) = cursor {
                cursor = &mut start.next;
            }
        }

        while cursor.as_ref().is_some_and(|post| post.timestamp > timestamp) {
            if let Some(post) = cursor {
                cursor = &mut post.next;
            }
        }

        let next = cursor.take();
        *cursor = Some(Box::new(Post {
            body,
            timestamp,
            next,
        }));
        trace!(timestamp, "post added");
    }

    fn remove(&self, timestamp: f64) -> bool {
        let mut list = self.posts.write();

        let mut cursor = &mut list.start;
        while cursor.as_ref().is_some_and(|post| post.timestamp != timestamp) {
            if let Some(post) = cursor {
                cursor = &mut post.next;
            }
        }

        match cursor.take() {
            Some(mut found) => {
                *cursor = found.next.take();
                trace!(timestamp, "post removed");
                true
            }
            None => false,
        }
    }

    fn contains(&self, timestamp: f64) -> bool {
        self.posts
            .read()
            .iter()
            .any(|post| post.timestamp == timestamp)
    }

    fn feed_data(&self) -> Vec<FeedItem> {
        self.posts
            .read()
            .iter()
            .map(|post| FeedItem {
                body: post.body.clone(),
                timestamp: post.timestamp as i64,
            })
            .collect()
    }
}
