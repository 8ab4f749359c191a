/// Business logic for feeds, follows, posts and comments
pub mod comments;
pub mod feed;
pub mod follow;
pub mod pagination;
pub mod posts;

pub use comments::{CommentForm, CommentService};
pub use feed::{FeedService, GroupFeed, ProfileFeed};
pub use follow::{FollowCounts, FollowOutcome, FollowService};
pub use pagination::{Page, PageWindow, Paginator, POSTS_ON_PAGE};
pub use posts::{PostDetail, PostForm, PostService};

use std::borrow::Cow;
use validator::ValidationError;

/// Form validator: rejects empty and whitespace-only text
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("This field is required.")));
    }
    Ok(())
}
