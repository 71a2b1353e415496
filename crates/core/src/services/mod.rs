//! Business logic services.

#![allow(missing_docs)]

pub mod feed;
pub mod follow;
pub mod like;
pub mod profile;
pub mod revalidate;
pub mod tweet;

pub use feed::{DEFAULT_PAGE_SIZE, FeedFilter, FeedPage, FeedService, FeedTweet, UserSnippet};
pub use follow::FollowService;
pub use like::{LikeService, ToggleOutcome};
pub use profile::{Profile, ProfileService};
pub use revalidate::{HttpPageInvalidator, NoOpInvalidator, PageInvalidator, SharedInvalidator};
pub use tweet::TweetService;
