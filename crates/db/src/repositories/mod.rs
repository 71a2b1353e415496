//! Database repositories.

pub mod follow;
pub mod like;
pub mod tweet;
pub mod user;

pub use self::follow::FollowRepository;
pub use self::like::{LikeRepository, TweetLikeCount};
pub use self::tweet::TweetRepository;
pub use self::user::UserRepository;
