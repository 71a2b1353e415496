//! Database entities.

pub mod follow;
pub mod like;
pub mod tweet;
pub mod user;

pub use self::follow::Entity as Follow;
pub use self::like::Entity as Like;
pub use self::tweet::Entity as Tweet;
pub use self::user::Entity as User;
