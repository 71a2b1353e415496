//! In-memory cache of fetched feed pages.
//!
//! Pages are keyed by the feed filter that produced them; a profile-summary
//! map sits alongside. After a mutation succeeds the cache is *reconciled*:
//! affected entries are patched in place, with no refetch and no reorder.
//! Everything the patches cannot reach stays as-is and is refreshed by the
//! next natural fetch.
//!
//! Reconciliation runs only after the server confirms a mutation; there is
//! no speculative pre-update to roll back.

use std::collections::HashMap;

use chirp_core::{FeedFilter, FeedPage, FeedTweet, Profile};
use tracing::trace;

/// Token tying an in-flight fetch to the cache state it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken {
    epoch: u64,
}

/// Mutation outcomes the cache reconciles against.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A like toggle succeeded.
    LikeToggled {
        /// The liked/unliked tweet.
        tweet_id: String,
        /// New state of the edge.
        added: bool,
    },
    /// A tweet was created by the session user.
    TweetCreated {
        /// The new tweet, annotated as the server would (zero likes, not
        /// liked, author snippet of the session user).
        tweet: FeedTweet,
    },
    /// A follow toggle succeeded.
    FollowToggled {
        /// The followed/unfollowed user.
        user_id: String,
        /// New state of the edge.
        added: bool,
    },
}

#[derive(Debug, Default)]
struct FeedEntry {
    epoch: u64,
    pages: Vec<FeedPage>,
}

/// Keyed store of fetched feed pages and profile summaries.
#[derive(Debug, Default)]
pub struct FeedCache {
    feeds: HashMap<FeedFilter, FeedEntry>,
    profiles: HashMap<String, Profile>,
}

impl FeedCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a page fetch for `filter`.
    ///
    /// Hold the token across the request and pass it to [`store_page`].
    /// If the entry is invalidated while the request is in flight, the
    /// token goes stale and the late result is dropped instead of
    /// resurrecting discarded pages.
    ///
    /// [`store_page`]: Self::store_page
    #[must_use]
    pub fn begin_fetch(&mut self, filter: &FeedFilter) -> FetchToken {
        let entry = self.feeds.entry(filter.clone()).or_default();
        FetchToken { epoch: entry.epoch }
    }

    /// Append a fetched page to `filter`'s entry.
    ///
    /// Returns `false` (leaving the cache untouched) if `token` is stale.
    pub fn store_page(&mut self, filter: &FeedFilter, token: FetchToken, page: FeedPage) -> bool {
        let entry = self.feeds.entry(filter.clone()).or_default();
        if entry.epoch != token.epoch {
            trace!(?filter, "Dropping stale page fetch");
            return false;
        }
        entry.pages.push(page);
        true
    }

    /// Drop `filter`'s pages and outdate any in-flight fetches for it.
    pub fn invalidate(&mut self, filter: &FeedFilter) {
        let entry = self.feeds.entry(filter.clone()).or_default();
        entry.epoch += 1;
        entry.pages.clear();
    }

    /// Cached pages for `filter`, in fetch order.
    #[must_use]
    pub fn pages(&self, filter: &FeedFilter) -> Option<&[FeedPage]> {
        self.feeds.get(filter).map(|e| e.pages.as_slice())
    }

    /// All cached tweets for `filter`, flattened across pages.
    pub fn tweets(&self, filter: &FeedFilter) -> impl Iterator<Item = &FeedTweet> {
        self.feeds
            .get(filter)
            .into_iter()
            .flat_map(|e| e.pages.iter())
            .flat_map(|p| p.tweets.iter())
    }

    /// Store a profile summary.
    pub fn store_profile(&mut self, user_id: impl Into<String>, profile: Profile) {
        self.profiles.insert(user_id.into(), profile);
    }

    /// Cached profile summary for a user.
    #[must_use]
    pub fn profile(&self, user_id: &str) -> Option<&Profile> {
        self.profiles.get(user_id)
    }

    /// Reconcile the cache with a confirmed mutation.
    pub fn apply(&mut self, event: &CacheEvent) {
        match event {
            CacheEvent::LikeToggled { tweet_id, added } => {
                self.patch_like(tweet_id, *added);
            }
            CacheEvent::TweetCreated { tweet } => {
                self.prepend_tweet(tweet);
            }
            CacheEvent::FollowToggled { user_id, added } => {
                self.patch_follow(user_id, *added);
            }
        }
    }

    /// Patch every cached copy of a tweet across all feed variants.
    ///
    /// Only the matched tweet's `like_count`/`liked_by_me` change; order,
    /// page boundaries, and every other tweet are untouched.
    fn patch_like(&mut self, tweet_id: &str, added: bool) {
        let delta: i64 = if added { 1 } else { -1 };
        for entry in self.feeds.values_mut() {
            for page in &mut entry.pages {
                for tweet in &mut page.tweets {
                    if tweet.id == tweet_id {
                        tweet.like_count = (tweet.like_count + delta).max(0);
                        tweet.liked_by_me = added;
                    }
                }
            }
        }
    }

    /// Prepend a new tweet to the first page of the global feed only.
    ///
    /// Other variants are left to refresh lazily: inserting into them could
    /// put the tweet outside their filters' ordering windows and poison
    /// their cursors.
    fn prepend_tweet(&mut self, tweet: &FeedTweet) {
        if let Some(entry) = self.feeds.get_mut(&FeedFilter::Global) {
            if let Some(first) = entry.pages.first_mut() {
                first.tweets.insert(0, tweet.clone());
            }
        }
    }

    /// Patch a cached profile summary after a follow toggle.
    fn patch_follow(&mut self, user_id: &str, added: bool) {
        if let Some(profile) = self.profiles.get_mut(user_id) {
            profile.is_following = added;
            profile.followers_count = if added {
                profile.followers_count + 1
            } else {
                profile.followers_count.saturating_sub(1)
            };
        }
    }
}
