//! Feed pagination cursors.
//!
//! A cursor pins the last-seen `(created_at, id)` pair of a feed walk. Feeds
//! order by `(created_at DESC, id DESC)`, so the pair is a total-order key:
//! resuming strictly after it can neither duplicate nor skip a tweet, even
//! when new tweets land between page fetches.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of the last tweet a client has seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCursor {
    /// Creation timestamp of the last-seen tweet.
    pub created_at: DateTime<Utc>,
    /// ID of the last-seen tweet (tie-break for equal timestamps).
    pub id: String,
}

impl FeedCursor {
    /// Create a cursor from a tweet's position.
    #[must_use]
    pub fn new(created_at: DateTime<Utc>, id: impl Into<String>) -> Self {
        Self {
            created_at,
            id: id.into(),
        }
    }

    /// Encode to the opaque wire form.
    ///
    /// Microsecond precision matches what Postgres stores for
    /// `timestamptz`, so a cursor built from a fetched row round-trips
    /// exactly.
    #[must_use]
    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.created_at.timestamp_micros(), self.id);
        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Decode the opaque wire form.
    ///
    /// Returns `None` for anything malformed; callers treat that as
    /// "start of feed" rather than an error.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        let raw = URL_SAFE_NO_PAD.decode(token).ok()?;
        let raw = String::from_utf8(raw).ok()?;
        let (micros, id) = raw.split_once(':')?;
        if id.is_empty() {
            return None;
        }
        let micros: i64 = micros.parse().ok()?;
        let created_at = DateTime::from_timestamp_micros(micros)?;
        Some(Self {
            created_at,
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encode_decode_round_trip() {
        let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 45).unwrap();
        let cursor = FeedCursor::new(created_at, "01h2xcejqtf2nbrexx3vqjhp41");

        let decoded = FeedCursor::decode(&cursor.encode()).unwrap();

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_round_trip_preserves_sub_second_precision() {
        let created_at = DateTime::from_timestamp_micros(1_748_780_445_123_456).unwrap();
        let cursor = FeedCursor::new(created_at, "01h2xcejqtf2nbrexx3vqjhp41");

        let decoded = FeedCursor::decode(&cursor.encode()).unwrap();

        assert_eq!(decoded.created_at, created_at);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(FeedCursor::decode("not base64 at all!!!").is_none());
        assert!(FeedCursor::decode("").is_none());
        // Valid base64 but no separator
        assert!(FeedCursor::decode(&URL_SAFE_NO_PAD.encode("12345")).is_none());
        // Non-numeric timestamp
        assert!(FeedCursor::decode(&URL_SAFE_NO_PAD.encode("abc:id1")).is_none());
        // Missing id
        assert!(FeedCursor::decode(&URL_SAFE_NO_PAD.encode("12345:")).is_none());
    }

    #[test]
    fn test_token_is_url_safe() {
        let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let token = FeedCursor::new(created_at, "01h2xcejqtf2nbrexx3vqjhp41").encode();

        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
