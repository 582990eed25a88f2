// region:    --- Imports
use crate::config::MAX_COMMENT_LEN;
use crate::error::{AuctionError, Result};
use crate::listing::ListingId;
use crate::user::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
// endregion: --- Imports

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub listing_id: ListingId,
    pub author_id: UserId,
    pub content: String,
    pub posted_at: DateTime<Utc>,
}

pub fn normalize_content(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AuctionError::validation("content", "must not be empty"));
    }
    if content.chars().count() > MAX_COMMENT_LEN {
        return Err(AuctionError::validation(
            "content",
            format!("must be at most {} characters", MAX_COMMENT_LEN),
        ));
    }
    Ok(content.to_string())
}

/// Append-only comments scoped to a listing.
#[async_trait]
pub trait CommentLog {
    /// Fails with `NotFound` if the listing does not exist.
    async fn add_comment(
        &self,
        listing_id: ListingId,
        author: UserId,
        content: &str,
    ) -> Result<Comment>;

    async fn list_comments(&self, listing_id: ListingId) -> Result<Vec<Comment>>;
}
