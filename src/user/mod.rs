// region:    --- Imports
use crate::config::MAX_USER_NAME_LEN;
use crate::error::{AuctionError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
// endregion: --- Imports

pub type UserId = i64;

/// Registered marketplace user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

/// Trims and checks a user name before registration.
pub fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuctionError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_USER_NAME_LEN {
        return Err(AuctionError::validation(
            "name",
            format!("must be at most {} characters", MAX_USER_NAME_LEN),
        ));
    }
    Ok(name.to_string())
}

#[async_trait]
pub trait UserDirectory {
    /// Fails with `Validation` when the name is already taken.
    async fn register_user(&self, name: &str) -> Result<User>;
    async fn get_user(&self, id: UserId) -> Result<User>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(normalize_name("  alice ").unwrap(), "alice");
        assert!(normalize_name("   ").is_err());
        assert!(normalize_name(&"x".repeat(MAX_USER_NAME_LEN + 1)).is_err());
    }
}
