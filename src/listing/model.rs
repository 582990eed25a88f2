use crate::config::{
    MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN, MAX_IMAGE_URL_LEN, MAX_PRICE, MAX_TITLE_LEN,
};
use crate::error::{AuctionError, Result};
use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ListingId = i64;

/// An item up for auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: ListingId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub starting_price: i64,
    pub category: Option<String>,
    pub image_url: Option<String>,
    /// Starts `true`; only ever flips to `false`.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// Input for creating a listing, as submitted by its owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub starting_price: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewListing {
    /// Checks bounds and returns a copy with trimmed text. Blank optional
    /// fields collapse to `None`.
    pub fn validated(&self) -> Result<NewListing> {
        let title = required_text("title", &self.title, MAX_TITLE_LEN)?;
        let description = required_text("description", &self.description, MAX_DESCRIPTION_LEN)?;

        if self.starting_price <= 0 {
            return Err(AuctionError::validation(
                "starting_price",
                "must be positive",
            ));
        }
        if self.starting_price > MAX_PRICE {
            return Err(AuctionError::validation(
                "starting_price",
                format!("must be at most {}", MAX_PRICE),
            ));
        }

        Ok(NewListing {
            title,
            description,
            starting_price: self.starting_price,
            category: optional_text("category", self.category.as_deref(), MAX_CATEGORY_LEN)?,
            image_url: optional_text("image_url", self.image_url.as_deref(), MAX_IMAGE_URL_LEN)?,
        })
    }
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuctionError::validation(field, "must not be empty"));
    }
    check_len(field, value, max)?;
    Ok(value.to_string())
}

fn optional_text(field: &'static str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => {
            check_len(field, v, max)?;
            Ok(Some(v.to_string()))
        }
        _ => Ok(None),
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(AuctionError::validation(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}
