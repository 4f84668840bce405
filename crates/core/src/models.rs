use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    score::{discount_percent, temperature},
};

const MAX_TITLE_LEN: usize = 200;
const MAX_COMMENT_LEN: usize = 2000;

pub fn avatar_url(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub avatar: String,
}

impl Author {
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        let avatar = avatar_url(&username);
        Self { username, avatar }
    }

    pub fn guest() -> Self {
        Self::new("Guest User")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
}

impl Comment {
    pub fn temperature(&self) -> i64 {
        temperature(self.upvotes, self.downvotes)
    }
}

/// A shared discount listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub original_price: f64,
    /// Whole percent; derived from the prices when not supplied.
    #[serde(default)]
    pub discount: u32,
    #[serde(default)]
    pub image: String,
    pub store: String,
    #[serde(default)]
    pub store_url: String,
    pub category: String,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    /// Always `upvotes - downvotes`, refreshed whenever the counters change.
    #[serde(default)]
    pub temperature: i64,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_info: Option<String>,
}

impl Deal {
    /// Checks a record coming from storage and fills in the derived fields.
    pub fn ingest(mut self) -> Result<Self, Vec<ValidationError>> {
        let errors = check_listing(&self.title, self.price, self.original_price, Some(self.discount));
        if !errors.is_empty() {
            return Err(errors);
        }

        if self.discount == 0 {
            self.discount = discount_percent(self.price, self.original_price);
        }
        self.temperature = temperature(self.upvotes, self.downvotes);
        Ok(self)
    }

    pub fn set_counts(&mut self, upvotes: u32, downvotes: u32) {
        self.upvotes = upvotes;
        self.downvotes = downvotes;
        self.temperature = temperature(upvotes, downvotes);
    }

    pub fn savings(&self) -> f64 {
        (self.original_price - self.price).max(0.0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn comments_newest_first(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().rev()
    }
}

/// A deal as submitted by a user, before the server assigns its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDeal {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub original_price: f64,
    #[serde(default)]
    pub discount: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    pub store: String,
    #[serde(default)]
    pub store_url: String,
    pub category: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub shipping_info: Option<String>,
}

impl NewDeal {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = check_listing(&self.title, self.price, self.original_price, self.discount);
        if self.store.trim().is_empty() {
            errors.push(ValidationError::Missing("store"));
        }
        if self.category.trim().is_empty() {
            errors.push(ValidationError::Missing("category"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Builds the stored record with zeroed counters.
    pub fn into_deal(self, id: String, author: Author, created_at: DateTime<Utc>) -> Deal {
        let discount = self
            .discount
            .unwrap_or_else(|| discount_percent(self.price, self.original_price));

        Deal {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            original_price: self.original_price,
            discount,
            image: self.image.unwrap_or_default(),
            store: self.store.trim().to_string(),
            store_url: self.store_url,
            category: self.category.trim().to_string(),
            upvotes: 0,
            downvotes: 0,
            temperature: 0,
            created_at,
            author,
            comments: Vec::new(),
            expires_at: self.expires_at,
            coupon_code: self.coupon_code.filter(|code| !code.trim().is_empty()),
            shipping_info: self.shipping_info.filter(|info| !info.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(vec![ValidationError::Missing("content")]);
        }
        if content.chars().count() > MAX_COMMENT_LEN {
            return Err(vec![ValidationError::TooLong("content", MAX_COMMENT_LEN)]);
        }
        Ok(())
    }

    pub fn into_comment(self, id: String, author: Author, created_at: DateTime<Utc>) -> Comment {
        Comment {
            id,
            author,
            content: self.content.trim().to_string(),
            created_at,
            upvotes: 0,
            downvotes: 0,
        }
    }
}

fn check_listing(
    title: &str,
    price: f64,
    original_price: f64,
    discount: Option<u32>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push(ValidationError::Missing("title"));
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(ValidationError::TooLong("title", MAX_TITLE_LEN));
    }

    let price_ok = price.is_finite() && price >= 0.0;
    let original_ok = original_price.is_finite() && original_price >= 0.0;
    if !price_ok {
        errors.push(ValidationError::InvalidAmount("price"));
    }
    if !original_ok {
        errors.push(ValidationError::InvalidAmount("original_price"));
    }
    if price_ok && original_ok && original_price < price {
        errors.push(ValidationError::OriginalBelowPrice);
    }

    if discount.is_some_and(|d| d > 100) {
        errors.push(ValidationError::DiscountOutOfRange);
    }

    errors
}
