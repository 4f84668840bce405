use dealfeed_core::{Author, Deal, SearchFilters, SortKey, VoteDirection, VoteState, VoteTally};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Moderator,
    #[default]
    User,
}

impl UserRole {
    pub fn parse(role: &str) -> Self {
        match role {
            "super_admin" => UserRole::SuperAdmin,
            "moderator" => UserRole::Moderator,
            _ => UserRole::User,
        }
    }

    pub fn can_moderate(&self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::Moderator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub reputation: i64,
    #[serde(default)]
    pub role: UserRole,
}

impl Profile {
    pub fn author(&self) -> Author {
        Author {
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Query string accepted by `GET /deals`.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_discount: Option<u32>,
    pub sort: Option<SortKey>,
}

impl FeedQuery {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            query: self.query.clone().unwrap_or_default(),
            category: self.category.clone().filter(|c| !c.trim().is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            min_discount: self.min_discount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub deal: Deal,
    pub my_vote: VoteState,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

/// Id of the voted item, serialized as `deal_id` or `comment_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotedItem {
    #[serde(rename = "deal_id")]
    Deal(String),
    #[serde(rename = "comment_id")]
    Comment(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    #[serde(flatten)]
    pub item: VotedItem,
    pub upvotes: u32,
    pub downvotes: u32,
    pub temperature: i64,
    pub state: VoteState,
}

impl VoteResponse {
    pub fn new(item: VotedItem, tally: VoteTally) -> Self {
        Self {
            item,
            upvotes: tally.upvotes(),
            downvotes: tally.downvotes(),
            temperature: tally.temperature(),
            state: tally.state(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub deals: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub profile: Option<Profile>,
    pub role: Option<UserRole>,
    pub can_moderate: bool,
}
