use std::{
    collections::HashMap,
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use chrono::Utc;
use dealfeed_core::{
    Author, Comment, Deal, NewComment, NewDeal, VoteDirection, VoteState, VoteTally,
};
use tokio::sync::RwLock;
use tracing::warn;

use super::VoteTarget;
use crate::{
    auth::MOCK_USER_ID,
    models::{Profile, UserRole},
};

pub const SEED_DEALS: &str = include_str!("../../seed/deals.json");

#[derive(Default)]
struct Inner {
    deals: Vec<Deal>,
    deal_votes: HashMap<(String, String), VoteState>,
    comment_votes: HashMap<(String, String), VoteState>,
    profiles: HashMap<String, Profile>,
    next_deal_id: u64,
    next_comment_id: u64,
}

/// Fallback collection used while no database is available. Writes last for
/// the lifetime of the process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

/// Parses a JSON array of deals, dropping records that fail validation.
pub fn parse_deals(json: &str) -> anyhow::Result<Vec<Deal>> {
    let raw: Vec<Deal> = serde_json::from_str(json).context("Failed to parse deal collection")?;

    Ok(raw
        .into_iter()
        .filter_map(|deal| {
            let id = deal.id.clone();
            deal.ingest()
                .map_err(|errors| warn!("Skipping deal {id}: {errors:?}"))
                .ok()
        })
        .collect())
}

pub fn load_seed(path: Option<&Path>) -> anyhow::Result<Vec<Deal>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_deals(&json)
        }
        None => parse_deals(SEED_DEALS),
    }
}

impl MemoryStore {
    pub fn new(deals: Vec<Deal>) -> Self {
        let next_deal_id = deals
            .iter()
            .filter_map(|d| d.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let next_comment_id = deals
            .iter()
            .flat_map(|d| &d.comments)
            .filter_map(|c| c.id.trim_start_matches('c').parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        let demo = Author::new("DealHunter_99");
        let profiles = HashMap::from([(
            MOCK_USER_ID.to_string(),
            Profile {
                username: demo.username,
                avatar: demo.avatar,
                bio: "Always looking for the best tech deals and discounts.".into(),
                location: Some("San Francisco, CA".into()),
                reputation: 1250,
                role: UserRole::User,
            },
        )]);

        Self {
            inner: Arc::new(RwLock::new(Inner {
                deals,
                profiles,
                next_deal_id,
                next_comment_id,
                ..Default::default()
            })),
        }
    }

    pub fn seeded() -> anyhow::Result<Self> {
        Ok(Self::new(parse_deals(SEED_DEALS)?))
    }

    pub async fn list_deals(&self) -> Vec<Deal> {
        self.inner.read().await.deals.clone()
    }

    pub async fn get_deal(&self, id: &str) -> Option<Deal> {
        let inner = self.inner.read().await;
        inner.deals.iter().find(|d| d.id == id).cloned()
    }

    pub async fn insert_deal(&self, deal: NewDeal, author: Author) -> Deal {
        let mut inner = self.inner.write().await;
        let id = inner.next_deal_id.to_string();
        inner.next_deal_id += 1;

        let deal = deal.into_deal(id, author, Utc::now());
        inner.deals.push(deal.clone());
        deal
    }

    pub async fn deal_votes(&self, user_id: &str) -> HashMap<String, VoteState> {
        let inner = self.inner.read().await;
        inner
            .deal_votes
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|((_, deal), state)| (deal.clone(), *state))
            .collect()
    }

    pub async fn record_vote(
        &self,
        target: VoteTarget,
        user_id: &str,
        id: &str,
        direction: VoteDirection,
    ) -> Option<VoteTally> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let key = (user_id.to_string(), id.to_string());

        let (counts, votes) = match target {
            VoteTarget::Deal => {
                let deal = inner.deals.iter_mut().find(|d| d.id == id)?;
                (Counts::Deal(deal), &mut inner.deal_votes)
            }
            VoteTarget::Comment => {
                let comment = inner
                    .deals
                    .iter_mut()
                    .flat_map(|d| d.comments.iter_mut())
                    .find(|c| c.id == id)?;
                (Counts::Comment(comment), &mut inner.comment_votes)
            }
        };

        let prior = votes.get(&key).copied().unwrap_or_default();
        let (upvotes, downvotes) = counts.get();
        let mut tally = VoteTally::with_state(upvotes, downvotes, prior);
        tally.apply(direction);

        counts.set(tally.upvotes(), tally.downvotes());
        votes.insert(key, tally.state());
        Some(tally)
    }

    pub async fn list_comments(&self, deal_id: &str) -> Option<Vec<Comment>> {
        let inner = self.inner.read().await;
        let deal = inner.deals.iter().find(|d| d.id == deal_id)?;
        Some(deal.comments_newest_first().cloned().collect())
    }

    pub async fn insert_comment(
        &self,
        deal_id: &str,
        comment: NewComment,
        author: Author,
    ) -> Option<Comment> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let deal = inner.deals.iter_mut().find(|d| d.id == deal_id)?;

        let comment = comment.into_comment(format!("c{}", inner.next_comment_id), author, Utc::now());
        inner.next_comment_id += 1;
        deal.add_comment(comment.clone());
        Some(comment)
    }

    pub async fn profile(&self, user_id: &str) -> Option<Profile> {
        self.inner.read().await.profiles.get(user_id).cloned()
    }
}

enum Counts<'a> {
    Deal(&'a mut Deal),
    Comment(&'a mut Comment),
}

impl Counts<'_> {
    fn get(&self) -> (u32, u32) {
        match self {
            Counts::Deal(deal) => (deal.upvotes, deal.downvotes),
            Counts::Comment(comment) => (comment.upvotes, comment.downvotes),
        }
    }

    fn set(self, upvotes: u32, downvotes: u32) {
        match self {
            Counts::Deal(deal) => deal.set_counts(upvotes, downvotes),
            Counts::Comment(comment) => {
                comment.upvotes = upvotes;
                comment.downvotes = downvotes;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seed_loads_with_derived_temperatures() {
        let store = MemoryStore::seeded().unwrap();
        let deals = store.list_deals().await;

        assert_eq!(deals.len(), 5);
        let airpods = deals.iter().find(|d| d.id == "1").unwrap();
        assert_eq!(airpods.temperature, 330);
        assert_eq!(airpods.comments.len(), 2);
    }

    #[test]
    fn invalid_records_are_dropped_on_ingestion() {
        let json = r#"[
            {"id": "1", "title": "ok", "description": "", "price": 5.0, "original_price": 10.0,
             "store": "s", "category": "c", "created_at": "2024-03-20T10:00:00Z",
             "author": {"username": "a", "avatar": ""}},
            {"id": "2", "title": "bad", "description": "", "price": -5.0, "original_price": 10.0,
             "store": "s", "category": "c", "created_at": "2024-03-20T10:00:00Z",
             "author": {"username": "a", "avatar": ""}}
        ]"#;

        let deals = parse_deals(json).unwrap();

        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].discount, 50);
    }

    #[tokio::test]
    async fn votes_are_tracked_per_user() {
        let store = MemoryStore::seeded().unwrap();

        let alice = store.record_vote(VoteTarget::Deal, "alice", "3", VoteDirection::Up).await.unwrap();
        let bob = store.record_vote(VoteTarget::Deal, "bob", "3", VoteDirection::Up).await.unwrap();
        assert_eq!((alice.upvotes(), bob.upvotes()), (216, 217));

        let alice = store.record_vote(VoteTarget::Deal, "alice", "3", VoteDirection::Up).await.unwrap();
        assert_eq!(alice.state(), VoteState::None);
        assert_eq!(alice.upvotes(), 216);

        let votes = store.deal_votes("bob").await;
        assert_eq!(votes.get("3"), Some(&VoteState::Up));
    }

    #[tokio::test]
    async fn comment_votes_touch_only_the_comment() {
        let store = MemoryStore::seeded().unwrap();

        let tally = store
            .record_vote(VoteTarget::Comment, "alice", "c2", VoteDirection::Down)
            .await
            .unwrap();
        assert_eq!((tally.upvotes(), tally.downvotes()), (2, 1));

        let deal = store.get_deal("1").await.unwrap();
        assert_eq!((deal.upvotes, deal.downvotes), (342, 12));
        assert!(store.record_vote(VoteTarget::Comment, "alice", "c99", VoteDirection::Up).await.is_none());
    }

    #[tokio::test]
    async fn new_ids_continue_after_the_seed() {
        let store = MemoryStore::seeded().unwrap();
        let comment = store
            .insert_comment("2", NewComment { content: "Nice".into() }, Author::guest())
            .await
            .unwrap();

        assert_eq!(comment.id, "c3");
        assert!(store.insert_comment("42", NewComment { content: "x".into() }, Author::guest()).await.is_none());
    }
}
