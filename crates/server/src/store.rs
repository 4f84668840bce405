//! Deal storage. Postgres when a database is configured and reachable,
//! otherwise an in-memory copy of the seed collection.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use dealfeed_core::{Author, Comment, Deal, NewComment, NewDeal, VoteDirection, VoteState, VoteTally};

use crate::models::Profile;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

/// Which kind of item a vote lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Deal,
    Comment,
}

impl Store {
    pub fn kind(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "fallback",
        }
    }

    pub async fn is_healthy(&self) -> bool {
        match self {
            Store::Postgres(pg) => pg.ping().await.is_ok(),
            Store::Memory(_) => true,
        }
    }

    pub async fn list_deals(&self) -> Result<Vec<Deal>, sqlx::Error> {
        match self {
            Store::Postgres(pg) => pg.list_deals().await,
            Store::Memory(mem) => Ok(mem.list_deals().await),
        }
    }

    pub async fn get_deal(&self, id: &str) -> Result<Option<Deal>, sqlx::Error> {
        match self {
            Store::Postgres(pg) => pg.get_deal(id).await,
            Store::Memory(mem) => Ok(mem.get_deal(id).await),
        }
    }

    pub async fn insert_deal(
        &self,
        deal: NewDeal,
        author: Author,
        submitted_by: &str,
    ) -> Result<Deal, sqlx::Error> {
        match self {
            Store::Postgres(pg) => pg.insert_deal(deal, author, submitted_by).await,
            Store::Memory(mem) => Ok(mem.insert_deal(deal, author).await),
        }
    }

    /// The caller's recorded vote on every deal they have touched.
    pub async fn deal_votes(&self, user_id: &str) -> Result<HashMap<String, VoteState>, sqlx::Error> {
        match self {
            Store::Postgres(pg) => pg.deal_votes(user_id).await,
            Store::Memory(mem) => Ok(mem.deal_votes(user_id).await),
        }
    }

    /// Applies one button press from `user_id`. `None` when the item does not
    /// exist.
    pub async fn record_vote(
        &self,
        target: VoteTarget,
        user_id: &str,
        id: &str,
        direction: VoteDirection,
    ) -> Result<Option<VoteTally>, sqlx::Error> {
        match self {
            Store::Postgres(pg) => pg.record_vote(target, user_id, id, direction).await,
            Store::Memory(mem) => Ok(mem.record_vote(target, user_id, id, direction).await),
        }
    }

    /// Comments on a deal, newest first. `None` when the deal does not exist.
    pub async fn list_comments(&self, deal_id: &str) -> Result<Option<Vec<Comment>>, sqlx::Error> {
        match self {
            Store::Postgres(pg) => pg.list_comments(deal_id).await,
            Store::Memory(mem) => Ok(mem.list_comments(deal_id).await),
        }
    }

    pub async fn insert_comment(
        &self,
        deal_id: &str,
        comment: NewComment,
        author: Author,
    ) -> Result<Option<Comment>, sqlx::Error> {
        match self {
            Store::Postgres(pg) => pg.insert_comment(deal_id, comment, author).await,
            Store::Memory(mem) => Ok(mem.insert_comment(deal_id, comment, author).await),
        }
    }

    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>, sqlx::Error> {
        match self {
            Store::Postgres(pg) => pg.profile(user_id).await,
            Store::Memory(mem) => Ok(mem.profile(user_id).await),
        }
    }
}

/// Storage columns are signed; counters are not.
pub(crate) fn count_from_column(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counts_clamp_to_zero() {
        assert_eq!(count_from_column(-3), 0);
        assert_eq!(count_from_column(42), 42);
        assert_eq!(count_from_column(i64::MAX), u32::MAX);
    }
}
