use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dealfeed_core::{
    Author, Comment, Deal, NewComment, NewDeal, VoteDirection, VoteState, VoteTally,
};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};
use tracing::warn;

use super::{VoteTarget, count_from_column};
use crate::models::{Profile, UserRole};

const DEAL_COLUMNS: &str = "id, title, description, price, original_price, discount, image, \
     store, store_url, category, upvotes, downvotes, author_username, author_avatar, \
     expires_at, coupon_code, shipping_info, created_at";

const COMMENT_COLUMNS: &str =
    "id, deal_id, author_username, author_avatar, content, upvotes, downvotes, created_at";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

#[derive(FromRow)]
struct DealRow {
    id: i64,
    title: String,
    description: String,
    price: f64,
    original_price: f64,
    discount: i32,
    image: String,
    store: String,
    store_url: String,
    category: String,
    upvotes: i64,
    downvotes: i64,
    author_username: String,
    author_avatar: String,
    expires_at: Option<DateTime<Utc>>,
    coupon_code: Option<String>,
    shipping_info: Option<String>,
    created_at: DateTime<Utc>,
}

impl DealRow {
    fn into_deal(self, comments: Vec<Comment>) -> Option<Deal> {
        let id = self.id.to_string();
        let deal = Deal {
            id: id.clone(),
            title: self.title,
            description: self.description,
            price: self.price,
            original_price: self.original_price,
            discount: u32::try_from(self.discount).unwrap_or(0),
            image: self.image,
            store: self.store,
            store_url: self.store_url,
            category: self.category,
            upvotes: count_from_column(self.upvotes),
            downvotes: count_from_column(self.downvotes),
            temperature: 0,
            created_at: self.created_at,
            author: Author {
                username: self.author_username,
                avatar: self.author_avatar,
            },
            comments,
            expires_at: self.expires_at,
            coupon_code: self.coupon_code,
            shipping_info: self.shipping_info,
        };

        deal.ingest()
            .map_err(|errors| warn!("Skipping stored deal {id}: {errors:?}"))
            .ok()
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    deal_id: i64,
    author_username: String,
    author_avatar: String,
    content: String,
    upvotes: i64,
    downvotes: i64,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id.to_string(),
            author: Author {
                username: row.author_username,
                avatar: row.author_avatar,
            },
            content: row.content,
            created_at: row.created_at,
            upvotes: count_from_column(row.upvotes),
            downvotes: count_from_column(row.downvotes),
        }
    }
}

impl VoteTarget {
    fn table(&self) -> &'static str {
        match self {
            VoteTarget::Deal => "deals",
            VoteTarget::Comment => "comments",
        }
    }

    fn votes_table(&self) -> &'static str {
        match self {
            VoteTarget::Deal => "deal_votes",
            VoteTarget::Comment => "comment_votes",
        }
    }

    fn key_column(&self) -> &'static str {
        match self {
            VoteTarget::Deal => "deal_id",
            VoteTarget::Comment => "comment_id",
        }
    }
}

/// Ids are exposed as strings; anything that is not a stored id matches nothing.
fn parse_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { db })
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    pub async fn list_deals(&self) -> Result<Vec<Deal>, sqlx::Error> {
        let rows: Vec<DealRow> =
            sqlx::query_as(&format!("SELECT {DEAL_COLUMNS} FROM deals ORDER BY id"))
                .fetch_all(&self.db)
                .await?;

        let comment_rows: Vec<CommentRow> = sqlx::query_as(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments ORDER BY created_at, id"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut comments: HashMap<i64, Vec<Comment>> = HashMap::new();
        for row in comment_rows {
            comments.entry(row.deal_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let thread = comments.remove(&row.id).unwrap_or_default();
                row.into_deal(thread)
            })
            .collect())
    }

    pub async fn get_deal(&self, id: &str) -> Result<Option<Deal>, sqlx::Error> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };

        let row: Option<DealRow> =
            sqlx::query_as(&format!("SELECT {DEAL_COLUMNS} FROM deals WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let comments = self.comments_for(id).await?;
        Ok(row.into_deal(comments))
    }

    async fn comments_for(&self, deal_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
        let rows: Vec<CommentRow> = sqlx::query_as(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE deal_id = $1 ORDER BY created_at, id"
        ))
        .bind(deal_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    pub async fn insert_deal(
        &self,
        deal: NewDeal,
        author: Author,
        submitted_by: &str,
    ) -> Result<Deal, sqlx::Error> {
        // Id and timestamp are replaced by the database's.
        let draft = deal.into_deal(String::new(), author, Utc::now());

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO deals (title, description, price, original_price, discount, image, \
                 store, store_url, category, author_username, author_avatar, submitted_by, \
                 expires_at, coupon_code, shipping_info) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING id, created_at",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(i32::try_from(draft.discount).unwrap_or(100))
        .bind(&draft.image)
        .bind(&draft.store)
        .bind(&draft.store_url)
        .bind(&draft.category)
        .bind(&draft.author.username)
        .bind(&draft.author.avatar)
        .bind(submitted_by)
        .bind(draft.expires_at)
        .bind(&draft.coupon_code)
        .bind(&draft.shipping_info)
        .fetch_one(&self.db)
        .await?;

        Ok(Deal {
            id: id.to_string(),
            created_at,
            ..draft
        })
    }

    /// Copies a complete deal record, counters included. Returns `false` when
    /// a deal with the same title is already stored.
    pub async fn import_deal(&self, deal: &Deal) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM deals WHERE title = $1)")
                .bind(&deal.title)
                .fetch_one(&self.db)
                .await?;

        if exists {
            return Ok(false);
        }

        let mut tx = self.db.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO deals (title, description, price, original_price, discount, image, \
                 store, store_url, category, upvotes, downvotes, author_username, author_avatar, \
                 expires_at, coupon_code, shipping_info, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING id",
        )
        .bind(&deal.title)
        .bind(&deal.description)
        .bind(deal.price)
        .bind(deal.original_price)
        .bind(i32::try_from(deal.discount).unwrap_or(100))
        .bind(&deal.image)
        .bind(&deal.store)
        .bind(&deal.store_url)
        .bind(&deal.category)
        .bind(i64::from(deal.upvotes))
        .bind(i64::from(deal.downvotes))
        .bind(&deal.author.username)
        .bind(&deal.author.avatar)
        .bind(deal.expires_at)
        .bind(&deal.coupon_code)
        .bind(&deal.shipping_info)
        .bind(deal.created_at)
        .fetch_one(&mut *tx)
        .await?;

        for comment in &deal.comments {
            sqlx::query(
                "INSERT INTO comments (deal_id, author_username, author_avatar, content, \
                     upvotes, downvotes, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(id)
            .bind(&comment.author.username)
            .bind(&comment.author.avatar)
            .bind(&comment.content)
            .bind(i64::from(comment.upvotes))
            .bind(i64::from(comment.downvotes))
            .bind(comment.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    pub async fn deal_votes(&self, user_id: &str) -> Result<HashMap<String, VoteState>, sqlx::Error> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT deal_id, state FROM deal_votes WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.db)
                .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(deal_id, state)| Some((deal_id.to_string(), state.parse().ok()?)))
            .collect())
    }

    /// Reads the caller's previous state and the counters under a row lock,
    /// applies the transition, and writes both back in one transaction.
    pub async fn record_vote(
        &self,
        target: VoteTarget,
        user_id: &str,
        id: &str,
        direction: VoteDirection,
    ) -> Result<Option<VoteTally>, sqlx::Error> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let (table, votes_table, key) = (target.table(), target.votes_table(), target.key_column());

        let mut tx = self.db.begin().await?;

        let counts: Option<(i64, i64)> = sqlx::query_as(&format!(
            "SELECT upvotes, downvotes FROM {table} WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((upvotes, downvotes)) = counts else {
            return Ok(None);
        };

        let prior: Option<String> = sqlx::query_scalar(&format!(
            "SELECT state FROM {votes_table} WHERE user_id = $1 AND {key} = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let prior = prior
            .and_then(|state| state.parse::<VoteState>().ok())
            .unwrap_or_default();
        let mut tally =
            VoteTally::with_state(count_from_column(upvotes), count_from_column(downvotes), prior);
        tally.apply(direction);

        sqlx::query(&format!(
            "UPDATE {table} SET upvotes = $1, downvotes = $2 WHERE id = $3"
        ))
        .bind(i64::from(tally.upvotes()))
        .bind(i64::from(tally.downvotes()))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "INSERT INTO {votes_table} (user_id, {key}, state) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, {key}) \
             DO UPDATE SET state = $3, updated_at = NOW()"
        ))
        .bind(user_id)
        .bind(id)
        .bind(tally.state().as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(tally))
    }

    pub async fn list_comments(&self, deal_id: &str) -> Result<Option<Vec<Comment>>, sqlx::Error> {
        let Some(id) = parse_id(deal_id) else {
            return Ok(None);
        };

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM deals WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        if !exists {
            return Ok(None);
        }

        let mut comments = self.comments_for(id).await?;
        comments.reverse();
        Ok(Some(comments))
    }

    pub async fn insert_comment(
        &self,
        deal_id: &str,
        comment: NewComment,
        author: Author,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let Some(id) = parse_id(deal_id) else {
            return Ok(None);
        };

        let comment = comment.into_comment(String::new(), author, Utc::now());

        let row: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            "INSERT INTO comments (deal_id, author_username, author_avatar, content) \
             SELECT id, $2, $3, $4 FROM deals WHERE id = $1 \
             RETURNING id, created_at",
        )
        .bind(id)
        .bind(&comment.author.username)
        .bind(&comment.author.avatar)
        .bind(&comment.content)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(id, created_at)| Comment {
            id: id.to_string(),
            created_at,
            ..comment
        }))
    }

    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>, sqlx::Error> {
        type ProfileRow = (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<i64>,
            Option<String>,
        );

        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT username, avatar_url, bio, location, reputation::BIGINT, role \
             FROM profiles WHERE id::text = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(username, avatar, bio, location, reputation, role)| {
            let username = username.unwrap_or_else(|| "Guest User".to_string());
            let avatar = avatar.unwrap_or_else(|| Author::new(username.as_str()).avatar);
            Profile {
                username,
                avatar,
                bio: bio.unwrap_or_default(),
                location,
                reputation: reputation.unwrap_or_default(),
                role: role.as_deref().map(UserRole::parse).unwrap_or_default(),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_tables_line_up_with_targets() {
        assert_eq!(VoteTarget::Deal.table(), "deals");
        assert_eq!(VoteTarget::Deal.votes_table(), "deal_votes");
        assert_eq!(VoteTarget::Comment.key_column(), "comment_id");
    }

    #[test]
    fn non_numeric_ids_match_nothing() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("c42"), None);
        assert_eq!(parse_id(""), None);
    }
}
