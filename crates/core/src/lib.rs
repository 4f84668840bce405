//! Ranking and vote bookkeeping for the deal feed.
//!
//! Deals flow through [`filter::filter_deals`] and then [`sort::sort_deals`]
//! before they are shown. Votes are tracked per viewer with [`vote::VoteTally`],
//! and the [`score::temperature`] they produce is what the `hot` ordering reads.
//! [`feed::Feed`] ties the pieces together for a single browsing session.

pub mod error;
pub mod feed;
pub mod filter;
pub mod models;
pub mod score;
pub mod sort;
pub mod vote;

pub use error::ValidationError;
pub use feed::{Feed, VoteTicket};
pub use filter::{SearchFilters, filter_deals};
pub use models::{Author, Comment, Deal, NewComment, NewDeal};
pub use score::{HeatTier, discount_percent, temperature};
pub use sort::{SortKey, sort_deals};
pub use vote::{VoteDelta, VoteDirection, VoteState, VoteTally, transition};
