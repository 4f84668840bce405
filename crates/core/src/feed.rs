use std::collections::HashMap;

use crate::{
    filter::SearchFilters,
    models::Deal,
    sort::SortKey,
    vote::{VoteDirection, VoteState, VoteTally},
};

/// Handle for a vote that was applied locally but not yet acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTicket {
    pub deal_id: String,
    pub direction: VoteDirection,
    prior: VoteTally,
}

/// One viewer's browsing session: the deal collection, the active filters and
/// sort key, and the viewer's vote on each deal.
///
/// The visible list is cached and rebuilt only after the collection, the
/// filters, the sort key, or a vote changes.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    deals: Vec<Deal>,
    filters: SearchFilters,
    sort: SortKey,
    votes: HashMap<String, VoteState>,
    view: Option<Vec<usize>>,
}

impl Feed {
    pub fn new(deals: Vec<Deal>) -> Self {
        Self {
            deals,
            ..Default::default()
        }
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn get(&self, id: &str) -> Option<&Deal> {
        self.deals.iter().find(|deal| deal.id == id)
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn replace_deals(&mut self, deals: Vec<Deal>) {
        self.deals = deals;
        self.view = None;
    }

    /// Adds or replaces a deal by id.
    pub fn upsert(&mut self, deal: Deal) {
        match self.deals.iter_mut().find(|d| d.id == deal.id) {
            Some(existing) => *existing = deal,
            None => self.deals.push(deal),
        }
        self.view = None;
    }

    pub fn update_filters(&mut self, update: impl FnOnce(&mut SearchFilters)) {
        update(&mut self.filters);
        self.view = None;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        if self.sort != sort {
            self.sort = sort;
            self.view = None;
        }
    }

    pub fn vote_state(&self, id: &str) -> VoteState {
        self.votes.get(id).copied().unwrap_or_default()
    }

    /// Records a vote state reported by the server without touching counters.
    pub fn set_vote_state(&mut self, id: &str, state: VoteState) {
        self.votes.insert(id.to_string(), state);
    }

    pub fn tally(&self, id: &str) -> Option<VoteTally> {
        self.get(id)
            .map(|deal| VoteTally::with_state(deal.upvotes, deal.downvotes, self.vote_state(id)))
    }

    /// Filtered and sorted deals, in display order.
    pub fn view(&mut self) -> Vec<&Deal> {
        if self.view.is_none() {
            self.view = Some(self.compute_view());
        }

        let deals = &self.deals;
        self.view
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|&i| &deals[i])
            .collect()
    }

    fn compute_view(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.deals.len())
            .filter(|&i| self.filters.matches(&self.deals[i]))
            .collect();
        indices.sort_by(|&a, &b| self.sort.compare(&self.deals[a], &self.deals[b]));
        indices
    }

    /// Applies a vote locally. The returned ticket settles it once the server
    /// answers, through [`Feed::confirm`] or [`Feed::rollback`].
    pub fn vote(&mut self, id: &str, direction: VoteDirection) -> Option<VoteTicket> {
        let prior = self.tally(id)?;
        let mut next = prior;
        next.apply(direction);
        self.store_tally(id, next);

        Some(VoteTicket {
            deal_id: id.to_string(),
            direction,
            prior,
        })
    }

    /// Replaces the optimistic counters with the server's.
    pub fn confirm(&mut self, ticket: VoteTicket, authoritative: VoteTally) {
        self.store_tally(&ticket.deal_id, authoritative);
    }

    pub fn rollback(&mut self, ticket: VoteTicket) {
        self.store_tally(&ticket.deal_id, ticket.prior);
    }

    fn store_tally(&mut self, id: &str, tally: VoteTally) {
        if let Some(deal) = self.deals.iter_mut().find(|deal| deal.id == id) {
            deal.set_counts(tally.upvotes(), tally.downvotes());
            self.votes.insert(id.to_string(), tally.state());
            self.view = None;
        }
    }
}
