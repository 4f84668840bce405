use serde::{Deserialize, Serialize};

use crate::models::Deal;

/// Narrowing criteria for the feed. `None` on any field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub query: String,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_discount: Option<u32>,
}

impl SearchFilters {
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    pub fn set_price_range(&mut self, min: Option<f64>, max: Option<f64>) {
        self.min_price = min;
        self.max_price = max;
    }

    pub fn set_min_discount(&mut self, discount: Option<u32>) {
        self.min_discount = discount;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.category().is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_discount.is_none()
    }

    pub fn matches(&self, deal: &Deal) -> bool {
        self.matches_query(deal)
            && self.category().is_none_or(|c| deal.category == c)
            && self.min_price.is_none_or(|min| deal.price >= min)
            && self.max_price.is_none_or(|max| deal.price <= max)
            && self.min_discount.is_none_or(|min| deal.discount >= min)
    }

    /// The category constraint, with a blank name counting as none.
    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.trim().is_empty())
    }

    fn matches_query(&self, deal: &Deal) -> bool {
        if self.query.trim().is_empty() {
            return true;
        }

        let query = self.query.to_lowercase();
        [&deal.title, &deal.description, &deal.store, &deal.category]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Keeps the deals accepted by `filters`, in their original order.
pub fn filter_deals<'a, I>(deals: I, filters: &SearchFilters) -> Vec<&'a Deal>
where
    I: IntoIterator<Item = &'a Deal>,
{
    deals.into_iter().filter(|deal| filters.matches(deal)).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::Author;

    fn deal(id: &str, title: &str, store: &str, category: &str, price: f64, discount: u32) -> Deal {
        Deal {
            id: id.into(),
            title: title.into(),
            description: format!("{title} at a great price"),
            price,
            original_price: price * 2.0,
            discount,
            image: String::new(),
            store: store.into(),
            store_url: String::new(),
            category: category.into(),
            upvotes: 0,
            downvotes: 0,
            temperature: 0,
            created_at: Utc.with_ymd_and_hms(2024, 3, 20, 10, 0, 0).unwrap(),
            author: Author::guest(),
            comments: Vec::new(),
            expires_at: None,
            coupon_code: None,
            shipping_info: None,
        }
    }

    fn catalogue() -> Vec<Deal> {
        vec![
            deal("1", "Apple AirPods Pro", "Amazon", "Electronics", 199.0, 20),
            deal("2", "Herman Miller Aeron Chair", "Herman Miller", "Home", 1100.0, 33),
            deal("3", "LG OLED C3", "Best Buy", "Electronics", 1299.0, 28),
            deal("4", "Espresso Machine", "Amazon", "Kitchen", 250.0, 10),
        ]
    }

    fn ids(deals: &[&Deal]) -> Vec<String> {
        deals.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn empty_filters_keep_everything() {
        let deals = catalogue();
        let filters = SearchFilters::default();

        assert!(filters.is_empty());
        assert_eq!(ids(&filter_deals(&deals, &filters)), ["1", "2", "3", "4"]);
    }

    #[test]
    fn blank_query_is_ignored() {
        let deals = catalogue();
        let filters = SearchFilters {
            query: "   ".into(),
            ..Default::default()
        };

        assert_eq!(filter_deals(&deals, &filters).len(), 4);
    }

    #[test]
    fn query_is_case_insensitive_across_fields() {
        let deals = catalogue();
        let mut filters = SearchFilters::default();

        filters.set_query("AMAZON");
        assert_eq!(ids(&filter_deals(&deals, &filters)), ["1", "4"]);

        filters.set_query("kitchen");
        assert_eq!(ids(&filter_deals(&deals, &filters)), ["4"]);

        filters.set_query("great price");
        assert_eq!(filter_deals(&deals, &filters).len(), 4);
    }

    #[test]
    fn category_must_match_exactly() {
        let deals = catalogue();
        let mut filters = SearchFilters::default();
        filters.set_category(Some("Electronics".into()));

        assert_eq!(ids(&filter_deals(&deals, &filters)), ["1", "3"]);

        filters.set_category(Some("electronics".into()));
        assert!(filter_deals(&deals, &filters).is_empty());
    }

    #[test]
    fn blank_category_is_no_constraint() {
        let deals = catalogue();
        let mut filters = SearchFilters::default();
        filters.set_category(Some(String::new()));

        assert_eq!(filter_deals(&deals, &filters).len(), deals.len());
        assert!(filters.is_empty());

        filters.set_category(Some("  ".into()));
        assert_eq!(filter_deals(&deals, &filters).len(), deals.len());
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let deals = catalogue();
        let mut filters = SearchFilters::default();
        filters.set_price_range(Some(199.0), Some(1100.0));

        assert_eq!(ids(&filter_deals(&deals, &filters)), ["1", "2", "4"]);

        filters.set_price_range(None, Some(199.0));
        assert_eq!(ids(&filter_deals(&deals, &filters)), ["1"]);
    }

    #[test]
    fn zero_min_discount_is_still_a_constraint_of_zero() {
        let deals = catalogue();
        let mut filters = SearchFilters::default();
        filters.set_min_discount(Some(0));

        assert_eq!(filter_deals(&deals, &filters).len(), 4);

        filters.set_min_discount(Some(28));
        assert_eq!(ids(&filter_deals(&deals, &filters)), ["2", "3"]);
    }

    #[test]
    fn constraints_combine_with_and() {
        let deals = catalogue();
        let filters = SearchFilters {
            query: "a".into(),
            category: Some("Electronics".into()),
            min_price: Some(500.0),
            max_price: None,
            min_discount: Some(25),
        };

        assert_eq!(ids(&filter_deals(&deals, &filters)), ["3"]);
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let deals = catalogue();
        let filters = SearchFilters {
            query: "e".into(),
            min_discount: Some(15),
            ..Default::default()
        };

        let once = filter_deals(&deals, &filters);
        let twice = filter_deals(once.iter().copied(), &filters);

        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn clear_resets_every_field() {
        let mut filters = SearchFilters::default();
        filters.set_query("tv");
        filters.set_category(Some("Electronics".into()));
        filters.set_price_range(Some(1.0), Some(2.0));
        filters.set_min_discount(Some(5));
        filters.clear();

        assert_eq!(filters, SearchFilters::default());
    }
}
