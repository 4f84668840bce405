use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{models::Deal, score::temperature};

/// Ordering offered on the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Hot,
    New,
    Discount,
    PriceLow,
    PriceHigh,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Hot,
        SortKey::New,
        SortKey::Discount,
        SortKey::PriceLow,
        SortKey::PriceHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Hot => "hot",
            SortKey::New => "new",
            SortKey::Discount => "discount",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
        }
    }

    /// Ordering of `a` relative to `b` under this key. Earlier in the feed
    /// compares as `Less`.
    pub fn compare(&self, a: &Deal, b: &Deal) -> Ordering {
        match self {
            SortKey::Hot => {
                temperature(b.upvotes, b.downvotes).cmp(&temperature(a.upvotes, a.downvotes))
            }
            SortKey::New => b.created_at.cmp(&a.created_at),
            SortKey::Discount => b.discount.cmp(&a.discount),
            SortKey::PriceLow => a.price.total_cmp(&b.price),
            SortKey::PriceHigh => b.price.total_cmp(&a.price),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}

/// Returns the deals ordered by `key`. Equal keys keep their incoming order.
pub fn sort_deals<'a, I>(deals: I, key: SortKey) -> Vec<&'a Deal>
where
    I: IntoIterator<Item = &'a Deal>,
{
    let mut sorted: Vec<&Deal> = deals.into_iter().collect();
    sorted.sort_by(|a, b| key.compare(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::Author;

    fn deal(id: &str, price: f64, discount: u32, upvotes: u32, downvotes: u32, age_days: i64) -> Deal {
        let now = Utc.with_ymd_and_hms(2024, 3, 21, 8, 0, 0).unwrap();
        let mut deal = Deal {
            id: id.into(),
            title: format!("Deal {id}"),
            description: String::new(),
            price,
            original_price: price,
            discount,
            image: String::new(),
            store: "Store".into(),
            store_url: String::new(),
            category: "Misc".into(),
            upvotes: 0,
            downvotes: 0,
            temperature: 0,
            created_at: now - Duration::days(age_days),
            author: Author::guest(),
            comments: Vec::new(),
            expires_at: None,
            coupon_code: None,
            shipping_info: None,
        };
        deal.set_counts(upvotes, downvotes);
        deal
    }

    fn ids(deals: &[&Deal]) -> Vec<String> {
        deals.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn keys_parse_from_their_wire_names() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>(), Ok(key));
        }
        assert!("cold".parse::<SortKey>().is_err());
        assert_eq!(SortKey::default(), SortKey::Hot);
    }

    #[test]
    fn hot_uses_net_votes_not_upvotes() {
        let deals = vec![deal("a", 1.0, 0, 100, 95, 0), deal("b", 1.0, 0, 10, 0, 0)];

        assert_eq!(ids(&sort_deals(&deals, SortKey::Hot)), ["b", "a"]);
    }

    #[test]
    fn price_orders_are_mirrors() {
        let deals = vec![
            deal("mid", 50.0, 0, 0, 0, 0),
            deal("high", 99.5, 0, 0, 0, 0),
            deal("low", 0.0, 0, 0, 0, 0),
        ];

        assert_eq!(ids(&sort_deals(&deals, SortKey::PriceLow)), ["low", "mid", "high"]);
        assert_eq!(ids(&sort_deals(&deals, SortKey::PriceHigh)), ["high", "mid", "low"]);
    }

    #[test]
    fn ties_keep_incoming_order() {
        let deals = vec![
            deal("first", 10.0, 20, 5, 0, 3),
            deal("second", 10.0, 20, 5, 0, 3),
            deal("third", 10.0, 40, 5, 0, 3),
        ];

        for key in SortKey::ALL {
            let sorted = sort_deals(&deals, key);
            let first = sorted.iter().position(|d| d.id == "first").unwrap();
            let second = sorted.iter().position(|d| d.id == "second").unwrap();
            assert!(first < second, "{key} reordered equal deals");
        }
    }

    #[test]
    fn sorting_does_not_touch_the_input() {
        let deals = vec![deal("old", 1.0, 0, 0, 0, 9), deal("new", 1.0, 0, 0, 0, 1)];

        let sorted = sort_deals(&deals, SortKey::New);

        assert_eq!(ids(&sorted), ["new", "old"]);
        assert_eq!(deals[0].id, "old");
    }

    #[test]
    fn sorting_is_repeatable() {
        let deals = vec![
            deal("a", 3.0, 5, 1, 0, 2),
            deal("b", 1.0, 5, 1, 0, 2),
            deal("c", 2.0, 7, 4, 1, 5),
        ];

        for key in SortKey::ALL {
            let once = sort_deals(&deals, key);
            let twice = sort_deals(once.iter().copied(), key);
            assert_eq!(ids(&once), ids(&twice));
            assert!(once.windows(2).all(|w| key.compare(w[0], w[1]) != Ordering::Greater));
        }
    }
}
