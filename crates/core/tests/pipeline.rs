use chrono::{DateTime, TimeZone, Utc};
use dealfeed_core::{
    Author, Deal, Feed, SearchFilters, SortKey, VoteDirection, VoteState, VoteTally,
    filter_deals, sort_deals,
};

fn deal(id: &str, price: f64, discount: u32, temperature: u32, created_at: DateTime<Utc>) -> Deal {
    let mut deal = Deal {
        id: id.into(),
        title: format!("Deal {id}"),
        description: String::new(),
        price,
        original_price: price * 2.0,
        discount,
        image: String::new(),
        store: "Store".into(),
        store_url: String::new(),
        category: "Electronics".into(),
        upvotes: 0,
        downvotes: 0,
        temperature: 0,
        created_at,
        author: Author::guest(),
        comments: Vec::new(),
        expires_at: None,
        coupon_code: None,
        shipping_info: None,
    };
    deal.set_counts(temperature, 0);
    deal
}

fn a_and_b() -> Vec<Deal> {
    let t1 = Utc.with_ymd_and_hms(2024, 3, 18, 9, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2024, 3, 19, 9, 0, 0).unwrap();
    vec![deal("A", 100.0, 10, 5, t1), deal("B", 50.0, 30, 20, t2)]
}

fn ids(deals: &[&Deal]) -> Vec<String> {
    deals.iter().map(|d| d.id.clone()).collect()
}

#[test]
fn every_sort_key_orders_a_and_b() {
    let deals = a_and_b();
    let expected = [
        (SortKey::Hot, ["B", "A"]),
        (SortKey::New, ["B", "A"]),
        (SortKey::Discount, ["B", "A"]),
        (SortKey::PriceLow, ["B", "A"]),
        (SortKey::PriceHigh, ["A", "B"]),
    ];

    for (key, order) in expected {
        assert_eq!(ids(&sort_deals(&deals, key)), order, "sort {key}");
    }
}

#[test]
fn min_discount_with_empty_query_keeps_only_b() {
    let deals = a_and_b();
    let filters = SearchFilters {
        query: String::new(),
        min_discount: Some(15),
        ..Default::default()
    };

    assert_eq!(ids(&filter_deals(&deals, &filters)), ["B"]);
}

#[test]
fn up_then_down_then_down_nets_to_zero() {
    let mut tally = VoteTally::new(10, 2);

    tally.apply_upvote();
    assert_eq!(tally.state(), VoteState::Up);
    tally.apply_downvote();
    assert_eq!(tally.state(), VoteState::Down);
    tally.apply_downvote();

    assert_eq!(tally, VoteTally::new(10, 2));
}

#[test]
fn filter_then_sort_through_a_session() {
    let mut feed = Feed::new(a_and_b());
    feed.update_filters(|f| f.set_price_range(None, Some(100.0)));
    feed.set_sort(SortKey::PriceHigh);

    let order: Vec<_> = feed.view().into_iter().map(|d| d.id.clone()).collect();
    assert_eq!(order, ["A", "B"]);

    feed.set_sort(SortKey::Hot);
    let ticket = feed.vote("B", VoteDirection::Down).unwrap();
    assert_eq!(ticket.deal_id, "B");
    let order: Vec<_> = feed.view().into_iter().map(|d| d.id.clone()).collect();
    assert_eq!(order, ["B", "A"]);
}
