use chrono::{DateTime, Utc};
use colored::*;
use dealfeed_core::{Comment, Deal, HeatTier, SortKey, VoteState};

use crate::i18n::Translations;

pub fn sort_label(key: SortKey, t: &Translations) -> String {
    match key {
        SortKey::Hot => t.top.to_string(),
        SortKey::New => t.new.to_string(),
        SortKey::Discount => t.percent.to_string(),
        SortKey::PriceLow => "$ ↑".to_string(),
        SortKey::PriceHigh => "$ ↓".to_string(),
    }
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);

    if elapsed.num_days() > 0 {
        format!("{}d ago", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_minutes() > 0 {
        format!("{}m ago", elapsed.num_minutes())
    } else {
        "just now".to_string()
    }
}

fn temperature(value: i64) -> ColoredString {
    let text = format!("{value}°");
    match HeatTier::of(value) {
        HeatTier::Scorching => text.bright_red().bold(),
        HeatTier::Hot => text.red().bold(),
        HeatTier::Warm => text.yellow(),
        HeatTier::Cold => text.bright_black(),
    }
}

fn vote_marker(state: VoteState) -> ColoredString {
    match state {
        VoteState::Up => "▲".bright_green().bold(),
        VoteState::Down => "▼".bright_red().bold(),
        VoteState::None => "·".bright_black(),
    }
}

pub fn deal_line(position: usize, deal: &Deal, vote: VoteState, now: DateTime<Utc>) -> String {
    let discount = if deal.discount > 0 {
        format!(" -{}%", deal.discount).bright_red().bold().to_string()
    } else {
        String::new()
    };
    let expired = if deal.is_expired(now) {
        " (expired)".bright_black().to_string()
    } else {
        String::new()
    };

    format!(
        "{:>3}. {} {:>6}  {}{}{}\n       {} {}  {}  {} · {} · 💬 {}",
        position,
        vote_marker(vote),
        temperature(deal.temperature),
        deal.title.bright_white().bold(),
        discount,
        expired,
        format!("{:.2}", deal.price).green().bold(),
        format!("{:.2}", deal.original_price).bright_black().strikethrough(),
        deal.store.cyan(),
        deal.category.bright_black(),
        time_ago(deal.created_at, now).bright_black(),
        deal.comments.len(),
    )
}

pub fn deal_details(deal: &Deal, vote: VoteState, comments: &[Comment], t: &Translations) -> String {
    let now = Utc::now();
    let mut out = String::new();

    out.push_str(&format!("{}\n", deal.title.bright_yellow().bold()));
    out.push_str(&format!(
        "{} {}  {} {}\n",
        vote_marker(vote),
        temperature(deal.temperature),
        format!("▲ {}", deal.upvotes).green(),
        format!("▼ {}", deal.downvotes).red(),
    ));
    out.push_str(&format!(
        "{}  (was {:.2}, save {:.2})\n",
        format!("{:.2}", deal.price).green().bold(),
        deal.original_price,
        deal.savings()
    ));
    if let Some(code) = &deal.coupon_code {
        out.push_str(&format!("Coupon: {}\n", code.bright_magenta().bold()));
    }
    if let Some(shipping) = &deal.shipping_info {
        out.push_str(&format!("Shipping: {shipping}\n"));
    }
    if let Some(expires) = deal.expires_at {
        out.push_str(&format!("Expires: {}\n", expires.format("%Y-%m-%d %H:%M")));
    }
    out.push_str(&format!(
        "{}: {} {}\n",
        t.go_to_store,
        deal.store.cyan(),
        deal.store_url.bright_blue().underline()
    ));
    out.push_str(&format!(
        "Posted by {} {}\n\n",
        deal.author.username.bright_white(),
        time_ago(deal.created_at, now)
    ));
    out.push_str(&format!("{}\n\n", deal.description));

    out.push_str(&format!("{}\n", format!("Comments ({})", comments.len()).bold()));
    for comment in comments {
        out.push_str(&format!(
            "  {} {} {}\n    {}\n",
            comment.author.username.bright_white().bold(),
            time_ago(comment.created_at, now).bright_black(),
            temperature(comment.temperature()),
            comment.content
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn time_ago_picks_the_largest_unit() {
        let now = Utc.with_ymd_and_hms(2024, 3, 21, 12, 0, 0).unwrap();

        assert_eq!(time_ago(now - Duration::days(3), now), "3d ago");
        assert_eq!(time_ago(now - Duration::hours(5), now), "5h ago");
        assert_eq!(time_ago(now - Duration::minutes(2), now), "2m ago");
        assert_eq!(time_ago(now, now), "just now");
    }
}
