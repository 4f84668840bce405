mod api;
mod auth;
mod i18n;
mod models;
mod ui;

use std::env;
use std::io::{self, Write};

use chrono::Utc;
use colored::*;
use dealfeed_core::{Deal, Feed, SortKey, VoteDirection};

use api::Api;
use i18n::Language;

const BACKEND_URL: &str = "http://localhost:3000";

// ===== Commands =====

#[derive(Debug, PartialEq)]
enum Command {
    Search(String),
    Category(Option<String>),
    Price(Option<f64>, Option<f64>),
    MinDiscount(Option<u32>),
    Sort(SortKey),
    Clear,
    Vote(usize, VoteDirection),
    Open(usize),
    Comment(usize, String),
    Refresh,
    Language(Language),
    Help,
    Quit,
}

fn optional<T: std::str::FromStr>(arg: Option<&str>) -> Result<Option<T>, String> {
    match arg {
        None | Some("-") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("not a number: {raw}")),
    }
}

fn position(arg: Option<&str>) -> Result<usize, String> {
    arg.and_then(|raw| raw.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .ok_or_else(|| "expected a deal number from the list".to_string())
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    match verb.to_lowercase().as_str() {
        "s" | "search" => Ok(Command::Search(rest.to_string())),
        "c" | "category" => Ok(Command::Category(
            Some(rest.to_string()).filter(|c| !c.is_empty()),
        )),
        "p" | "price" => Ok(Command::Price(optional(args.next())?, optional(args.next())?)),
        "m" | "discount" => Ok(Command::MinDiscount(optional(args.next())?)),
        "o" | "sort" => rest.parse().map(Command::Sort),
        "x" | "clear" => Ok(Command::Clear),
        "u" | "up" => Ok(Command::Vote(position(args.next())?, VoteDirection::Up)),
        "d" | "down" => Ok(Command::Vote(position(args.next())?, VoteDirection::Down)),
        "v" | "view" => Ok(Command::Open(position(args.next())?)),
        "k" | "comment" => {
            let n = position(args.next())?;
            let text = rest.split_once(' ').map(|(_, t)| t.trim()).unwrap_or("");
            Ok(Command::Comment(n, text.to_string()))
        }
        "r" | "refresh" => Ok(Command::Refresh),
        "l" | "lang" => rest.parse().map(Command::Language),
        "h" | "help" | "?" => Ok(Command::Help),
        "q" | "quit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_white().bold());
    println!("  s <text>        search (empty clears)");
    println!("  c <category>    category (empty clears)");
    println!("  p <min> <max>   price range, '-' for no bound");
    println!("  m <percent>     minimum discount, '-' clears");
    println!("  o <key>         sort: hot | new | discount | price-low | price-high");
    println!("  x               clear filters");
    println!("  u <n> / d <n>   upvote / downvote deal n");
    println!("  v <n>           open deal n");
    println!("  k <n> <text>    comment on deal n");
    println!("  r               refresh   l en|pl   language   q quit");
}

// ===== Main =====

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let backend_url = env::var("DEALFEED_URL").unwrap_or_else(|_| BACKEND_URL.to_string());
    let mut language: Language = env::var("DEALFEED_LANG")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or_default();

    println!("{}", "=".repeat(60).bright_cyan());
    println!("{}", "    🔥 DEALFEED 🔥".bright_yellow().bold());
    println!("{}", "=".repeat(60).bright_cyan());
    println!();

    let token = match (env::var("DEALFEED_TOKEN"), env::var("SUPABASE_URL")) {
        (Ok(token), _) => Some(token),
        (Err(_), Ok(supabase_url)) => {
            let provider = env::var("SUPABASE_PROVIDER").unwrap_or_else(|_| "google".to_string());
            match auth::authenticate(&supabase_url, &provider).await {
                Ok(token) => {
                    println!("{}", "✅ Authentication successful!".green().bold());
                    Some(token)
                }
                Err(e) => {
                    eprintln!("{} {}", "❌ Authentication failed:".red().bold(), e);
                    None
                }
            }
        }
        _ => None,
    };

    let api = Api::new(backend_url, token);
    if api.is_authenticated() {
        match api.me().await {
            Ok(me) if me.authenticated => {
                let name = me.profile.map(|p| p.username).unwrap_or_default();
                println!("Signed in as {}", name.bright_cyan().bold());
            }
            Ok(_) => println!("{}", "Token not accepted, browsing anonymously".yellow()),
            Err(e) => eprintln!("{} {}", "⚠️ ".yellow(), e),
        }
    } else {
        println!("{}", "Browsing anonymously".bright_black());
    }

    let mut feed = Feed::default();
    refresh(&api, &mut feed).await?;
    print_help();

    loop {
        print_feed(&mut feed, language);

        print!("{}", "> ".bright_green().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&input) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.red());
                continue;
            }
        };

        match command {
            Command::Search(query) => feed.update_filters(|f| f.set_query(query)),
            Command::Category(category) => feed.update_filters(|f| f.set_category(category)),
            Command::Price(min, max) => feed.update_filters(|f| f.set_price_range(min, max)),
            Command::MinDiscount(min) => feed.update_filters(|f| f.set_min_discount(min)),
            Command::Sort(key) => feed.set_sort(key),
            Command::Clear => feed.update_filters(|f| f.clear()),
            Command::Vote(n, direction) => vote(&api, &mut feed, n, direction, language).await,
            Command::Open(n) => {
                if let Some(id) = visible_id(&mut feed, n) {
                    open(&api, &mut feed, &id, language).await;
                }
            }
            Command::Comment(n, text) => {
                if let Some(id) = visible_id(&mut feed, n) {
                    match api.comment(&id, &text).await {
                        Ok(_) => open(&api, &mut feed, &id, language).await,
                        Err(e) => println!("{} {}", language.t().generic_error.red(), e),
                    }
                }
            }
            Command::Refresh => {
                if let Err(e) = refresh(&api, &mut feed).await {
                    println!("{} {}", language.t().generic_error.red(), e);
                }
            }
            Command::Language(l) => language = l,
            Command::Help => print_help(),
            Command::Quit => break,
        }
    }

    println!();
    println!("{}", "Happy hunting! 👋".bright_cyan().bold());
    Ok(())
}

// ===== Feed =====

async fn refresh(api: &Api, feed: &mut Feed) -> anyhow::Result<()> {
    let entries = api.deals().await?;

    let mut deals: Vec<Deal> = Vec::with_capacity(entries.len());
    for entry in entries {
        feed.set_vote_state(&entry.deal.id, entry.my_vote);
        deals.push(entry.deal);
    }
    feed.replace_deals(deals);
    Ok(())
}

fn print_feed(feed: &mut Feed, language: Language) {
    let t = language.t();
    let filters = feed.filters().clone();
    let sort = feed.sort();

    println!();
    println!("{}", "━".repeat(60).bright_black());
    let mut header = format!("[{}]", ui::sort_label(sort, t));
    if !filters.query.trim().is_empty() {
        header.push_str(&format!(" \"{}\"", filters.query.trim()));
    }
    if let Some(category) = &filters.category {
        header.push_str(&format!(" {}: {category}", t.communities));
    }
    if filters.min_price.is_some() || filters.max_price.is_some() {
        let bound = |b: Option<f64>| b.map(|v| v.to_string()).unwrap_or_else(|| "…".into());
        header.push_str(&format!(" {}–{}", bound(filters.min_price), bound(filters.max_price)));
    }
    if let Some(min) = filters.min_discount {
        header.push_str(&format!(" ≥{min}%"));
    }
    if filters.is_empty() {
        header.push_str(&format!("  {}", t.search_placeholder.bright_black()));
    }
    println!("{}", header.bright_white());
    println!();

    let now = Utc::now();
    let votes: Vec<_> = feed
        .deals()
        .iter()
        .map(|d| (d.id.clone(), feed.vote_state(&d.id)))
        .collect();
    let visible = feed.view();

    if visible.is_empty() {
        println!("{}", t.no_deals.bright_black());
    }
    for (i, deal) in visible.iter().enumerate() {
        let vote = votes
            .iter()
            .find(|(id, _)| *id == deal.id)
            .map(|(_, state)| *state)
            .unwrap_or_default();
        println!("{}", ui::deal_line(i + 1, deal, vote, now));
    }
}

fn visible_id(feed: &mut Feed, n: usize) -> Option<String> {
    let id = feed.view().get(n - 1).map(|deal| deal.id.clone());
    if id.is_none() {
        println!("{}", format!("No deal #{n} in the list").red());
    }
    id
}

async fn vote(api: &Api, feed: &mut Feed, n: usize, direction: VoteDirection, language: Language) {
    let t = language.t();
    if !api.is_authenticated() {
        println!("{}", t.login_to_vote.yellow());
        return;
    }
    let Some(id) = visible_id(feed, n) else {
        return;
    };
    let Some(ticket) = feed.vote(&id, direction) else {
        return;
    };

    match api.vote(&id, direction).await {
        Ok(response) => feed.confirm(ticket, response.tally()),
        Err(e) => {
            feed.rollback(ticket);
            println!("{} {}", t.generic_error.red(), e);
        }
    }
}

async fn open(api: &Api, feed: &mut Feed, id: &str, language: Language) {
    let details = match api.deal(id).await {
        Ok(entry) => entry,
        Err(e) => {
            println!("{} {}", language.t().generic_error.red(), e);
            return;
        }
    };
    let comments = api.comments(id).await.unwrap_or_else(|e| {
        println!("{} {}", language.t().generic_error.red(), e);
        Vec::new()
    });

    println!();
    println!(
        "{}",
        ui::deal_details(&details.deal, details.my_vote, &comments, language.t())
    );

    feed.set_vote_state(id, details.my_vote);
    feed.upsert(details.deal);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_parse_with_optional_bounds() {
        assert_eq!(parse_command("p - 500"), Ok(Command::Price(None, Some(500.0))));
        assert_eq!(parse_command("p 10"), Ok(Command::Price(Some(10.0), None)));
        assert_eq!(parse_command("m 15"), Ok(Command::MinDiscount(Some(15))));
        assert_eq!(parse_command("m -"), Ok(Command::MinDiscount(None)));
        assert!(parse_command("p ten").is_err());
    }

    #[test]
    fn search_keeps_the_whole_phrase() {
        assert_eq!(
            parse_command("s  noise cancelling "),
            Ok(Command::Search("noise cancelling".into()))
        );
        assert_eq!(parse_command("c"), Ok(Command::Category(None)));
        assert_eq!(
            parse_command("c Home"),
            Ok(Command::Category(Some("Home".into())))
        );
    }

    #[test]
    fn votes_need_a_list_position() {
        assert_eq!(parse_command("u 2"), Ok(Command::Vote(2, VoteDirection::Up)));
        assert_eq!(parse_command("d 1"), Ok(Command::Vote(1, VoteDirection::Down)));
        assert!(parse_command("u 0").is_err());
        assert!(parse_command("d").is_err());
    }

    #[test]
    fn sort_and_comment_commands() {
        assert_eq!(parse_command("o price-high"), Ok(Command::Sort(SortKey::PriceHigh)));
        assert!(parse_command("o cheapest").is_err());
        assert_eq!(
            parse_command("k 3 is this still live?"),
            Ok(Command::Comment(3, "is this still live?".into()))
        );
        assert_eq!(parse_command("l pl"), Ok(Command::Language(Language::Pl)));
    }
}
