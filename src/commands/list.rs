//! The `outlay list` command: a searched, filtered, sorted, paged view of the transactions.

use crate::api::Mode;
use crate::args::{ListArgs, ShowArgs};
use crate::commands::{connect, Out};
use crate::model::Transaction;
use crate::{query, Config, Result};
use chrono::NaiveDate;
use format_num::NumberFormat;
use rust_decimal::prelude::ToPrimitive;

const TITLE_WIDTH: usize = 28;

/// Loads the transaction set, derives the requested view and renders it as a table.
pub async fn list(config: Config, mode: Mode, args: &ListArgs) -> Result<Out<Vec<Transaction>>> {
    let mut client = connect(&config, mode)?;
    client.load().await?;

    let snapshot = client.transactions();
    let found = query::search(&snapshot, args.search().unwrap_or(""));
    let filtered = query::filter_by_category(&found, args.category());
    let dated = match (args.from(), args.to()) {
        (None, None) => filtered,
        (from, to) => query::filter_by_date_range(
            &filtered,
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(NaiveDate::MAX),
        ),
    };
    let sorted = query::sort(&dated, args.sort(), args.order());
    let page = query::paginate(&sorted, args.page_size(), args.page());

    let message = render_table(&page, sorted.len(), args.page(), args.page_size());
    Ok(Out::new(message, page))
}

/// Fetches and renders one transaction by id.
pub async fn show(config: Config, mode: Mode, args: &ShowArgs) -> Result<Out<Transaction>> {
    let mut client = connect(&config, mode)?;
    let found = client.get(args.id()).await?;
    let num = NumberFormat::new();
    let mut lines = vec![
        format!("{}  {}", found.date(), found.title()),
        format!(
            "{} of {} in {}",
            found.kind(),
            num.format(",.2f", found.amount().value().to_f64().unwrap_or_default()),
            found.category()
        ),
    ];
    if let Some(description) = found.description() {
        lines.push(description.to_string());
    }
    lines.push(format!("id: {}", found.id()));
    Ok(Out::new(lines.join("\n"), found))
}

fn render_table(page: &[Transaction], total: usize, page_number: usize, page_size: usize) -> String {
    if page.is_empty() {
        return format!("No transactions to show ({total} matched).");
    }
    let num = NumberFormat::new();
    let mut lines = vec![format!(
        "{:<10}  {:>12}  {:<7}  {:<16}  {:<TITLE_WIDTH$}  {}",
        "DATE", "AMOUNT", "KIND", "CATEGORY", "TITLE", "ID"
    )];
    for t in page {
        let amount = num.format(",.2f", t.amount().value().to_f64().unwrap_or_default());
        lines.push(format!(
            "{:<10}  {:>12}  {:<7}  {:<16}  {:<TITLE_WIDTH$}  {}",
            t.date().to_string(),
            amount,
            t.kind().to_string(),
            t.category().to_string(),
            shorten(t.title()),
            t.id()
        ));
    }
    let pages = total.div_ceil(page_size.max(1));
    lines.push(format!(
        "Page {page_number} of {pages}, {total} matching transaction(s)"
    ));
    lines.join("\n")
}

fn shorten(title: &str) -> String {
    if title.chars().count() <= TITLE_WIDTH {
        return title.to_string();
    }
    let kept: String = title.chars().take(TITLE_WIDTH - 3).collect();
    format!("{kept}...")
}
