//! The derivation engine: pure functions over a cache snapshot.
//!
//! Every function here is deterministic for a given input and parameters, returns fresh data,
//! and never mutates the view it was handed. Anything time-dependent takes the reference date
//! as a parameter instead of reading the clock.

use crate::model::{Amount, Category, CategoryFilter, CategorySummary, Summary, Transaction};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The sortable fields of a transaction view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Amount,
    Title,
    Category,
}

serde_plain::derive_display_from_serialize!(SortKey);
serde_plain::derive_fromstr_from_deserialize!(SortKey);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

serde_plain::derive_display_from_serialize!(SortOrder);
serde_plain::derive_fromstr_from_deserialize!(SortOrder);

/// Aggregate for one calendar month, keyed by `"YYYY-MM"` in [`monthly_totals`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyTotal {
    total: Amount,
    count: u64,
}

impl MonthlyTotal {
    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Case-insensitive substring match over title, description and category. An empty (or
/// all-whitespace) query returns a copy of the full view.
pub fn search(view: &[Transaction], query: &str) -> Vec<Transaction> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return view.to_vec();
    }
    view.iter()
        .filter(|t| {
            t.title().to_lowercase().contains(&needle)
                || t.description()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
                || t.category().to_string().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Exact category match; [`CategoryFilter::All`] bypasses filtering.
pub fn filter_by_category(view: &[Transaction], filter: CategoryFilter) -> Vec<Transaction> {
    match filter {
        CategoryFilter::All => view.to_vec(),
        CategoryFilter::Only(category) => view
            .iter()
            .filter(|t| t.category() == category)
            .cloned()
            .collect(),
    }
}

/// Sorts a copy of `view` by `key` in the given `order`. Dates compare as calendar dates,
/// amounts numerically, titles and categories case-insensitively. Ties break by id ascending
/// in both orders, so equal inputs always produce equal outputs.
pub fn sort(view: &[Transaction], key: SortKey, order: SortOrder) -> Vec<Transaction> {
    let mut sorted = view.to_vec();
    sorted.sort_by(|a, b| {
        let primary = match key {
            SortKey::Date => a.date().cmp(&b.date()),
            SortKey::Amount => a.amount().cmp(&b.amount()),
            SortKey::Title => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
            SortKey::Category => a
                .category()
                .to_string()
                .to_lowercase()
                .cmp(&b.category().to_string().to_lowercase()),
        };
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id().cmp(b.id()))
    });
    sorted
}

/// Returns page `page` (1-indexed) of `view` in slices of `page_size`. A page beyond the end
/// of the view, page zero and a zero page size all yield an empty result, never an error.
pub fn paginate(view: &[Transaction], page_size: usize, page: usize) -> Vec<Transaction> {
    if page_size == 0 || page == 0 {
        return Vec::new();
    }
    let start = match (page - 1).checked_mul(page_size) {
        Some(start) if start < view.len() => start,
        _ => return Vec::new(),
    };
    let end = (start + page_size).min(view.len());
    view[start..end].to_vec()
}

/// Keeps the transactions dated within `[start, end]`, inclusive on both ends, preserving
/// relative order.
pub fn filter_by_date_range(
    view: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Transaction> {
    view.iter()
        .filter(|t| t.date() >= start && t.date() <= end)
        .cloned()
        .collect()
}

/// The `limit` most recent transactions by calendar date, newest first.
pub fn recent(view: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted = sort(view, SortKey::Date, SortOrder::Desc);
    sorted.truncate(limit);
    sorted
}

/// Buckets `view` by category, preserving the relative order of transactions within each
/// bucket. Categories with no transactions are absent from the result.
pub fn group_by_category(view: &[Transaction]) -> BTreeMap<Category, Vec<Transaction>> {
    let mut groups: BTreeMap<Category, Vec<Transaction>> = BTreeMap::new();
    for t in view {
        groups.entry(t.category()).or_default().push(t.clone());
    }
    groups
}

/// Aggregates `view` per calendar month, keyed `"YYYY-MM"`.
pub fn monthly_totals(view: &[Transaction]) -> BTreeMap<String, MonthlyTotal> {
    let mut months: BTreeMap<String, MonthlyTotal> = BTreeMap::new();
    for t in view {
        let bucket = months.entry(month_key(t.date())).or_default();
        bucket.total = bucket.total.plus(t.amount());
        bucket.count += 1;
    }
    months
}

/// Computes the summary aggregate locally, as a fallback and cross-check for the server-side
/// `GET /expenses/summary`. `today` anchors the monthly total.
pub fn compute_summary(view: &[Transaction], today: NaiveDate) -> Summary {
    let mut total = Amount::default();
    let mut by_category: BTreeMap<Category, CategorySummary> = BTreeMap::new();
    let mut monthly = Amount::default();
    let this_month = month_key(today);

    for t in view {
        total = total.plus(t.amount());
        by_category.entry(t.category()).or_default().add(t.amount());
        if month_key(t.date()) == this_month {
            monthly = monthly.plus(t.amount());
        }
    }

    Summary::new(total, view.len() as u64, by_category, monthly)
}

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
