//! The `outlay summary` and `outlay monthly` commands.

use crate::api::Mode;
use crate::args::SummaryArgs;
use crate::commands::{connect, Out};
use crate::model::Summary;
use crate::query::MonthlyTotal;
use crate::{query, Config, Result};
use anyhow::Context;
use chrono::Utc;
use format_num::NumberFormat;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;

/// Shows the summary aggregate. By default this is the server's figure; with `--local` the
/// summary is recomputed from the transaction list and cross-checked against the server.
pub async fn summary(config: Config, mode: Mode, args: &SummaryArgs) -> Result<Out<Summary>> {
    let mut client = connect(&config, mode)?;

    if !args.local() {
        client.load_summary().await?;
        let remote = client
            .summary()
            .cloned()
            .context("the summary was just loaded")?;
        return Ok(Out::new(render_summary(&remote), remote));
    }

    client.load().await?;
    let local = query::compute_summary(&client.transactions(), Utc::now().date_naive());
    let mut message = render_summary(&local);
    match client.load_summary().await {
        Ok(()) => {
            let remote = client
                .summary()
                .cloned()
                .context("the summary was just loaded")?;
            if remote.total_count() == local.total_count() {
                message.push_str("\nThe server aggregate agrees with the local computation.");
            } else {
                // A mutation from another session can race the two fetches.
                message.push_str(&format!(
                    "\nThe server counts {} transaction(s) while the local computation sees {}; \
                    refresh to reconcile.",
                    remote.total_count(),
                    local.total_count()
                ));
            }
        }
        Err(e) => {
            message.push_str(&format!("\nThe server aggregate was not reachable: {e}"));
        }
    }
    Ok(Out::new(message, local))
}

/// Shows per-month totals derived from the transaction list.
pub async fn monthly(config: Config, mode: Mode) -> Result<Out<BTreeMap<String, MonthlyTotal>>> {
    let mut client = connect(&config, mode)?;
    client.load().await?;
    let months = query::monthly_totals(&client.transactions());
    if months.is_empty() {
        return Ok(Out::new("No transactions yet.".to_string(), months));
    }

    let num = NumberFormat::new();
    let mut lines = vec![format!("{:<8}  {:>12}  {:>6}", "MONTH", "TOTAL", "COUNT")];
    for (month, bucket) in &months {
        lines.push(format!(
            "{:<8}  {:>12}  {:>6}",
            month,
            num.format(",.2f", bucket.total().value().to_f64().unwrap_or_default()),
            bucket.count()
        ));
    }
    Ok(Out::new(lines.join("\n"), months))
}

fn render_summary(summary: &Summary) -> String {
    let num = NumberFormat::new();
    let mut lines = vec![
        format!(
            "Total: {} across {} transaction(s)",
            num.format(",.2f", summary.total_expenses().value().to_f64().unwrap_or_default()),
            summary.total_count()
        ),
        format!(
            "This month: {}",
            num.format(",.2f", summary.monthly_total().value().to_f64().unwrap_or_default())
        ),
    ];
    if !summary.category_summary().is_empty() {
        lines.push("By category:".to_string());
        for (category, bucket) in summary.category_summary() {
            lines.push(format!(
                "  {:<16}  {:>12}  ({})",
                category.to_string(),
                num.format(",.2f", bucket.total().value().to_f64().unwrap_or_default()),
                bucket.count()
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category, CategorySummary};
    use std::str::FromStr;

    #[test]
    fn test_render_summary() {
        let mut by_category = BTreeMap::new();
        by_category.insert(
            Category::FoodAndDining,
            CategorySummary::new(Amount::from_str("1250.50").unwrap(), 3),
        );
        let summary = Summary::new(
            Amount::from_str("1300.00").unwrap(),
            4,
            by_category,
            Amount::from_str("49.50").unwrap(),
        );
        let rendered = render_summary(&summary);
        assert!(rendered.contains("1,300.00 across 4 transaction(s)"));
        assert!(rendered.contains("This month: 49.50"));
        assert!(rendered.contains("Food & Dining"));
        assert!(rendered.contains("1,250.50"));
    }
}
