//! Aggregate statistics over transactions.
//!
//! The remote store computes these server-side (`GET /expenses/summary`); the derivation
//! engine can also recompute them locally from the cache as a cross-check. The two may
//! disagree briefly while a mutation is in flight.

use crate::model::{Amount, Category};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Totals for a single category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategorySummary {
    total: Amount,
    count: u64,
}

impl CategorySummary {
    pub fn new(total: Amount, count: u64) -> Self {
        Self { total, count }
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Folds one more amount into the bucket.
    pub(crate) fn add(&mut self, amount: Amount) {
        self.total = self.total.plus(amount);
        self.count += 1;
    }
}

/// The aggregate the remote store serves for the current account.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    total_expenses: Amount,
    total_count: u64,
    #[serde(default)]
    category_summary: BTreeMap<Category, CategorySummary>,
    monthly_total: Amount,
}

impl Summary {
    pub fn new(
        total_expenses: Amount,
        total_count: u64,
        category_summary: BTreeMap<Category, CategorySummary>,
        monthly_total: Amount,
    ) -> Self {
        Self {
            total_expenses,
            total_count,
            category_summary,
            monthly_total,
        }
    }

    pub fn total_expenses(&self) -> Amount {
        self.total_expenses
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn category_summary(&self) -> &BTreeMap<Category, CategorySummary> {
        &self.category_summary
    }

    pub fn monthly_total(&self) -> Amount {
        self.monthly_total
    }
}
