//! The core transaction types: what the remote store returns, and what the client sends.

use crate::error::FieldErrors;
use crate::model::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The maximum length of a transaction title, in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// The maximum length of a transaction description, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// The fixed set of categories understood by the remote store. The wire representation is the
/// display name, e.g. `"Food & Dining"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    Transportation,
    Shopping,
    Entertainment,
    Healthcare,
    Education,
    Utilities,
    Travel,
    Others,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 9] = [
        Category::FoodAndDining,
        Category::Transportation,
        Category::Shopping,
        Category::Entertainment,
        Category::Healthcare,
        Category::Education,
        Category::Utilities,
        Category::Travel,
        Category::Others,
    ];
}

/// Whether a transaction takes money out (`expense`) or brings money in (`income`). The
/// amount itself is always stored positive; this discriminant carries the direction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[default]
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(Kind);

/// A category filter with an `all` sentinel that bypasses filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(category) => write!(f, "{category}"),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = serde_plain::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>().map(CategoryFilter::Only)
    }
}

/// A single income or expense record as returned by the remote store.
///
/// The `id` and the timestamps are assigned by the store and never change on the client. All
/// fields are read through accessors; local mutation happens only by replacing whole records
/// with what the store confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: String,
    title: String,
    amount: Amount,
    category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<NaiveDateTime>,
}

impl Transaction {
    /// Materializes a stored transaction from a draft. This is what the remote store does on
    /// create; the in-memory store and tests use it to play that role.
    pub fn from_draft(id: impl Into<String>, draft: &Draft, stamp: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            title: draft.title.clone(),
            amount: draft.amount,
            category: draft.category,
            description: draft.description.clone(),
            date: draft.date,
            kind: draft.kind,
            created_at: Some(stamp),
            updated_at: Some(stamp),
        }
    }

    /// Overwrites the mutable fields from a draft, preserving `id` and `created_at`.
    pub fn apply_draft(&mut self, draft: &Draft, stamp: NaiveDateTime) {
        self.title = draft.title.clone();
        self.amount = draft.amount;
        self.category = draft.category;
        self.description = draft.description.clone();
        self.date = draft.date;
        self.kind = draft.kind;
        self.updated_at = Some(stamp);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<NaiveDateTime> {
        self.updated_at
    }
}

/// The client-side payload for creating or updating a transaction. The remote store assigns
/// `id`, `createdAt` and `updatedAt`.
///
/// `category`, `date` and `kind` cannot be absent by construction; [`Draft::validate`] covers
/// the constraints the type system cannot express.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    title: String,
    amount: Amount,
    category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: Kind,
}

impl Draft {
    pub fn new(
        title: impl Into<String>,
        amount: Amount,
        category: Category,
        description: Option<String>,
        date: NaiveDate,
        kind: Kind,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            category,
            description,
            date,
            kind,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Checks the constraints the remote store enforces, without contacting it. Returns a map
    /// from field name to message so callers can attach messages to the offending field.
    pub fn validate(&self) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.title.trim().is_empty() {
            errors.insert("title".to_string(), "Title is required".to_string());
        } else if self.title.chars().count() > TITLE_MAX_CHARS {
            errors.insert(
                "title".to_string(),
                format!("Title must not exceed {TITLE_MAX_CHARS} characters"),
            );
        }

        if self.amount.value() <= rust_decimal::Decimal::ZERO {
            errors.insert(
                "amount".to_string(),
                "Amount must be greater than 0".to_string(),
            );
        } else if !self.amount.in_bounds() {
            errors.insert(
                "amount".to_string(),
                format!("Amount must not exceed {}", crate::model::MAX_AMOUNT),
            );
        }

        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_CHARS {
                errors.insert(
                    "description".to_string(),
                    format!("Description must not exceed {DESCRIPTION_MAX_CHARS} characters"),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn draft(title: &str, amount: &str) -> Draft {
        Draft::new(
            title,
            Amount::from_str(amount).unwrap(),
            Category::FoodAndDining,
            None,
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            Kind::Expense,
        )
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(Category::FoodAndDining.to_string(), "Food & Dining");
        assert_eq!(Category::Others.to_string(), "Others");
        assert_eq!(
            "Food & Dining".parse::<Category>().unwrap(),
            Category::FoodAndDining
        );
        assert!("Groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_filter_sentinel() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Travel".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Travel)
        );
    }

    #[test]
    fn test_transaction_json_round_trip() {
        let json = r#"{
            "id": "tx42",
            "title": "Groceries run",
            "amount": 87.43,
            "category": "Food & Dining",
            "description": "weekly shop",
            "date": "2025-03-14",
            "type": "expense",
            "createdAt": "2025-03-14T09:15:30",
            "updatedAt": "2025-03-15T10:00:00"
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.id(), "tx42");
        assert_eq!(txn.category(), Category::FoodAndDining);
        assert_eq!(txn.kind(), Kind::Expense);
        assert_eq!(txn.amount(), Amount::from_str("87.43").unwrap());

        let back = serde_json::to_value(&txn).unwrap();
        assert_eq!(back["type"], "expense");
        assert_eq!(back["category"], "Food & Dining");
        assert_eq!(back["date"], "2025-03-14");
    }

    #[test]
    fn test_validate_ok() {
        assert!(draft("Lunch", "12.50").validate().is_ok());
    }

    #[test]
    fn test_validate_empty_title() {
        let errors = draft("   ", "12.50").validate().unwrap_err();
        assert_eq!(errors.get("title").unwrap(), "Title is required");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_long_title() {
        let long = "x".repeat(101);
        let errors = draft(&long, "12.50").validate().unwrap_err();
        assert!(errors.get("title").unwrap().contains("100"));
    }

    #[test]
    fn test_validate_amount_bounds() {
        let errors = draft("Lunch", "0").validate().unwrap_err();
        assert_eq!(errors.get("amount").unwrap(), "Amount must be greater than 0");

        let errors = draft("Lunch", "1000000.00").validate().unwrap_err();
        assert!(errors.get("amount").unwrap().contains("999999.99"));

        assert!(draft("Lunch", "999999.99").validate().is_ok());
    }

    #[test]
    fn test_validate_long_description() {
        let mut d = draft("Lunch", "12.50");
        d.description = Some("y".repeat(501));
        let errors = d.validate().unwrap_err();
        assert!(errors.get("description").unwrap().contains("500"));
    }

    #[test]
    fn test_validate_collects_multiple_fields() {
        let mut d = draft("", "0");
        d.description = Some("y".repeat(501));
        let errors = d.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_apply_draft_preserves_identity() {
        let stamp = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut txn = Transaction::from_draft("tx1", &draft("Lunch", "12.50"), stamp);
        let later = stamp + chrono::Duration::hours(2);
        txn.apply_draft(&draft("Dinner", "30.00"), later);
        assert_eq!(txn.id(), "tx1");
        assert_eq!(txn.created_at(), Some(stamp));
        assert_eq!(txn.updated_at(), Some(later));
        assert_eq!(txn.title(), "Dinner");
    }
}
