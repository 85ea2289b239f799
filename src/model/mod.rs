//! The data model shared by the cache, the derivation engine and the remote store client.

mod amount;
mod summary;
mod transaction;

pub use amount::{Amount, MAX_AMOUNT, MIN_AMOUNT};
pub use summary::{CategorySummary, Summary};
pub use transaction::{
    Category, CategoryFilter, Draft, Kind, Transaction, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS,
};
