//! The in-memory mirror of the remote store's transactions for the active session.
//!
//! The cache holds at most one entry per transaction id, in fetch/insertion order. It never
//! talks to the network itself; the client applies mutations here only after the remote store
//! has confirmed them. Consumers that want to react to changes register a subscriber and
//! receive a fresh snapshot after every mutation.

use crate::model::Transaction;
use std::fmt;
use std::fmt::{Debug, Formatter};
use tracing::trace;

/// Handle returned by [`TransactionCache::subscribe`], used to unsubscribe on teardown.
pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&[Transaction]) + Send>;

/// An insertion-ordered, id-unique collection of transactions.
#[derive(Default)]
pub struct TransactionCache {
    items: Vec<Transaction>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
}

impl Debug for TransactionCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionCache")
            .field("items", &self.items.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl TransactionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns a copy of the current contents. Never a live view; callers can hold on to it
    /// across later mutations.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.items.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.items.iter().find(|t| t.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Replaces the entire contents in one step. Readers never observe a partial mix of old
    /// and new entries. Should the server ever send duplicate ids, the first occurrence wins.
    pub fn replace_all(&mut self, items: Vec<Transaction>) {
        let mut deduped: Vec<Transaction> = Vec::with_capacity(items.len());
        for item in items {
            if deduped.iter().any(|t| t.id() == item.id()) {
                trace!("Dropping duplicate transaction id '{}'", item.id());
                continue;
            }
            deduped.push(item);
        }
        self.items = deduped;
        self.notify();
    }

    /// Inserts `item` at the front. Idempotent per id: if the id is already present the
    /// existing entry is overwritten in place instead.
    pub fn prepend(&mut self, item: Transaction) {
        match self.items.iter_mut().find(|t| t.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.items.insert(0, item),
        }
        self.notify();
    }

    /// Replaces the entry whose id matches `item`, preserving its position. Returns `false`
    /// without changing anything when the id is no longer present (a stale confirmation for
    /// an entry that was deleted in the meantime).
    pub fn replace(&mut self, item: Transaction) -> bool {
        match self.items.iter_mut().find(|t| t.id() == item.id()) {
            Some(existing) => {
                *existing = item;
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Removes the entry with `id`. Returns `false` when no such entry existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id() != id);
        if self.items.len() == before {
            return false;
        }
        self.notify();
        true
    }

    /// Empties the cache. Used on logout and session change so that no transactions leak
    /// across users.
    pub fn clear(&mut self) {
        self.items.clear();
        self.notify();
    }

    /// Registers `subscriber` to be called with a snapshot after every mutation. The caller
    /// must [`TransactionCache::unsubscribe`] on teardown.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&[Transaction]) + Send + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscriber. Returns `false` when the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.items.clone();
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category, Draft, Kind};
    use chrono::NaiveDate;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    fn txn(id: &str, title: &str) -> Transaction {
        let draft = Draft::new(
            title,
            Amount::from_str("10.00").unwrap(),
            Category::Others,
            None,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            Kind::Expense,
        );
        let stamp = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Transaction::from_draft(id, &draft, stamp)
    }

    #[test]
    fn test_replace_all_swaps_wholesale() {
        let mut cache = TransactionCache::new();
        cache.replace_all(vec![txn("a", "one")]);
        cache.replace_all(vec![txn("b", "two"), txn("c", "three")]);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_replace_all_dedupes_by_id() {
        let mut cache = TransactionCache::new();
        cache.replace_all(vec![txn("a", "first"), txn("a", "second")]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().title(), "first");
    }

    #[test]
    fn test_prepend_puts_new_entry_first() {
        let mut cache = TransactionCache::new();
        cache.replace_all(vec![txn("a", "one")]);
        cache.prepend(txn("b", "two"));
        let snapshot = cache.snapshot();
        assert_eq!(snapshot[0].id(), "b");
        assert_eq!(snapshot[1].id(), "a");
    }

    #[test]
    fn test_prepend_is_idempotent_per_id() {
        let mut cache = TransactionCache::new();
        cache.replace_all(vec![txn("a", "one"), txn("b", "two")]);
        cache.prepend(txn("b", "two again"));
        assert_eq!(cache.len(), 2);
        // Position preserved, contents replaced.
        let snapshot = cache.snapshot();
        assert_eq!(snapshot[1].id(), "b");
        assert_eq!(snapshot[1].title(), "two again");
    }

    #[test]
    fn test_replace_preserves_position() {
        let mut cache = TransactionCache::new();
        cache.replace_all(vec![txn("a", "one"), txn("b", "two"), txn("c", "three")]);
        assert!(cache.replace(txn("b", "updated")));
        let snapshot = cache.snapshot();
        assert_eq!(snapshot[1].id(), "b");
        assert_eq!(snapshot[1].title(), "updated");
    }

    #[test]
    fn test_replace_missing_is_a_no_op() {
        let mut cache = TransactionCache::new();
        cache.replace_all(vec![txn("a", "one")]);
        assert!(!cache.replace(txn("ghost", "gone")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut cache = TransactionCache::new();
        cache.replace_all(vec![txn("a", "one"), txn("b", "two")]);
        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut cache = TransactionCache::new();
        cache.replace_all(vec![txn("a", "one")]);
        let snapshot = cache.snapshot();
        cache.clear();
        assert_eq!(snapshot.len(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_subscribers_see_every_mutation() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_by_subscriber = Arc::clone(&seen);

        let mut cache = TransactionCache::new();
        let subscription = cache.subscribe(move |snapshot| {
            seen_by_subscriber.lock().unwrap().push(snapshot.len());
        });

        cache.replace_all(vec![txn("a", "one"), txn("b", "two")]);
        cache.remove("a");
        cache.clear();
        assert_eq!(*seen.lock().unwrap(), vec![2, 1, 0]);

        assert!(cache.unsubscribe(subscription));
        cache.prepend(txn("c", "three"));
        // No further notifications after unsubscribe.
        assert_eq!(*seen.lock().unwrap(), vec![2, 1, 0]);
        assert!(!cache.unsubscribe(subscription));
    }
}
