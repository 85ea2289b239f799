//! The client: session orchestration plus the mutation coordinator.
//!
//! `Client` owns the remote store handle, the session and the transaction cache; nothing else
//! mutates them. Cache changes are applied strictly after the corresponding remote call has
//! confirmed, so the cache never runs ahead of the remote store. It may lag behind other
//! sessions until the next `load`.

use crate::api::{Credentials, NewAccount, Store};
use crate::cache::{SubscriptionId, TransactionCache};
use crate::error::{ApiError, ApiResult};
use crate::model::{Draft, Summary, Transaction};
use crate::session::{Session, SessionStore, User};
use tracing::{debug, info, warn};

/// The outcome of `register`: the store's confirmation, and whether a session was also
/// established (controlled by the `auto_login_after_register` configuration policy).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Registration {
    confirmation: String,
    logged_in: bool,
}

impl Registration {
    pub fn confirmation(&self) -> &str {
        &self.confirmation
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }
}

/// Coordinates every interaction between the local state and the remote store.
pub struct Client {
    store: Box<dyn Store + Send>,
    sessions: SessionStore,
    session: Option<Session>,
    cache: TransactionCache,
    summary: Option<Summary>,
}

impl Client {
    /// Creates a client with no active session. Call [`Client::restore`] or
    /// [`Client::login`] before data operations.
    pub fn new(store: Box<dyn Store + Send>, sessions: SessionStore) -> Self {
        Self {
            store,
            sessions,
            session: None,
            cache: TransactionCache::new(),
            summary: None,
        }
    }

    /// Attempts to restore a persisted session. Returns whether one was found; absence is a
    /// normal outcome.
    pub fn restore(&mut self) -> bool {
        self.session = self.sessions.restore();
        match &self.session {
            Some(session) => {
                debug!("Restored session for '{}'", session.user().username());
                true
            }
            None => false,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// A copy of the current cache contents, in fetch/insertion order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.cache.snapshot()
    }

    /// The most recently fetched remote summary, if any.
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Registers a cache subscriber; see [`TransactionCache::subscribe`].
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&[Transaction]) + Send + 'static,
    ) -> SubscriptionId {
        self.cache.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.cache.unsubscribe(id)
    }

    /// Authenticates against the remote store and persists the session on success.
    pub async fn login(&mut self, credentials: &Credentials) -> ApiResult<User> {
        // A fresh login always starts from a clean slate.
        self.teardown();
        let response = self.store.login(credentials).await?;
        let session = response.into_session();
        self.sessions.save(&session);
        let user = session.user().clone();
        info!("Logged in as '{}'", user.username());
        self.session = Some(session);
        Ok(user)
    }

    /// Creates an account. When `auto_login` is set, also logs the new account in; callers
    /// must check [`Registration::logged_in`] rather than assume a session exists.
    pub async fn register(
        &mut self,
        account: &NewAccount,
        auto_login: bool,
    ) -> ApiResult<Registration> {
        let confirmation = self.store.register(account).await?;
        info!("Registered account '{}'", account.username());
        if !auto_login {
            return Ok(Registration {
                confirmation,
                logged_in: false,
            });
        }
        let credentials = Credentials::new(account.username(), account.password());
        self.login(&credentials).await?;
        Ok(Registration {
            confirmation,
            logged_in: true,
        })
    }

    /// Ends the session: persisted credential and identity, the cache and the cached summary
    /// are all cleared. Best effort; always succeeds.
    pub fn logout(&mut self) {
        if let Some(session) = &self.session {
            info!("Logging out '{}'", session.user().username());
        }
        self.teardown();
    }

    /// Fetches the full transaction set, replacing the cache wholesale on success. On any
    /// failure the cache is left exactly as it was.
    pub async fn load(&mut self) -> ApiResult<usize> {
        let token = self.token()?;
        let result = self.store.list(&token).await;
        let items = self.check_auth(result)?;
        let count = items.len();
        self.cache.replace_all(items);
        debug!("Loaded {count} transactions");
        Ok(count)
    }

    /// Fetches the remote summary aggregate. Independent of [`Client::load`]; the two may be
    /// transiently inconsistent while mutations are in flight.
    pub async fn load_summary(&mut self) -> ApiResult<()> {
        let token = self.token()?;
        let result = self.store.summary(&token).await;
        let summary = self.check_auth(result)?;
        self.summary = Some(summary);
        Ok(())
    }

    /// Fetches a single transaction from the remote store. Does not touch the cache.
    pub async fn get(&mut self, id: &str) -> ApiResult<Transaction> {
        let token = self.token()?;
        let result = self.store.get(&token, id).await;
        self.check_auth(result)
    }

    /// Validates locally, then creates the transaction remotely. On success the confirmed
    /// record is prepended to the cache and the summary is refreshed; on failure nothing
    /// changes locally.
    pub async fn create(&mut self, draft: &Draft) -> ApiResult<Transaction> {
        draft.validate().map_err(ApiError::Validation)?;
        let token = self.token()?;
        let result = self.store.create(&token, draft).await;
        let created = self.check_auth(result)?;
        self.cache.prepend(created.clone());
        self.refresh_summary().await;
        Ok(created)
    }

    /// Validates locally, then updates the transaction remotely. The confirmed record
    /// replaces the cached entry in place, preserving its position. A confirmation arriving
    /// for an entry that is no longer cached is dropped.
    pub async fn update(&mut self, id: &str, draft: &Draft) -> ApiResult<Transaction> {
        draft.validate().map_err(ApiError::Validation)?;
        let token = self.token()?;
        let result = self.store.update(&token, id, draft).await;
        let updated = self.check_auth(result)?;
        if !self.cache.replace(updated.clone()) {
            debug!("Update confirmed for '{id}' but it is no longer cached; dropping");
        }
        self.refresh_summary().await;
        Ok(updated)
    }

    /// Deletes the transaction remotely, removing it from the cache only after the remote
    /// store confirms. No optimistic removal: on failure the entry is still present.
    pub async fn delete(&mut self, id: &str) -> ApiResult<()> {
        let token = self.token()?;
        let result = self.store.delete(&token, id).await;
        self.check_auth(result)?;
        self.cache.remove(id);
        self.refresh_summary().await;
        Ok(())
    }

    fn token(&self) -> ApiResult<String> {
        self.session
            .as_ref()
            .map(|s| s.token().to_string())
            .ok_or_else(|| ApiError::Auth("Not logged in".to_string()))
    }

    /// A rejected credential means the session is dead; tear it down so the caller is forced
    /// back through login.
    fn check_auth<T>(&mut self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(e) = &result {
            if e.is_auth() && self.session.is_some() {
                warn!("The remote store rejected the session credential, logging out");
                self.teardown();
            }
        }
        result
    }

    fn teardown(&mut self) {
        self.sessions.clear();
        self.session = None;
        self.cache.clear();
        self.summary = None;
    }

    /// A confirmed mutation is not undone when the follow-up summary fetch fails; the stale
    /// summary is simply kept until the next successful fetch.
    async fn refresh_summary(&mut self) {
        if let Err(e) = self.load_summary().await {
            warn!("Unable to refresh the summary: {e}");
        }
    }
}
