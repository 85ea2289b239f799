//! The remote transaction store: the trait the client talks to, and its implementations.

mod http;
mod memory;

use crate::error::ApiResult;
use crate::model::{Draft, Summary, Transaction};
use crate::session::{Session, User};
use crate::Config;
use crate::Result;
use serde::{Deserialize, Serialize};

pub(crate) use memory::MemoryStore;

/// Set this environment variable (non-empty) to run against an in-memory store instead of the
/// HTTP API. This allows exercising the whole program, top-to-bottom, without a backend.
const IN_TEST_MODE: &str = "OUTLAY_IN_TEST_MODE";

/// Credentials sent to `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    username: String,
    email: String,
    password: String,
}

impl NewAccount {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Body of a successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    token: String,
    id: i64,
    username: String,
    email: String,
}

impl AuthResponse {
    pub fn new(
        token: impl Into<String>,
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Converts the wire response into a session.
    pub fn into_session(self) -> Session {
        let user = User::new(self.id, self.username, self.email);
        Session::new(user, self.token)
    }
}

/// The operations the remote transaction store exposes. All token-bearing operations send the
/// session's bearer credential; `login` and `register` are anonymous.
///
/// Implementations map failures into the [`crate::ApiError`] taxonomy and never panic on
/// remote misbehavior.
#[async_trait::async_trait]
pub trait Store {
    async fn list(&mut self, token: &str) -> ApiResult<Vec<Transaction>>;

    async fn get(&mut self, token: &str, id: &str) -> ApiResult<Transaction>;

    async fn create(&mut self, token: &str, draft: &Draft) -> ApiResult<Transaction>;

    async fn update(&mut self, token: &str, id: &str, draft: &Draft) -> ApiResult<Transaction>;

    async fn delete(&mut self, token: &str, id: &str) -> ApiResult<()>;

    async fn summary(&mut self, token: &str) -> ApiResult<Summary>;

    async fn login(&mut self, credentials: &Credentials) -> ApiResult<AuthResponse>;

    /// Creates an account. Returns the store's confirmation message; whether the caller also
    /// logs the new account in is a policy decision made above this layer.
    async fn register(&mut self, account: &NewAccount) -> ApiResult<String>;
}

/// Selects the backing implementation of the remote store.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum Mode {
    /// Talk to the configured HTTP API.
    #[default]
    Http,
    /// Use the compiled-in, in-memory store.
    Memory,
}

impl Mode {
    /// When `OUTLAY_IN_TEST_MODE` is set and non-zero in length the mode will be
    /// `Mode::Memory`, otherwise it will be `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(IN_TEST_MODE) {
            Ok(value) if !value.is_empty() => Mode::Memory,
            _ => Mode::Http,
        }
    }
}

/// Creates the remote store for the given `mode`.
pub fn store(config: &Config, mode: Mode) -> Result<Box<dyn Store + Send>> {
    match mode {
        Mode::Http => Ok(Box::new(http::HttpStore::new(
            config.api_url(),
            config.timeout(),
        )?)),
        Mode::Memory => Ok(Box::new(MemoryStore::default())),
    }
}
