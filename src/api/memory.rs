//! Implements the `Store` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the
//! whole app, top-to-bottom, without a backend server. A demo account exists with a seeded
//! set of transactions; freshly registered accounts start empty.

use crate::api::{AuthResponse, Credentials, NewAccount, Store};
use crate::error::{ApiError, ApiResult};
use crate::model::{Amount, Category, Draft, Kind, Summary, Transaction};
use crate::query;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;

/// The username of the compiled-in demo account.
pub(crate) const DEMO_USERNAME: &str = "demo";

/// The password of the compiled-in demo account.
pub(crate) const DEMO_PASSWORD: &str = "outlay-demo";

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_ACCOUNT_ID: i64 = 1;

#[derive(Debug, Clone)]
struct Account {
    id: i64,
    username: String,
    email: String,
    password: String,
}

/// An implementation of the `Store` trait that holds everything in memory. It issues opaque
/// tokens at login and checks them on every data operation, mirroring the behavior the HTTP
/// backend exhibits.
pub(crate) struct MemoryStore {
    accounts: Vec<Account>,
    tokens: HashMap<String, i64>,
    transactions: HashMap<i64, Vec<Transaction>>,
    next_account_id: i64,
}

impl Default for MemoryStore {
    /// Seeds the demo account and its transactions.
    fn default() -> Self {
        let mut transactions = HashMap::new();
        transactions.insert(DEMO_ACCOUNT_ID, seed_transactions());
        Self {
            accounts: vec![Account {
                id: DEMO_ACCOUNT_ID,
                username: DEMO_USERNAME.to_string(),
                email: DEMO_EMAIL.to_string(),
                password: DEMO_PASSWORD.to_string(),
            }],
            tokens: HashMap::new(),
            transactions,
            next_account_id: DEMO_ACCOUNT_ID + 1,
        }
    }
}

impl MemoryStore {
    fn authorize(&self, token: &str) -> ApiResult<i64> {
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| ApiError::Auth("Invalid or expired token".to_string()))
    }

    fn entries(&mut self, account_id: i64) -> &mut Vec<Transaction> {
        self.transactions.entry(account_id).or_default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn list(&mut self, token: &str) -> ApiResult<Vec<Transaction>> {
        let account_id = self.authorize(token)?;
        Ok(self.entries(account_id).clone())
    }

    async fn get(&mut self, token: &str, id: &str) -> ApiResult<Transaction> {
        let account_id = self.authorize(token)?;
        self.entries(account_id)
            .iter()
            .find(|t| t.id() == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Expense not found with id: {id}")))
    }

    async fn create(&mut self, token: &str, draft: &Draft) -> ApiResult<Transaction> {
        let account_id = self.authorize(token)?;
        let id = uuid::Uuid::new_v4().to_string();
        let created = Transaction::from_draft(id, draft, Utc::now().naive_utc());
        // Newest first, the order the HTTP backend serves.
        self.entries(account_id).insert(0, created.clone());
        Ok(created)
    }

    async fn update(&mut self, token: &str, id: &str, draft: &Draft) -> ApiResult<Transaction> {
        let account_id = self.authorize(token)?;
        let stamp = Utc::now().naive_utc();
        let entry = self
            .entries(account_id)
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| ApiError::NotFound(format!("Expense not found with id: {id}")))?;
        entry.apply_draft(draft, stamp);
        Ok(entry.clone())
    }

    async fn delete(&mut self, token: &str, id: &str) -> ApiResult<()> {
        let account_id = self.authorize(token)?;
        let entries = self.entries(account_id);
        let before = entries.len();
        entries.retain(|t| t.id() != id);
        if entries.len() == before {
            return Err(ApiError::NotFound(format!("Expense not found with id: {id}")));
        }
        Ok(())
    }

    async fn summary(&mut self, token: &str) -> ApiResult<Summary> {
        let account_id = self.authorize(token)?;
        let entries = self.entries(account_id).clone();
        Ok(query::compute_summary(&entries, Utc::now().date_naive()))
    }

    async fn login(&mut self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.username == credentials.username() && a.password == credentials.password())
            .cloned()
            .ok_or_else(|| ApiError::Auth("Invalid credentials".to_string()))?;
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), account.id);
        Ok(AuthResponse::new(
            token,
            account.id,
            account.username,
            account.email,
        ))
    }

    async fn register(&mut self, account: &NewAccount) -> ApiResult<String> {
        if self.accounts.iter().any(|a| a.username == account.username()) {
            return Err(ApiError::server(400, "Error: Username is already taken!"));
        }
        if self.accounts.iter().any(|a| a.email == account.email()) {
            return Err(ApiError::server(400, "Error: Email is already in use!"));
        }
        let id = self.next_account_id;
        self.next_account_id += 1;
        self.accounts.push(Account {
            id,
            username: account.username().to_string(),
            email: account.email().to_string(),
            password: account.password().to_string(),
        });
        Ok("User registered successfully!".to_string())
    }
}

/// Parses the seed CSV into transactions.
fn seed_transactions() -> Vec<Transaction> {
    load_csv(SEED_TRANSACTIONS).unwrap()
}

/// Loads transactions from a CSV-formatted string with the columns
/// `id,date,title,category,amount,type,description`.
fn load_csv(csv_data: &str) -> crate::Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut transactions = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let id = &record[0];
        let date = NaiveDate::from_str(&record[1])?;
        let title = &record[2];
        let category = Category::from_str(&record[3])?;
        let amount = Amount::from_str(&record[4])?;
        let kind = match &record[5] {
            "income" => Kind::Income,
            _ => Kind::Expense,
        };
        let description = match record.get(6) {
            Some("") | None => None,
            Some(d) => Some(d.to_string()),
        };
        let draft = Draft::new(title, amount, category, description, date, kind);
        let stamp = date
            .and_hms_opt(12, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("invalid seed timestamp"))?;
        transactions.push(Transaction::from_draft(id, &draft, stamp));
    }
    Ok(transactions)
}

/// Seed transaction data for the demo account.
const SEED_TRANSACTIONS: &str = r##"id,date,title,category,amount,type,description
tx001,2025-07-28,Weekly grocery run,Food & Dining,87.43,expense,Supermarket haul
tx002,2025-07-27,Morning espresso,Food & Dining,4.75,expense,
tx003,2025-07-26,Monthly metro card,Transportation,52.30,expense,
tx004,2025-07-24,New running shoes,Shopping,89.99,expense,Replacing worn pair
tx005,2025-07-22,Movie tickets,Entertainment,28.50,expense,Two seats
tx006,2025-07-21,Pharmacy refill,Healthcare,14.20,expense,
tx007,2025-07-18,Online course,Education,49.00,expense,Statistics refresher
tx008,2025-07-15,Electricity bill,Utilities,96.67,expense,
tx009,2025-07-12,Weekend train fare,Travel,36.80,expense,Coast trip
tx010,2025-07-10,Freelance payout,Others,450.00,income,Invoice 2025-031
tx011,2025-07-07,Internet bill,Utilities,59.99,expense,
tx012,2025-07-03,Team lunch,Food & Dining,23.10,expense,Split the bill
"##;

#[cfg(test)]
mod tests {
    use super::*;

    async fn logged_in(store: &mut MemoryStore) -> String {
        let credentials = Credentials::new(DEMO_USERNAME, DEMO_PASSWORD);
        store.login(&credentials).await.unwrap().token().to_string()
    }

    fn draft(title: &str, amount: &str) -> Draft {
        Draft::new(
            title,
            Amount::from_str(amount).unwrap(),
            Category::Shopping,
            None,
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            Kind::Expense,
        )
    }

    #[test]
    fn test_seed_data_parses() {
        let seeded = seed_transactions();
        assert_eq!(seeded.len(), 12);
        assert_eq!(seeded[0].id(), "tx001");
        assert_eq!(seeded[0].category(), Category::FoodAndDining);
        assert_eq!(seeded[9].kind(), Kind::Income);
        assert_eq!(seeded[1].description(), None);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let mut store = MemoryStore::default();
        let result = store
            .login(&Credentials::new(DEMO_USERNAME, "wrong"))
            .await;
        assert!(matches!(result, Err(ApiError::Auth(_))));
    }

    #[tokio::test]
    async fn test_data_operations_require_a_valid_token() {
        let mut store = MemoryStore::default();
        let result = store.list("bogus-token").await;
        assert!(matches!(result, Err(ApiError::Auth(_))));
    }

    #[tokio::test]
    async fn test_crud_flow() {
        let mut store = MemoryStore::default();
        let token = logged_in(&mut store).await;

        let before = store.list(&token).await.unwrap().len();
        let created = store.create(&token, &draft("Desk lamp", "34.00")).await.unwrap();
        assert!(!created.id().is_empty());
        assert!(created.created_at().is_some());

        let listed = store.list(&token).await.unwrap();
        assert_eq!(listed.len(), before + 1);
        // Created entries come back first.
        assert_eq!(listed[0].id(), created.id());

        let updated = store
            .update(&token, created.id(), &draft("Desk lamp XL", "44.00"))
            .await
            .unwrap();
        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.title(), "Desk lamp XL");
        assert_eq!(updated.created_at(), created.created_at());

        store.delete(&token, created.id()).await.unwrap();
        let result = store.get(&token, created.id()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_not_found() {
        let mut store = MemoryStore::default();
        let token = logged_in(&mut store).await;
        let result = store.delete(&token, "no-such-id").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_summary_agrees_with_list() {
        let mut store = MemoryStore::default();
        let token = logged_in(&mut store).await;
        let listed = store.list(&token).await.unwrap();
        let summary = store.summary(&token).await.unwrap();
        assert_eq!(summary.total_count() as usize, listed.len());
    }

    #[tokio::test]
    async fn test_register_then_login_with_empty_ledger() {
        let mut store = MemoryStore::default();
        let confirmation = store
            .register(&NewAccount::new("ada", "ada@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(confirmation, "User registered successfully!");

        let auth = store
            .login(&Credentials::new("ada", "hunter22"))
            .await
            .unwrap();
        let listed = store.list(auth.token()).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let mut store = MemoryStore::default();
        let result = store
            .register(&NewAccount::new(DEMO_USERNAME, "other@example.com", "pw"))
            .await;
        match result {
            Err(ApiError::Server { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("Username is already taken"));
            }
            other => panic!("expected a server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_accounts_do_not_share_transactions() {
        let mut store = MemoryStore::default();
        store
            .register(&NewAccount::new("ada", "ada@example.com", "hunter22"))
            .await
            .unwrap();
        let demo_token = logged_in(&mut store).await;
        let ada_token = store
            .login(&Credentials::new("ada", "hunter22"))
            .await
            .unwrap()
            .token()
            .to_string();

        store.create(&ada_token, &draft("Private", "9.99")).await.unwrap();
        let demo_titles: Vec<String> = store
            .list(&demo_token)
            .await
            .unwrap()
            .iter()
            .map(|t| t.title().to_string())
            .collect();
        assert!(!demo_titles.contains(&"Private".to_string()));
    }
}
