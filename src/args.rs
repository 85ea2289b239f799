//! These structs provide the CLI interface for the outlay CLI.

use crate::model::{Amount, Category, CategoryFilter, Kind};
use crate::query::{SortKey, SortOrder};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// outlay: A command-line client for an expense tracking API.
///
/// The purpose of this program is to manage your income and expense transactions against a
/// remote expense tracker server: log in, add, edit and delete transactions, and view
/// searched, filtered, sorted, paged and aggregated listings of them.
///
/// Run `outlay init` once to choose the server, then `outlay auth login` to start a session.
/// Set OUTLAY_IN_TEST_MODE to a non-empty value to run against a built-in, in-memory store
/// (username "demo", password "outlay-demo") without any server at all.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run when setting up the outlay CLI.
    ///
    /// - Decide what directory you want to store configuration and session state in and pass
    ///   this as --outlay-home. By default, it will be $HOME/outlay.
    ///
    /// - Pass the base URL of your expense tracker server as --api-url.
    Init(InitArgs),
    /// Log in, register an account, end the session, or show who is logged in.
    Auth(AuthArgs),
    /// List transactions with searching, filtering, sorting and paging.
    List(ListArgs),
    /// Create a new transaction.
    Insert(InsertArgs),
    /// Show a single transaction by id.
    Show(ShowArgs),
    /// Update an existing transaction.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// Show aggregate totals, overall and per category.
    Summary(SummaryArgs),
    /// Show per-month totals.
    Monthly(MonthlyArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where outlay configuration and session state is held. Defaults to
    /// ~/outlay
    #[arg(long, env = "OUTLAY_HOME", default_value_t = default_outlay_home())]
    outlay_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, outlay_home: PathBuf) -> Self {
        Self {
            log_level,
            outlay_home: outlay_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn outlay_home(&self) -> &DisplayPath {
        &self.outlay_home
    }
}

/// Args for the `outlay init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the expense tracker API, e.g.
    /// http://localhost:8080/expense_tracker/api
    #[arg(long)]
    api_url: String,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Args for the `outlay auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    #[command(subcommand)]
    action: AuthSubcommand,
}

impl AuthArgs {
    pub fn action(&self) -> &AuthSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthSubcommand {
    /// Authenticate with the remote store and persist the session.
    Login(LoginArgs),
    /// Create a new account.
    Register(RegisterArgs),
    /// End the session and clear persisted credentials.
    Logout,
    /// Show whether a session is present and who it belongs to.
    Status,
}

/// Args for the `outlay auth login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    /// The account username.
    #[arg(long)]
    username: String,

    /// The account password. Prompted for when omitted.
    #[arg(long)]
    password: Option<String>,
}

impl LoginArgs {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// Args for the `outlay auth register` command.
#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    /// The username for the new account.
    #[arg(long)]
    username: String,

    /// The email address for the new account.
    #[arg(long)]
    email: String,

    /// The password for the new account. Prompted for when omitted.
    #[arg(long)]
    password: Option<String>,
}

impl RegisterArgs {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// Args for the `outlay list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// Case-insensitive text to match against title, description and category.
    #[arg(long)]
    search: Option<String>,

    /// Keep only one category, or "all" for everything.
    #[arg(long, default_value_t = CategoryFilter::All)]
    category: CategoryFilter,

    /// The field to sort by.
    #[arg(long, value_enum, default_value_t = SortKey::Date)]
    sort: SortKey,

    /// The sort direction.
    #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
    order: SortOrder,

    /// Keep only transactions on or after this date, e.g. 2025-07-01.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Keep only transactions on or before this date, e.g. 2025-07-31.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// The 1-indexed page to show.
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// How many transactions per page.
    #[arg(long, default_value_t = 6)]
    page_size: usize,
}

impl ListArgs {
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

/// The transaction fields shared by `outlay insert` and `outlay update`.
#[derive(Debug, Parser, Clone)]
pub struct DraftArgs {
    /// A short label for the transaction, at most 100 characters.
    #[arg(long)]
    title: String,

    /// The positive amount, e.g. 12.50 or $1,250.00.
    #[arg(long)]
    amount: Amount,

    /// The transaction category, e.g. "Food & Dining".
    #[arg(long)]
    category: Category,

    /// The calendar date of the transaction, e.g. 2025-08-02.
    #[arg(long)]
    date: NaiveDate,

    /// Optional free text, at most 500 characters.
    #[arg(long)]
    description: Option<String>,

    /// Whether money went out or came in.
    #[arg(long, value_enum, default_value_t = Kind::Expense)]
    kind: Kind,
}

impl DraftArgs {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// Args for the `outlay insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    #[clap(flatten)]
    draft: DraftArgs,
}

impl InsertArgs {
    pub fn draft(&self) -> &DraftArgs {
        &self.draft
    }
}

/// Args for the `outlay update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the transaction to update.
    id: String,

    #[clap(flatten)]
    draft: DraftArgs,
}

impl UpdateArgs {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn draft(&self) -> &DraftArgs {
        &self.draft
    }
}

/// Args for the `outlay show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The id of the transaction to show.
    id: String,
}

impl ShowArgs {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `outlay delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `outlay summary` command.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Recompute the summary locally from the transaction list and cross-check it against the
    /// server's aggregate.
    #[arg(long)]
    local: bool,
}

impl SummaryArgs {
    pub fn local(&self) -> bool {
        self.local
    }
}

/// Args for the `outlay monthly` command.
#[derive(Debug, Parser, Clone)]
pub struct MonthlyArgs {}

fn default_outlay_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("outlay"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --outlay-home or OUTLAY_HOME instead of relying on the default \
                outlay home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("outlay")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
