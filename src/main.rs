use clap::Parser;
use outlay::args::{Args, AuthSubcommand, Command};
use outlay::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().outlay_home().path();

    // This allows for exercising the program without a backend server. When
    // OUTLAY_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Memory,
    // otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_url()).await?.print(),

        Command::Auth(auth_args) => {
            let config = Config::load(home).await?;
            match auth_args.action() {
                AuthSubcommand::Login(login_args) => {
                    commands::login(config, mode, login_args).await?.print()
                }
                AuthSubcommand::Register(register_args) => {
                    commands::register(config, mode, register_args).await?.print()
                }
                AuthSubcommand::Logout => commands::logout(config, mode).await?.print(),
                AuthSubcommand::Status => commands::status(config, mode).await?.print(),
            }
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(config, mode, list_args).await?.print()
        }

        Command::Show(show_args) => {
            let config = Config::load(home).await?;
            commands::show(config, mode, show_args).await?.print()
        }

        Command::Insert(insert_args) => {
            let config = Config::load(home).await?;
            commands::insert(config, mode, insert_args).await?.print()
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            commands::update(config, mode, update_args).await?.print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, mode, delete_args).await?.print()
        }

        Command::Summary(summary_args) => {
            let config = Config::load(home).await?;
            commands::summary(config, mode, summary_args).await?.print()
        }

        Command::Monthly(_monthly_args) => {
            let config = Config::load(home).await?;
            commands::monthly(config, mode).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
