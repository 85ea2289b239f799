//! Authentication command handlers.
//!
//! This module implements the CLI commands for:
//! - `outlay auth login` - Authenticate and persist the session
//! - `outlay auth register` - Create an account
//! - `outlay auth logout` - End the session
//! - `outlay auth status` - Show the session state

use crate::api::{Credentials, Mode, NewAccount};
use crate::args::{LoginArgs, RegisterArgs};
use crate::client::Registration;
use crate::commands::Out;
use crate::session::User;
use crate::{api, Client, Config, Result};
use anyhow::Context;

/// Handles the `outlay auth login` command. Prompts for the password when it was not passed
/// as a flag, then authenticates and persists the session for later commands.
pub async fn login(config: Config, mode: Mode, args: &LoginArgs) -> Result<Out<User>> {
    let password = obtain_secret(args.password(), "Password: ")?;
    let store = api::store(&config, mode)?;
    let mut client = Client::new(store, config.session_store());
    let user = client
        .login(&Credentials::new(args.username(), password))
        .await?;
    Ok(Out::new(
        format!("Logged in as '{}' <{}>", user.username(), user.email()),
        user,
    ))
}

/// Handles the `outlay auth register` command. Whether the new account is also logged in is
/// controlled by `auto_login_after_register` in the configuration; check the message (or the
/// structured [`Registration`]) rather than assuming a session exists afterwards.
pub async fn register(config: Config, mode: Mode, args: &RegisterArgs) -> Result<Out<Registration>> {
    let password = obtain_secret(args.password(), "Choose a password: ")?;
    let auto_login = config.auto_login_after_register();
    let store = api::store(&config, mode)?;
    let mut client = Client::new(store, config.session_store());
    let registration = client
        .register(
            &NewAccount::new(args.username(), args.email(), password),
            auto_login,
        )
        .await?;
    let message = if registration.logged_in() {
        format!(
            "{} You are now logged in as '{}'.",
            registration.confirmation(),
            args.username()
        )
    } else {
        format!(
            "{} Run 'outlay auth login' to start a session.",
            registration.confirmation()
        )
    };
    Ok(Out::new(message, registration))
}

/// Handles the `outlay auth logout` command. Best effort: clears whatever session state is
/// present and succeeds either way.
pub async fn logout(config: Config, mode: Mode) -> Result<Out<()>> {
    let store = api::store(&config, mode)?;
    let mut client = Client::new(store, config.session_store());
    let had_session = client.restore();
    client.logout();
    let message = if had_session {
        "Logged out."
    } else {
        "No session was present; nothing to clear."
    };
    Ok(Out::new_message(message))
}

/// Handles the `outlay auth status` command.
pub async fn status(config: Config, mode: Mode) -> Result<Out<User>> {
    let store = api::store(&config, mode)?;
    let mut client = Client::new(store, config.session_store());
    if client.restore() {
        let user = client
            .session()
            .map(|s| s.user().clone())
            .context("a restored session must have a user")?;
        Ok(Out::new(
            format!("Logged in as '{}' <{}>", user.username(), user.email()),
            user,
        ))
    } else {
        Ok(Out::new_message("Not logged in."))
    }
}

/// Uses the provided secret, or prompts for one without echoing it.
fn obtain_secret(provided: Option<&str>, prompt: &str) -> Result<String> {
    match provided {
        Some(secret) => Ok(secret.to_string()),
        None => rpassword::prompt_password(prompt)
            .context("Unable to read the password from the terminal"),
    }
}
