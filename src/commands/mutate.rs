//! The `outlay insert`, `outlay update` and `outlay delete` commands.

use crate::api::Mode;
use crate::args::{DeleteArgs, DraftArgs, InsertArgs, UpdateArgs};
use crate::commands::{connect, Out};
use crate::model::{Draft, Transaction};
use crate::{Config, Result};

/// Creates a new transaction from the command-line fields. Validation failures are reported
/// per field before anything is sent to the remote store.
pub async fn insert(config: Config, mode: Mode, args: &InsertArgs) -> Result<Out<Transaction>> {
    let mut client = connect(&config, mode)?;
    let created = client.create(&to_draft(args.draft())).await?;
    Ok(Out::new(
        format!("Created '{}' with id {}", created.title(), created.id()),
        created,
    ))
}

/// Replaces the fields of an existing transaction. The id and the server timestamps are
/// untouched.
pub async fn update(config: Config, mode: Mode, args: &UpdateArgs) -> Result<Out<Transaction>> {
    let mut client = connect(&config, mode)?;
    client.load().await?;
    let updated = client.update(args.id(), &to_draft(args.draft())).await?;
    Ok(Out::new(
        format!("Updated '{}' ({})", updated.title(), updated.id()),
        updated,
    ))
}

/// Deletes a transaction. The remote store confirms before anything is removed locally, so a
/// failed delete leaves everything as it was.
pub async fn delete(config: Config, mode: Mode, args: &DeleteArgs) -> Result<Out<()>> {
    let mut client = connect(&config, mode)?;
    client.load().await?;
    client.delete(args.id()).await?;
    Ok(Out::new_message(format!("Deleted {}", args.id())))
}

fn to_draft(args: &DraftArgs) -> Draft {
    Draft::new(
        args.title(),
        args.amount(),
        args.category(),
        args.description().map(str::to_string),
        args.date(),
        args.kind(),
    )
}
