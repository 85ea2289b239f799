use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Handles the `outlay init` command: creates the outlay home directory, its `.secrets`
/// subdirectory and an initial `config.json` pointing at `api_url`.
pub async fn init(home: &Path, api_url: &str) -> Result<Out<()>> {
    let config = Config::create(home, api_url).await?;
    Ok(Out::new_message(format!(
        "Initialized outlay home at '{}' for API '{}'",
        config.root().display(),
        config.api_url()
    )))
}
