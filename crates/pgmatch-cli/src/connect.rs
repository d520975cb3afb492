use std::env;

use tracing::{debug, info};

use pgmatch_catalog::{CatalogReader, PostgresCatalog};
use pgmatch_core::{Error, SchemaHandle, Side};

use crate::CliError;
use crate::prompt::read_password;

const SHARED_PASSWORD_ENV: &str = "PGPASSWORD";

fn side_password_env(side: Side) -> &'static str {
    match side {
        Side::Source => "PGMATCH_SOURCE_PASSWORD",
        Side::Target => "PGMATCH_TARGET_PASSWORD",
    }
}

/// Per-side variable first, then `PGPASSWORD`. Empty values count as unset.
fn password_from<F>(side: Side, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    [side_password_env(side), SHARED_PASSWORD_ENV]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
}

/// Connect one side, prompting once for a password if the server wants one.
pub async fn connect_side(handle: &SchemaHandle, side: Side) -> Result<PostgresCatalog, CliError> {
    let password = password_from(side, |key| env::var(key).ok());
    debug!(%side, handle = %handle, "opening connection");

    let catalog = match PostgresCatalog::connect(handle, password.as_deref()).await {
        Ok(catalog) => catalog,
        Err(Error::PasswordRequired(_)) => {
            info!(%side, "password required");
            let password = read_password(&format!("{side} password for {handle}: "))?;
            PostgresCatalog::connect(handle, Some(&password)).await?
        }
        Err(err) => return Err(err.into()),
    };
    debug!(%side, engine = catalog.engine(), "connected");
    Ok(catalog)
}
