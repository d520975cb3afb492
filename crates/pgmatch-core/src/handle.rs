use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which of the two compared schemas a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Source => "Source",
            Side::Target => "Target",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Connection coordinates and schema identity for one side of a run.
///
/// Never carries a password, so it is safe to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaHandle {
    /// Server host; empty means the driver default.
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub schema: String,
}

impl SchemaHandle {
    /// Check that every mandatory coordinate is present.
    pub fn validate(&self, side: Side) -> Result<()> {
        let missing = [
            ("DBuser", &self.user),
            ("DB", &self.database),
            ("schema", &self.schema),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        match missing {
            Some((field, _)) => Err(Error::Other(format!(
                "{} {field} not provided.",
                side.label()
            ))),
            None if self.port == 0 => Err(Error::Other(format!(
                "{} port must be greater than zero.",
                side.label()
            ))),
            None => Ok(()),
        }
    }

    /// Host name as shown in logs.
    pub fn display_host(&self) -> &str {
        if self.host.is_empty() {
            "localhost"
        } else {
            &self.host
        }
    }
}

impl fmt::Display for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}/{} schema={}",
            self.user,
            self.display_host(),
            self.port,
            self.database,
            self.schema
        )
    }
}
