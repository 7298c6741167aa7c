//! Session and identity.
//!
//! An identity is only a storage partition key built from an id and a
//! password (`"<id>_<password>"`). No credential is verified: a different
//! password for the same id simply selects a different, independent document.
//!
//! Key resolution order:
//! 1) `--id` and `--password` (or `DAYPLAN_ID` / `DAYPLAN_PASSWORD`)
//! 2) Persisted session in `.dayplan/session.json`
//! 3) Otherwise the user is not logged in

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Storage partition key derived from id + password
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Build the key; both parts must be non-empty and path-safe.
    pub fn new(id: &str, password: &str) -> Result<Self> {
        let id = non_empty(Some(id))
            .ok_or_else(|| Error::InvalidArgument("id cannot be empty".to_string()))?;
        let password = non_empty(Some(password))
            .ok_or_else(|| Error::InvalidArgument("password cannot be empty".to_string()))?;

        for (field, value) in [("id", id), ("password", password)] {
            if value.contains(['/', '\\']) {
                return Err(Error::InvalidArgument(format!(
                    "{field} cannot contain path separators"
                )));
            }
        }

        Ok(Self(format!("{id}_{password}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id part, i.e. everything before the first `_`
    pub fn display_id(&self) -> &str {
        self.0.split_once('_').map(|(id, _)| id).unwrap_or(&self.0)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_id())
    }
}

/// Persisted login state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub key: PartitionKey,
    pub user_id: String,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(key: PartitionKey) -> Self {
        let user_id = key.display_id().to_string();
        Self {
            key,
            user_id,
            logged_in_at: Utc::now(),
        }
    }
}

/// Persist a session for `id` + `password`.
pub fn login(storage: &Storage, id: &str, password: &str) -> Result<Session> {
    let key = PartitionKey::new(id, password)?;
    let session = Session::new(key);
    storage.write_json(&storage.session_file(), &session)?;
    tracing::debug!(user = %session.user_id, "logged in");
    Ok(session)
}

/// Forget the persisted session; returns the one that was active.
pub fn logout(storage: &Storage) -> Result<Option<Session>> {
    let previous = load_session(storage)?;
    storage.remove(&storage.session_file())?;
    Ok(previous)
}

/// Load the persisted session, if present and readable.
pub fn load_session(storage: &Storage) -> Result<Option<Session>> {
    let path = storage.session_file();
    if !path.exists() {
        return Ok(None);
    }
    match storage.read_json::<Session>(&path) {
        Ok(session) => Ok(Some(session)),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring unreadable session");
            Ok(None)
        }
    }
}

/// Resolve the active partition key from explicit credentials or the session.
pub fn resolve_key(
    storage: &Storage,
    cli_id: Option<&str>,
    cli_password: Option<&str>,
) -> Result<PartitionKey> {
    match (non_empty(cli_id), non_empty(cli_password)) {
        (Some(id), Some(password)) => return PartitionKey::new(id, password),
        (Some(_), None) | (None, Some(_)) => {
            return Err(Error::InvalidArgument(
                "--id and --password must be given together".to_string(),
            ))
        }
        (None, None) => {}
    }

    load_session(storage)?
        .map(|session| session.key)
        .ok_or(Error::NotLoggedIn)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
