//! dayplan login/logout/whoami command implementation
//!
//! The remembered identity only selects which per-user document is used.

use chrono::{DateTime, Utc};

use crate::config::{Config, Layout};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::session::{self, PartitionKey};

use super::GlobalOptions;

#[derive(serde::Serialize)]
struct LoginReport {
    user_id: String,
    logged_in_at: DateTime<Utc>,
}

#[derive(serde::Serialize)]
struct LogoutReport {
    logged_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

#[derive(serde::Serialize)]
struct WhoamiReport {
    logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'static str>,
    layout: Layout,
}

pub fn run_login(globals: &GlobalOptions) -> Result<()> {
    let (Some(id), Some(password)) = (globals.id.as_deref(), globals.password.as_deref()) else {
        return Err(Error::InvalidArgument(
            "login requires --id and --password".to_string(),
        ));
    };

    let storage = globals.storage()?;
    let session = session::login(&storage, id, password)?;

    let report = LoginReport {
        user_id: session.user_id.clone(),
        logged_in_at: session.logged_in_at,
    };

    let mut human = HumanOutput::new(format!("dayplan login: {}", session.user_id));
    human.push_summary("user", session.user_id.clone());
    human.push_summary("session", storage.session_file().display().to_string());
    if Config::load_from_dir(storage.root()).layout == Layout::PerDay {
        human.push_warning("layout is per_day; the identity is not used for storage");
    }
    human.push_next_step("dayplan day");

    emit_success(globals.output(), "login", &report, Some(&human))?;

    Ok(())
}

pub fn run_logout(globals: &GlobalOptions) -> Result<()> {
    let storage = globals.storage()?;
    let previous = session::logout(&storage)?;

    let report = LogoutReport {
        logged_out: previous.is_some(),
        user_id: previous.as_ref().map(|s| s.user_id.clone()),
    };

    let header = match &previous {
        Some(session) => format!("dayplan logout: {}", session.user_id),
        None => "dayplan logout: not logged in".to_string(),
    };
    let human = HumanOutput::new(header);

    emit_success(globals.output(), "logout", &report, Some(&human))?;

    Ok(())
}

pub fn run_whoami(globals: &GlobalOptions) -> Result<()> {
    let storage = globals.storage()?;
    let layout = Config::load_from_dir(storage.root()).layout;

    let explicit = globals.id.is_some() || globals.password.is_some();
    let (key, source): (Option<PartitionKey>, Option<&'static str>) = if explicit {
        let key = session::resolve_key(&storage, globals.id.as_deref(), globals.password.as_deref())?;
        (Some(key), Some("flags"))
    } else {
        match session::load_session(&storage)? {
            Some(session) => (Some(session.key), Some("session")),
            None => (None, None),
        }
    };

    let report = WhoamiReport {
        logged_in: key.is_some(),
        user_id: key.as_ref().map(|k| k.display_id().to_string()),
        source,
        layout,
    };

    let mut human = match &key {
        Some(key) => HumanOutput::new(format!("dayplan whoami: {key}")),
        None => HumanOutput::new("dayplan whoami: not logged in"),
    };
    if let (Some(key), Some(source)) = (&key, source) {
        human.push_summary("user", key.display_id().to_string());
        human.push_summary("source", source);
    }
    human.push_summary(
        "layout",
        match layout {
            Layout::PerUser => "per_user",
            Layout::PerDay => "per_day",
        },
    );
    if key.is_none() && layout == Layout::PerUser {
        human.push_next_step("dayplan login --id <id> --password <password>");
    }

    emit_success(globals.output(), "whoami", &report, Some(&human))?;

    Ok(())
}
