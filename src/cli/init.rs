//! dayplan init command implementation
//!
//! Creates the default config and the local state directory.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::storage::LOCAL_DIR;

use super::{ensure_dir, GlobalOptions};

#[derive(serde::Serialize)]
struct InitReport {
    dir: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    local_dir: bool,
}

pub fn run(globals: &GlobalOptions) -> Result<()> {
    let storage = globals.storage()?;
    let dir = storage.root().to_path_buf();
    ensure_dir(&dir)?;

    let created_config = ensure_config(&dir)?;
    let created_local_dir = ensure_dir(&storage.local_dir())?;

    let report = InitReport {
        dir: dir.clone(),
        created: InitCreated {
            config: created_config,
            local_dir: created_local_dir,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(crate::config::CONFIG_FILENAME.to_string());
    }
    if created_local_dir {
        created_items.push(format!("{LOCAL_DIR}/"));
    }

    let header = if created_items.is_empty() {
        "dayplan init: nothing to do".to_string()
    } else {
        "dayplan init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("dir", dir.display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("dayplan login --id <id> --password <password>");
    human.push_next_step("dayplan day");

    emit_success(globals.output(), "init", &report, Some(&human))?;

    Ok(())
}

fn ensure_config(dir: &Path) -> Result<bool> {
    let config_path = Config::path_in(dir);
    if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::OperationFailed(format!(
                "{} exists but is not a file: {}",
                crate::config::CONFIG_FILENAME,
                config_path.display()
            )));
        }
        return Ok(false);
    }

    Config::default().save(&config_path)?;
    Ok(true)
}
