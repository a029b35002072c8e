// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use jobtrack_app::{ColumnModel, DateStyle, StatusPriority, UserId};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_USER_ID: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_FILE_NAME: &str = "jobtrack.log";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub grid: Grid,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            user: User::default(),
            ui: Ui::default(),
            grid: Grid::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Option<i64>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: Some(DEFAULT_USER_ID),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub date_style: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            date_style: Some(DateStyle::Iso.as_str().to_owned()),
        }
    }
}

/// `status_priority` replaces the built-in ordering of the status column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Grid {
    pub status_priority: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("JOBTRACK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set JOBTRACK_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(jobtrack_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` at the top and keep values under [storage], [user], [ui], [grid], and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `jobtrack --print-example-config` for the current layout",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            jobtrack_db::validate_db_path(db_path)?;
        }

        if let Some(id) = self.user.id
            && id <= 0
        {
            bail!(
                "user.id in {} must be a positive integer, got {}",
                path.display(),
                id
            );
        }

        if let Some(style) = &self.ui.date_style
            && DateStyle::parse(style).is_none()
        {
            bail!(
                "ui.date_style in {} must be one of iso, us, eu; got {:?}",
                path.display(),
                style
            );
        }

        if let Some(statuses) = &self.grid.status_priority {
            if statuses.is_empty() {
                bail!(
                    "grid.status_priority in {} is empty; list at least one status or remove the key",
                    path.display()
                );
            }
            let mut seen = BTreeSet::new();
            for status in statuses {
                if status.trim().is_empty() {
                    bail!(
                        "grid.status_priority in {} contains a blank status",
                        path.display()
                    );
                }
                if !seen.insert(status.as_str()) {
                    bail!(
                        "grid.status_priority in {} lists {:?} more than once",
                        path.display(),
                        status
                    );
                }
            }
        }

        if let Some(level) = &self.logging.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "logging.level in {} is not a valid filter; use a level like \"info\" or a directive like \"jobtrack_db=debug\"",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => jobtrack_db::default_db_path(),
        }
    }

    pub fn user_id(&self) -> UserId {
        UserId::new(self.user.id.unwrap_or(DEFAULT_USER_ID))
    }

    pub fn date_style(&self) -> DateStyle {
        self.ui
            .date_style
            .as_deref()
            .and_then(DateStyle::parse)
            .unwrap_or_default()
    }

    pub fn status_priority(&self) -> StatusPriority {
        match &self.grid.status_priority {
            Some(statuses) => StatusPriority::new(statuses.iter().cloned()),
            None => StatusPriority::legacy(),
        }
    }

    pub fn column_model(&self) -> ColumnModel {
        ColumnModel::new(self.status_priority())
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(file) = &self.logging.file {
            return Ok(PathBuf::from(file));
        }
        let cache_root = dirs::cache_dir().ok_or_else(|| {
            anyhow!("cannot resolve cache directory; set [logging].file to a writable path")
        })?;
        Ok(cache_root.join(jobtrack_db::APP_NAME).join(LOG_FILE_NAME))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# jobtrack config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is the platform data dir (for example ~/.local/share/jobtrack/jobtrack.db)\n# db_path = \"/absolute/path/to/jobtrack.db\"\n\n[user]\nid = {}\n\n[ui]\n# iso (2023-01-15), us (01/15/2023) or eu (15/01/2023)\ndate_style = \"iso\"\n\n[grid]\n# Order used when sorting by status. Statuses not listed sort first.\n# status_priority = [\"Applied\", \"Interviewed\", \"Offered\", \"Rejected\"]\n\n[logging]\nlevel = \"{}\"\n# Optional. Default is the platform cache dir (for example ~/.cache/jobtrack/jobtrack.log)\n# file = \"/absolute/path/to/jobtrack.log\"\n",
            path.display(),
            DEFAULT_USER_ID,
            DEFAULT_LOG_LEVEL,
        )
    }
}
