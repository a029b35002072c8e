// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV_VAR: &str = "JOBTRACK_LOG";

/// `JOBTRACK_LOG` wins over the configured level when it is set.
pub fn build_filter(configured_level: &str) -> Result<EnvFilter> {
    let directives = match env::var(LOG_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => configured_level.to_owned(),
    };
    EnvFilter::try_new(&directives)
        .map_err(|error| anyhow!("invalid log filter {directives:?}: {error}"))
}

/// Installs the global subscriber. Output goes to `log_path` since the
/// terminal belongs to the UI.
pub fn init(configured_level: &str, log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("open log file {}", log_path.display()))?;

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(build_filter(configured_level)?)
        .with(file_layer)
        .try_init()
        .context("install log subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{LOG_ENV_VAR, build_filter};
    use anyhow::Result;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn configured_level_is_used_without_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(LOG_ENV_VAR);
        }
        let filter = build_filter("warn")?;
        assert_eq!(filter.to_string(), "warn");
        Ok(())
    }

    #[test]
    fn env_override_replaces_configured_level() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(LOG_ENV_VAR, "jobtrack_db=trace");
        }
        let filter = build_filter("warn");
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(LOG_ENV_VAR);
        }
        assert_eq!(filter?.to_string(), "jobtrack_db=trace");
        Ok(())
    }

    #[test]
    fn invalid_filter_is_reported() {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(LOG_ENV_VAR);
        }
        let error = build_filter("jobtrack=verbose").expect_err("bad level should fail");
        assert!(error.to_string().contains("invalid log filter"));
    }
}
