// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use jobtrack_app::{AppState, Route, UserId};
use jobtrack_db::Store;
use jobtrack_tui::ViewSettings;
use runtime::DbRuntime;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `jobtrack --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let log_path = config.log_path()?;
    logging::init(config.log_level(), &log_path).with_context(|| {
        format!(
            "set up logging at {}; set [logging].file to a writable path",
            log_path.display()
        )
    })?;
    tracing::info!(
        config = %options.config_path.display(),
        db = %db_path.display(),
        log = %log_path.display(),
        "starting jobtrack"
    );

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or JOBTRACK_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    let user_id = options.user_id.unwrap_or_else(|| config.user_id());
    if options.demo {
        let inserted = store.seed_demo(user_id)?;
        tracing::info!(inserted, user = %user_id, "seeded demo applications");
    }
    if options.check_only {
        tracing::info!("startup check passed");
        return Ok(());
    }

    let mut state = AppState {
        user_id,
        route: options.route.unwrap_or(Route::JobTracker),
        ..AppState::default()
    };
    let settings = ViewSettings {
        columns: config.column_model(),
        date_style: config.date_style(),
    };

    let mut runtime = DbRuntime::with_db_path(&store, Some(db_path));
    let result = jobtrack_tui::run_app(&mut state, &mut runtime, settings);
    if let Err(error) = &result {
        tracing::error!("ui exited with error: {error:#}");
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    user_id: Option<UserId>,
    route: Option<Route>,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        user_id: None,
        route: None,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--user" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--user requires a numeric user id"))?;
                let raw = value.as_ref();
                let id = raw
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("--user expects a positive integer, got {raw:?}")
                    })?;
                options.user_id = Some(UserId::new(id));
            }
            "--open" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--open requires a route path"))?;
                let raw = value.as_ref();
                let route = Route::parse(raw).ok_or_else(|| {
                    anyhow::anyhow!(
                        "--open expects /job-tracker or /job-description/<id>, got {raw:?}"
                    )
                })?;
                options.route = Some(route);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("jobtrack");
    println!("  --config <path>          Use a specific config path");
    println!("  --user <id>              Show applications for this user id");
    println!("  --open <route>           Start at /job-tracker or /job-description/<id>");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with sample applications (in-memory)");
    println!("  --check                  Validate config + DB + logging, then exit");
    println!("  --help                   Show this help");
}
