//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the store described by `FORUM_*` environment variables.
//! - Print version and schema status for quick deployment checks.

use forum_store::db::migrations::{current_user_version, latest_version};
use forum_store::db::open_db_with_config;
use forum_store::{core_version, init_logging_from_config, ping, StoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("forum_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config).map_err(|err| err.to_string())?;

    println!("forum_store ping={}", ping());
    println!("forum_store version={}", core_version());

    let conn = open_db_with_config(&config).map_err(|err| err.to_string())?;
    let schema_version = current_user_version(&conn).map_err(|err| err.to_string())?;
    let target = config
        .db_path
        .as_deref()
        .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string());
    println!("forum_store db={target} schema_version={schema_version}/{}", latest_version());
    log::info!("event=cli_probe module=cli status=ok schema_version={schema_version}");

    Ok(())
}
