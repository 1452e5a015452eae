use pgbackend::config::{default_config_path, load_config};
use pgbackend::{DatabaseWrapper, PgDriver, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Usage: pgbackend [SETTINGS] [ALIAS] [SQL]
///
/// Connects with the settings of ALIAS (default "default"), prints the
/// server version and, when SQL is given, runs it and prints each row as JSON.
fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings_path = match args.first() {
        Some(path) => PathBuf::from(path),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                eprintln!("No settings file given and no config directory available.");
                return ExitCode::FAILURE;
            }
        },
    };
    let alias = args.get(1).map(String::as_str).unwrap_or("default");
    let sql = args.get(2).map(String::as_str);

    match run(settings_path, alias, sql) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings_path: PathBuf, alias: &str, sql: Option<&str>) -> Result<()> {
    info!("Loading settings from {}", settings_path.display());
    let config = load_config(&settings_path)?;
    let mut wrapper = DatabaseWrapper::from_config(PgDriver, &config, alias)?;

    let version = wrapper.pg_version()?;
    println!("Connected to '{}' (server version {})", alias, version);

    if let Some(sql) = sql {
        let mut cursor = wrapper.cursor()?;
        cursor.execute(sql, &[])?;
        for row in cursor.by_ref() {
            let row = row?;
            println!("{}", serde_json::to_string(&row).unwrap_or_else(|_| format!("{:?}", row)));
        }
        println!("({} rows)", cursor.rowcount());
        wrapper.commit()?;
    }

    wrapper.close()
}
