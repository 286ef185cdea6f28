//! `skh` - CLI for the lost item report office
//!
//! Runs the web application and offers a few maintenance commands for the
//! database and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use skh::cli::{Cli, Command, ConfigCommand, ServeCommand};
use skh::service::{Services, UploadStore};
use skh::{init_logging, Config, Database, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, &serve_cmd),
        Command::Migrate => handle_migrate(&config),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    cmd.apply(&mut config);
    config.validate()?;

    let db = Database::open(config.database_path(), config.busy_timeout())
        .context("opening database")?;
    let clock = config.clock()?;
    let uploads = UploadStore::new(config.uploads_dir(), config.uploads.max_logo_bytes);
    let services = Services::new(&db, clock, uploads);

    actix_web::rt::System::new()
        .block_on(skh::web::serve(&config, services))
        .context("running HTTP server")
}

fn handle_migrate(config: &Config) -> anyhow::Result<()> {
    let path = config.database_path();
    let storage = Storage::open(&path, config.busy_timeout()).context("migrating database")?;
    let stats = storage.stats()?;
    println!(
        "Database at {} is at schema version {}",
        path.display(),
        stats.schema_version
    );
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let path = config.database_path();
    let storage = Storage::open(&path, config.busy_timeout()).context("opening database")?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": path,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("skh status");
        println!("----------");
        println!("Database:       {}", path.display());
        println!("Schema version: {}", stats.schema_version);
        println!("Size:           {} bytes", stats.db_size_bytes);
        println!("Letters:        {}", stats.total_letters);
        println!("Officers:       {}", stats.total_officers);
        println!(
            "Last issued:    {} ({})",
            stats.last_issued_number, stats.last_issued_year
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Address:            {}", config.base_url());
                println!("  Open browser:       {}", config.server.open_browser);
                println!("  Workers:            {}", config.server.workers);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Uploads dir:        {}", config.uploads_dir().display());
                println!("  Busy timeout (ms):  {}", config.storage.busy_timeout_ms);
                println!();
                println!("[Uploads]");
                println!("  Max logo bytes:     {}", config.uploads.max_logo_bytes);
                println!();
                println!("[Locale]");
                println!("  UTC offset (hours): {}", config.locale.utc_offset_hours);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
