//! Lending Catalog - track lendable items, borrowers, and who holds what.
//!
//! Items and borrowers live in two line-oriented text files that are
//! rewritten in full after every change. An item is either available or
//! held by exactly one borrower.
//!
//! Quick start:
//!   catalog                               # Interactive numbered menu
//!   catalog items                         # List items
//!   catalog add-item "1984" "George Orwell" 978-0451524935
//!   catalog borrow 001 978-0451524935     # Lend an item
//!   catalog return 001 978-0451524935     # Take it back
//!   catalog check                         # Verify items match borrower records

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::io;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_borrowers, format_issues, format_items, format_summary, Catalog, CatalogOptions,
    OutputFormat,
};
use cli::{Cli, Commands};
use domain::{AppConfig, StartupPolicy};
use infrastructure::{ensure_config_exists, load_config, FileGateway};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .output_format()
        .map_err(|e| domain::AppError::Config { message: e })?;

    let config_path = cli.config_path();
    let mut config = load_config(Some(&config_path))?;
    cli.apply_overrides(&mut config);

    let startup = config.catalog.startup;
    let open = || open_catalog(&config, startup);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            cli::run_menu(&mut open()?, io::stdin().lock(), io::stdout().lock(), format)
        }
        Commands::Items => cmd_items(&open()?, format),
        Commands::Borrowers => cmd_borrowers(&open()?, format),
        Commands::Item { id } => cmd_item(&open()?, &id, format),
        Commands::Borrower { id } => cmd_borrower(&open()?, &id, format),
        Commands::AddItem { title, author, id } => {
            open()?.add_item(&title, &author, &id)?;
            success(&format!("Added {} ({})", title.cyan(), id));
            Ok(())
        }
        Commands::RemoveItem { id } => {
            let item = open()?.remove_item(&id)?;
            success(&format!("Removed {} ({})", item.title.cyan(), id));
            Ok(())
        }
        Commands::Register { id, name } => {
            open()?.register_borrower(&id, &name)?;
            success(&format!("Registered {} ({})", name.cyan(), id));
            Ok(())
        }
        Commands::RemoveBorrower { id } => {
            let borrower = open()?.remove_borrower(&id)?;
            success(&format!("Removed {} ({})", borrower.name.cyan(), id));
            Ok(())
        }
        Commands::Borrow { borrower, item } => {
            open()?.borrow_item(&borrower, &item)?;
            success(&format!("{borrower} borrowed {item}"));
            Ok(())
        }
        Commands::Return { borrower, item } => {
            open()?.return_item(&borrower, &item)?;
            success(&format!("{borrower} returned {item}"));
            Ok(())
        }
        Commands::Reset => cmd_reset(&config),
        Commands::Check => {
            println!("{}", format_issues(&open()?.audit()));
            Ok(())
        }
        Commands::Paths => cmd_paths(&config, &config_path),
        Commands::InitConfig => cmd_init_config(&config_path),
    }
}

/// Open the file-backed catalog described by the configuration.
fn open_catalog(config: &AppConfig, startup: StartupPolicy) -> domain::Result<Catalog<FileGateway>> {
    tracing::debug!(
        items = %config.items_path().display(),
        borrowers = %config.borrowers_path().display(),
        ?startup,
        "Opening catalog"
    );

    Catalog::open(
        FileGateway::from_config(config),
        startup,
        CatalogOptions::from(&config.catalog),
    )
}

/// List items command.
fn cmd_items(catalog: &Catalog<FileGateway>, format: OutputFormat) -> domain::Result<()> {
    println!("{}", format_items(&catalog.list_items(), format)?);
    if format != OutputFormat::Json {
        println!();
        println!("{}", format_summary(&catalog.summary()));
    }
    Ok(())
}

/// List borrowers command.
fn cmd_borrowers(catalog: &Catalog<FileGateway>, format: OutputFormat) -> domain::Result<()> {
    println!("{}", format_borrowers(&catalog.list_borrowers(), format)?);
    Ok(())
}

fn cmd_item(catalog: &Catalog<FileGateway>, id: &str, format: OutputFormat) -> domain::Result<()> {
    let item = catalog
        .find_item(id)
        .ok_or_else(|| domain::AppError::item_not_found(id))?;
    println!("{}", format_items(&[item], format)?);
    Ok(())
}

fn cmd_borrower(
    catalog: &Catalog<FileGateway>,
    id: &str,
    format: OutputFormat,
) -> domain::Result<()> {
    let borrower = catalog
        .find_borrower(id)
        .ok_or_else(|| domain::AppError::borrower_not_found(id))?;
    println!("{}", format_borrowers(&[borrower], format)?);
    Ok(())
}

/// Reset to default records command.
fn cmd_reset(config: &AppConfig) -> domain::Result<()> {
    let catalog = open_catalog(config, StartupPolicy::ResetToDefaults)?;
    success("Catalog reset to default records");
    println!("{}", format_summary(&catalog.summary()));
    Ok(())
}

/// Show file paths command.
fn cmd_paths(config: &AppConfig, config_path: &std::path::Path) -> domain::Result<()> {
    println!("{}", "📂 Catalog Paths".bold());
    println!();

    for (label, path) in [
        ("config".green(), config_path.to_path_buf()),
        ("items".blue(), config.items_path()),
        ("borrowers".blue(), config.borrowers_path()),
    ] {
        let state = if path.exists() { "" } else { " (missing)" };
        println!("  [{}] {}{}", label, path.display(), state);
    }

    Ok(())
}

/// Write the default configuration file command.
fn cmd_init_config(config_path: &std::path::Path) -> domain::Result<()> {
    if ensure_config_exists(config_path)? {
        success(&format!("Created {}", config_path.display()));
    } else {
        println!("Configuration already exists: {}", config_path.display());
    }
    Ok(())
}

fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}
