use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use env_logger::Env;

use qorb::config::{BenchConfig, ConfigManager};
use qorb::store::{maybe_populate, Library, SeedConfig, SeedOutcome};
use qorb::suite::{Suite, SuiteRunner};
use qorb::util::{format_bytes, format_elapsed};
use qorb::{error, Result};

#[derive(Parser)]
#[command(name = "qorb")]
#[command(about = "Compare query strategies against a SQLite library database")]
#[command(version)]
struct Cli {
    /// Library database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Number of generated authors when seeding an empty library
    #[arg(short, long, global = true)]
    bulk_authors: Option<usize>,

    /// Append comparison records to the results history
    #[arg(short, long, global = true)]
    save: bool,

    /// Print comparison records as JSON instead of the text reports
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Populate the library if it is empty
    Seed,
    /// N+1 lookups, indexes and counts
    Demo,
    /// Raw SQL and eager loading strategies
    Challenge,
    /// Loops rewritten as single queries
    Optimize,
    /// Run every suite
    All,
    /// Show or clear saved comparison records
    History {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Delete the history instead of showing it
        #[arg(long)]
        clear: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long = "write", id = "write_config")]
        write: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        log::error!("{}", err);
        eprintln!("Error: {}", error::user_friendly_message(&err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load_config()?;
    if let Some(path) = cli.database {
        config = config.with_database_path(path);
    }
    if let Some(count) = cli.bulk_authors {
        config = config.with_bulk_authors(count);
    }
    if cli.save {
        config = config.with_save_results(true);
    }
    config.validate()?;

    match cli.command {
        Command::Seed => seed(&config),
        Command::Demo => run_suites(&config, &manager, &[Suite::Demo], cli.json),
        Command::Challenge => run_suites(&config, &manager, &[Suite::Challenge], cli.json),
        Command::Optimize => run_suites(&config, &manager, &[Suite::Optimize], cli.json),
        Command::All => run_suites(&config, &manager, &Suite::ALL, cli.json),
        Command::History { limit, clear } => history(&manager, limit, clear, cli.json),
        Command::Config { write } => show_config(&config, &manager, write),
    }
}

fn open_library(config: &BenchConfig, quiet: bool) -> Result<(Library, SeedOutcome)> {
    let library = Library::open(&config.database_path)?;
    let seed_config = SeedConfig::new(config.bulk_authors).quiet(quiet);
    let outcome = maybe_populate(&library, &seed_config)?;
    Ok((library, outcome))
}

fn seed(config: &BenchConfig) -> Result<()> {
    let start = Instant::now();
    let (library, outcome) = open_library(config, false)?;
    let counts = outcome.counts();

    match outcome {
        SeedOutcome::AlreadyPopulated(_) => println!("Library already populated"),
        SeedOutcome::Populated(_) => {
            println!("Populated library in {}", format_elapsed(start.elapsed()))
        }
    }
    println!(
        "{} authors, {} books, {} genres ({}) at {}",
        counts.authors,
        counts.books,
        counts.genres,
        format_bytes(library.database_size()?),
        config.database_path.display()
    );
    Ok(())
}

fn run_suites(
    config: &BenchConfig,
    manager: &ConfigManager,
    suites: &[Suite],
    json: bool,
) -> Result<()> {
    let (library, _) = open_library(config, json)?;

    let start = Instant::now();
    let out: Box<dyn Write> = if json {
        Box::new(io::sink())
    } else {
        Box::new(io::stdout().lock())
    };
    let mut runner = SuiteRunner::new(&library, config, out);
    for suite in suites {
        runner.run(*suite)?;
    }
    let records = runner.into_records();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        println!(
            "\nRan {} comparisons in {}",
            records.len(),
            format_elapsed(start.elapsed())
        );
    }

    if config.save_results {
        manager.save_records(records)?;
    }
    Ok(())
}

fn history(manager: &ConfigManager, limit: usize, clear: bool, json: bool) -> Result<()> {
    if clear {
        manager.clear_records()?;
        println!("Results history cleared");
        return Ok(());
    }

    let records = manager.get_recent_records(limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No saved comparisons. Run a suite with --save to record one.");
    } else {
        for record in &records {
            println!("{}", record);
        }
    }
    Ok(())
}

fn show_config(config: &BenchConfig, manager: &ConfigManager, write: bool) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    if write {
        manager.save_config(config)?;
        println!("\nSaved to {}", BenchConfig::config_file_path()?.display());
    }
    Ok(())
}
