use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hashtags::grammar::extract_hashtags;
use hashtags::utils::ensure_database_directory;
use hashtags::{
    Config, Database, SqliteCounterStore, TagError, TagRegistry, TagService, UsageStats,
};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// hashtags - hashtag registry and usage statistics
#[derive(Parser)]
#[command(name = "hashtags")]
#[command(about = "Manage hashtags and inspect their recent usage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Print the hashtags found in a piece of text
    Extract(ExtractCommand),
    #[command(flatten)]
    Stored(StoredCommand),
}

/// Commands that read or write the tag and counter stores
#[derive(Subcommand)]
enum StoredCommand {
    /// Create a tag, or show the existing one with the same name
    Create(CreateCommand),
    /// Find tags starting with a prefix
    Search(SearchCommand),
    /// Show the last seven days of usage for a tag
    History(HistoryCommand),
    /// Record that an account used a tag
    Record(RecordCommand),
    /// Show the lifetime usage count of a tag
    Lifetime(LifetimeCommand),
}

#[derive(Parser)]
struct CreateCommand {
    /// Tag name, without the leading #
    #[arg(value_name = "NAME")]
    name: String,
}

#[derive(Parser)]
struct SearchCommand {
    /// Prefix to match, ignoring case
    #[arg(value_name = "TERM")]
    term: String,

    /// Maximum number of results (defaults to HASHTAGS_SEARCH_LIMIT or 5)
    #[arg(short, long, value_name = "N")]
    limit: Option<usize>,
}

#[derive(Parser)]
struct HistoryCommand {
    #[arg(value_name = "NAME")]
    name: String,

    /// Print the history as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct RecordCommand {
    #[arg(value_name = "NAME")]
    name: String,

    /// Id of the account using the tag
    #[arg(short, long, value_name = "ID")]
    account: i64,
}

#[derive(Parser)]
struct ExtractCommand {
    #[arg(value_name = "TEXT")]
    text: String,
}

#[derive(Parser)]
struct LifetimeCommand {
    #[arg(value_name = "NAME")]
    name: String,
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli.command) {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are invalid or unknown tag names. Internal errors include
/// database and counter store failures.
fn is_user_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<TagError>())
        .any(TagError::is_user_error)
}

fn run(command: &Commands) -> Result<()> {
    match command {
        Commands::Extract(cmd) => {
            for name in extract_hashtags(&cmd.text) {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Stored(cmd) => run_stored(cmd),
    }
}

/// Opens the stores, runs the command and closes the counter store.
fn run_stored(command: &StoredCommand) -> Result<()> {
    let config = Config::from_env()?;
    let service = open_service(&config)?;
    let result = execute(command, &service, &config, OffsetDateTime::now_utc());

    let (_, stats) = service.into_parts();
    stats
        .into_store()
        .close()
        .context("Failed to close counter store")?;
    result
}

/// Opens both stores described by the configuration.
fn open_service(config: &Config) -> Result<TagService<SqliteCounterStore>> {
    ensure_database_directory(&config.database_path)?;
    ensure_database_directory(&config.counter_store_path)?;

    let db = Database::open(&config.database_path).context("Failed to open database")?;
    let store = SqliteCounterStore::open(&config.counter_store_path)
        .context("Failed to open counter store")?;

    Ok(TagService::new(
        TagRegistry::new(db),
        UsageStats::new(store, config.utc_offset),
    ))
}

/// Executes a command against an open service.
///
/// Separated from `run` so it can be tested with in-memory stores.
fn execute<S: hashtags::CounterStore>(
    command: &StoredCommand,
    service: &TagService<S>,
    config: &Config,
    now: OffsetDateTime,
) -> Result<()> {
    match command {
        StoredCommand::Create(cmd) => {
            let tag = service
                .registry()
                .find_or_create(&cmd.name)
                .context("Failed to create tag")?;
            println!("#{} (id: {})", tag.name(), tag.id());
        }
        StoredCommand::Search(cmd) => {
            let limit = cmd.limit.unwrap_or(config.search_limit);
            for tag in service.search_for(&cmd.term, limit)? {
                println!("#{}", tag.name());
            }
        }
        StoredCommand::History(cmd) => {
            let history = service.history(&cmd.name, now)?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                println!("{:<12} {:>8} {:>9}", "DAY", "USES", "ACCOUNTS");
                for entry in &history {
                    println!("{:<12} {:>8} {:>9}", entry.day, entry.uses, entry.accounts);
                }
            }
        }
        StoredCommand::Record(cmd) => {
            let tag = service
                .record_use(&cmd.name, cmd.account, now)
                .context("Failed to record tag use")?;
            println!("Recorded use of #{} by account {}", tag.name(), cmd.account);
        }
        StoredCommand::Lifetime(cmd) => {
            println!("{}", service.lifetime_count(&cmd.name)?);
        }
    }
    Ok(())
}
