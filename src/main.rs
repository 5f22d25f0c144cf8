use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use phishnet::app::{render_stats, resources_help, App, Lookup, UsageError};
use phishnet::config::API_KEY_ENV;
use phishnet::{
    format_api_error, PhishNetClient, QueryParams, ResourceCache, ResourceKind, Settings, VERSION,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

const HELP_HINT: &str = "Use 'phishnet --help' for a list of available resources and options.";

/// Command-line client for the Phish.net API
#[derive(Parser, Debug)]
#[command(name = "phishnet", version = VERSION, about, long_about = None)]
struct Args {
    /// API key (overrides PHISH_NET_API_KEY and the settings file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API root URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Response format suffix
    #[arg(long, global = true)]
    format: Option<String>,

    /// Directory holding the cache files
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Refetch cache entries older than this many minutes
    #[arg(long, global = true)]
    ttl_minutes: Option<i64>,

    /// Neither read nor write the cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Ignore cached results but store fresh ones
    #[arg(long, global = true)]
    refresh: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a resource: <resource> [id | <column> <value>]
    Get {
        /// Resource name, e.g. shows or setlists
        resource: String,

        /// Nothing for all items, an id, or a column and a value
        lookup: Vec<String>,

        /// Column to sort by
        #[arg(long)]
        order_by: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Inspect or clear the local cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// List resources and the lookups they accept
    Resources,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show entry counts per resource
    Stats,
    /// Remove cached entries (all resources, or just one)
    Clear { resource: Option<String> },
    /// Remove entries older than the TTL
    Purge,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }

    /// Request lines go to info at this level or finer
    fn logs_requests(self) -> bool {
        matches!(self, LogLevel::Info | LogLevel::Debug | LogLevel::Trace)
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {}", log_path.display(), e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("phishnet {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("phishnet").join("phishnet.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".phishnet").join("phishnet.log");
    }
    PathBuf::from("phishnet.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:?}", err);
            eprintln!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}

/// Short message for known failures, the full cause chain otherwise
fn render_error(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<phishnet::Error>() {
        return format!("Error: {}\n{}", format_api_error(e), HELP_HINT);
    }
    if let Some(e) = err.downcast_ref::<UsageError>() {
        return format!("Error: {}\n{}", e, HELP_HINT);
    }
    format!("{:?}", err)
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::load();

    match &args.command {
        Command::Resources => {
            print!("{}", resources_help());
            Ok(())
        }
        Command::Cache { action } => run_cache(&args, &settings, action),
        Command::Get {
            resource,
            lookup,
            order_by,
            desc,
            limit,
        } => {
            let kind: ResourceKind = resource.parse()?;
            let lookup = Lookup::from_args(lookup)?;

            let mut params = QueryParams::new();
            if let Some(order_by) = order_by {
                params = params.order_by(order_by.as_str());
            }
            if *desc {
                params = params.descending();
            }
            if let Some(limit) = limit {
                params = params.limit(*limit);
            }

            run_get(&args, &settings, kind, &lookup, params).await
        }
    }
}

async fn run_get(
    args: &Args,
    settings: &Settings,
    kind: ResourceKind,
    lookup: &Lookup,
    params: QueryParams,
) -> Result<()> {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()));

    let mut config = settings
        .client_config(api_key)
        .with_logs(args.log_level.logs_requests());
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(format) = &args.format {
        config = config.with_format(format.as_str());
    }

    let client = PhishNetClient::new(config)?;
    let cache = if args.no_cache {
        None
    } else {
        Some(open_cache(args, settings)?)
    };

    let mut app = App::new(client, cache).with_refresh(args.refresh);

    let cancel = app.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling request");
            cancel.cancel();
        }
    });

    let result = app.query(kind, lookup, params).await;
    ctrl_c.abort();

    if let Err(e) = app.save() {
        if result.is_ok() {
            return Err(e.into());
        }
        tracing::error!("Failed to save cache: {}", e);
        eprintln!("Warning: failed to save cache: {}", e);
    }

    let output = result?;
    println!("{}", output.render()?);
    Ok(())
}

fn run_cache(args: &Args, settings: &Settings, action: &CacheAction) -> Result<()> {
    let mut cache = open_cache(args, settings)?;

    match action {
        CacheAction::Stats => {
            println!("Cache directory: {}", cache.dir().display());
            println!("{}", render_stats(&cache.stats()).trim_end());
        }
        CacheAction::Clear { resource: Some(resource) } => {
            let kind: ResourceKind = resource.parse()?;
            let removed = cache.clear(kind);
            println!("Removed {} {} entr{}.", removed, kind, plural_y(removed));
        }
        CacheAction::Clear { resource: None } => {
            let removed = cache.clear_all();
            println!("Removed {} entr{}.", removed, plural_y(removed));
        }
        CacheAction::Purge => {
            if cache.ttl().is_none() {
                println!("No TTL configured; nothing expires.");
            } else {
                let purged = cache.purge_expired();
                println!("Purged {} expired entr{}.", purged, plural_y(purged));
            }
        }
    }

    cache.save()?;
    Ok(())
}

fn open_cache(args: &Args, settings: &Settings) -> Result<ResourceCache> {
    let dir = args
        .cache_dir
        .clone()
        .unwrap_or_else(|| settings.effective_cache_dir());
    let ttl = Settings::cache_ttl(args.ttl_minutes.or(settings.cache_ttl_minutes))?;
    Ok(ResourceCache::open(dir, ttl))
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}
