//! QuickKV CLI
//!
//! Command-line interface over a single store file.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quickkv::keys::{self, DEFAULT_RANDOM_KEY_SIZE};
use quickkv::{Config, KvStore, QuickKvError, Stopwatch};
use tracing_subscriber::{fmt, EnvFilter};

/// QuickKV CLI
#[derive(Parser, Debug)]
#[command(name = "quickkv-cli")]
#[command(about = "CLI for the QuickKV key-value store")]
#[command(version)]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "./quickkv.db")]
    file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List keys
    Keys {
        /// Only keys starting with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Show the entries with the largest keys
    Last {
        /// Number of entries
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Show a random entry
    Random,

    /// Show the number of entries
    Size,

    /// Generate a key
    Gen {
        #[command(subcommand)]
        kind: KeyKind,
    },
}

#[derive(Subcommand, Debug)]
enum KeyKind {
    /// 12-character timestamp key
    Timestamp,

    /// 16-character route key
    Route {
        /// Route prefix, up to 4 characters
        #[arg(default_value = "")]
        route: String,
    },

    /// Random base62 key
    Random {
        /// Key length
        #[arg(default_value_t = DEFAULT_RANDOM_KEY_SIZE)]
        size: usize,
    },
}

/// Log filter used when RUST_LOG is not set
const DEFAULT_LOG_FILTER: &str = "info,quickkv=debug";

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn generate(kind: KeyKind) -> quickkv::Result<()> {
    let key = match kind {
        KeyKind::Timestamp => keys::create_timestamp_key()?.into_string(),
        KeyKind::Route { route } => keys::create_route_key(&route)?.into_string(),
        KeyKind::Random { size } => keys::create_random_key(size),
    };
    println!("{}", key);
    Ok(())
}

fn run(args: Args) -> quickkv::Result<()> {
    let command = match args.command {
        Commands::Gen { kind } => return generate(kind),
        command => command,
    };

    let config = Config::builder().default_path(&args.file).build();
    config.validate()?;
    let store = KvStore::with_config(config);

    let mut timer = Stopwatch::started("read");
    if !store.read_default() {
        tracing::info!("no readable store at {}, starting empty", args.file);
    }
    timer.stop();
    tracing::info!("{}", timer);

    match command {
        Commands::Get { key } => match store.get(&key) {
            Some(value) => println!("{}", value),
            None => println!("(not found)"),
        },
        Commands::Set { key, value } => {
            let inserted = store.set(key, value);
            println!("{}", if inserted { "inserted" } else { "updated" });
        }
        Commands::Del { key } => {
            println!("{}", if store.remove(&key) { "removed" } else { "(not found)" });
        }
        Commands::Keys { prefix } => {
            let prefix = prefix.unwrap_or_default();
            for key in store.keys_where(|k| k.starts_with(prefix.as_str())) {
                println!("{}", key);
            }
        }
        Commands::Last { count } => {
            for (key, value) in store.last(count) {
                println!("{}={}", key, value);
            }
        }
        Commands::Random => {
            let (key, value) = store.random()?;
            println!("{}={}", key, value);
        }
        Commands::Size => println!("{}", store.size()),
        Commands::Gen { kind } => return generate(kind),
    }

    write_back(&store, &args.file)
}

/// Persist the store if a command changed it
fn write_back(store: &KvStore, file: &str) -> quickkv::Result<()> {
    if !store.is_dirty() {
        return Ok(());
    }

    let mut timer = Stopwatch::started("write");
    if !store.write_default() {
        return Err(QuickKvError::Persist { path: file.into() });
    }
    timer.stop();
    tracing::info!("{}", timer);

    Ok(())
}
