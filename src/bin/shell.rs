//! keytransform Shell Binary
//!
//! Line-oriented shell over an in-memory store mounted under a namespace.
//! `raw` shows the physical keys the child store actually holds.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use keytransform::datastore::disk_usage;
use keytransform::{Config, Datastore, Key, MapDatastore, Order, Query, TransformingStore};
use tracing_subscriber::{fmt, EnvFilter};

/// keytransform Shell
#[derive(Parser, Debug)]
#[command(name = "keytransform-shell")]
#[command(about = "Interactive shell over a namespaced in-memory datastore")]
#[command(version)]
struct Args {
    /// Namespace every key is mounted under
    #[arg(short, long, default_value = "/")]
    namespace: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = keytransform::config::DEFAULT_LOG_FILTER)]
    log_filter: String,
}

/// One shell line
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Store a value
    Put { key: String, value: String },

    /// Fetch a value
    Get { key: String },

    /// Check whether a key exists
    Has { key: String },

    /// Size of a value in bytes
    Size { key: String },

    /// Delete a key
    Del { key: String },

    /// List entries beneath a prefix
    Query {
        #[arg(default_value = "/")]
        prefix: String,

        /// Order by key descending
        #[arg(long)]
        desc: bool,

        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(long, default_value = "0")]
        limit: usize,
    },

    /// List the physical keys held by the child store
    Raw,

    /// Sync everything beneath a prefix
    Sync {
        #[arg(default_value = "/")]
        prefix: String,
    },

    /// Bytes used by the child store
    Usage,

    /// Leave the shell
    Quit,
}

fn main() {
    let args = Args::parse();

    let config = Config::builder()
        .namespace(&args.namespace)
        .log_filter(&args.log_filter)
        .build();

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let transform = match config.prefix_transform() {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("keytransform shell v{}", keytransform::VERSION);
    tracing::info!("Namespace: {}", transform.prefix);

    let child = Arc::new(MapDatastore::new());
    let store = TransformingStore::new(Arc::clone(&child), transform);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let command = match Line::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if matches!(command, ShellCommand::Quit) {
            break;
        }

        if let Err(e) = execute(&store, &child, command) {
            println!("error: {e}");
        }
    }

    if let Err(e) = store.close() {
        tracing::error!("Failed to close store: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Shell stopped");
}

/// Run one command against the namespaced store
fn execute(
    store: &TransformingStore<Arc<MapDatastore>>,
    child: &MapDatastore,
    command: ShellCommand,
) -> keytransform::Result<()> {
    match command {
        ShellCommand::Put { key, value } => {
            store.put(&Key::new(key), value.into())?;
            println!("OK");
        }
        ShellCommand::Get { key } => {
            let value = store.get(&Key::new(key))?;
            println!("{}", String::from_utf8_lossy(&value));
        }
        ShellCommand::Has { key } => {
            println!("{}", store.has(&Key::new(key))?);
        }
        ShellCommand::Size { key } => {
            println!("{}", store.get_size(&Key::new(key))?);
        }
        ShellCommand::Del { key } => {
            store.delete(&Key::new(key))?;
            println!("OK");
        }
        ShellCommand::Query {
            prefix,
            desc,
            offset,
            limit,
        } => {
            let query = Query {
                prefix: Key::new(prefix),
                orders: vec![if desc { Order::ByKeyDescending } else { Order::ByKey }],
                offset,
                limit,
                ..Query::default()
            };
            for entry in store.query(&query)?.rest()? {
                println!("{} = {}", entry.key, String::from_utf8_lossy(&entry.value));
            }
        }
        ShellCommand::Raw => {
            for key in child.keys() {
                println!("{key}");
            }
        }
        ShellCommand::Sync { prefix } => {
            store.sync(&Key::new(prefix))?;
            println!("OK");
        }
        ShellCommand::Usage => {
            println!("{} bytes", disk_usage(store)?);
        }
        ShellCommand::Quit => {}
    }
    Ok(())
}
