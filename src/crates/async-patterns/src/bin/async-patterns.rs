//! async-patterns CLI
//!
//! Runs one pattern at a time against the simulated user lookup.

use async_patterns::config::{ConfigBuilder, ENV_PREFIX};
use async_patterns::error::format_error_chain;
use async_patterns::{
    fetch_users_parallel, fetch_users_sequential, format_user, logging, operation_with_cleanup,
    race, stream_users, with_retry, with_timeout, PatternsConfig, UserDirectory,
};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "async-patterns")]
#[command(about = "Async patterns over a simulated user lookup", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Override the simulated lookup latency in milliseconds
    #[arg(long, global = true, env = "ASYNC_PATTERNS_LOOKUP_LATENCY_MS")]
    latency_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up users one after another
    Sequential {
        /// Comma-separated user ids
        #[arg(long, value_delimiter = ',', default_value = "1,2,999")]
        ids: Vec<u64>,
    },
    /// Look up users concurrently
    Parallel {
        /// Comma-separated user ids
        #[arg(long, value_delimiter = ',', default_value = "1,2,999")]
        ids: Vec<u64>,
    },
    /// Look up one user under a deadline
    Timeout {
        id: u64,
        /// Deadline in milliseconds (defaults to the configured timeout)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Look up one user with retries and backoff
    Retry { id: u64 },
    /// Look up one user through the callback bridge
    Callback { id: u64 },
    /// Stream users, skipping ids that fail
    Stream {
        /// Comma-separated user ids
        #[arg(long, value_delimiter = ',', default_value = "1,999,2")]
        ids: Vec<u64>,
    },
    /// Race a lookup against a slower replica
    Race { first: u64, second: u64 },
    /// Acquire, use and release a resource
    Scoped {
        /// Make the main step fail
        #[arg(long)]
        fail: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PatternsConfig::from_env_with_defaults(ENV_PREFIX)?;
    if let Some(latency_ms) = cli.latency_ms {
        config.lookup_latency_ms = latency_ms;
        config.validate()?;
    }
    logging::init_logging(&config.log_filter);

    let directory = UserDirectory::from_config(&config);

    match cli.command {
        Commands::Sequential { ids } => {
            for line in fetch_users_sequential(&directory, &ids).await {
                println!("{}", line);
            }
        }
        Commands::Parallel { ids } => {
            for line in fetch_users_parallel(&directory, &ids).await {
                println!("{}", line);
            }
        }
        Commands::Timeout { id, timeout_ms } => {
            let deadline = timeout_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.default_timeout());
            match with_timeout(deadline, directory.fetch_user(id)).await {
                Ok(user) => println!("{}", format_user(&user)),
                Err(e) => eprintln!("{}", format_error_chain(&e)),
            }
        }
        Commands::Retry { id } => {
            let policy = config.retry_policy();
            match with_retry(&policy, || directory.fetch_user(id)).await {
                Ok(user) => println!("{}", format_user(&user)),
                Err(e) => eprintln!("{}", format_error_chain(&e)),
            }
        }
        Commands::Callback { id } => match directory.fetch_user_via_callback(id).await {
            Ok(user) => println!("{}", format_user(&user)),
            Err(e) => eprintln!("{}", format_error_chain(&e)),
        },
        Commands::Stream { ids } => {
            let users = stream_users(directory, ids, |id, e| eprintln!("skipped {}: {}", id, e));
            futures::pin_mut!(users);
            while let Some(user) = users.next().await {
                println!("{}", format_user(&user));
            }
        }
        Commands::Race { first, second } => {
            let replica = UserDirectory::new(directory.latency() * 2);
            match race(directory.fetch_user(first), replica.fetch_user(second)).await {
                Ok(user) => println!("{}", format_user(&user)),
                Err(e) => eprintln!("{}", format_error_chain(&e)),
            }
        }
        Commands::Scoped { fail } => match operation_with_cleanup(&config, fail).await {
            Ok(message) => println!("{}", message),
            Err(e) => eprintln!("{}", format_error_chain(&e)),
        },
    }

    Ok(())
}
