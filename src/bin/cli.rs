//! DonnyDB CLI Client
//!
//! Command-line interface for interacting with a DonnyDB server.

use std::time::Duration;

use clap::{Parser, Subcommand};
use donnydb::{Client, ClientConfig, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// DonnyDB CLI
#[derive(Parser, Debug)]
#[command(name = "donnydb-cli")]
#[command(about = "CLI for the DonnyDB key-value store")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "1337")]
    port: u16,

    /// Per-read response deadline in milliseconds
    #[arg(short, long, default_value = "300")]
    timeout_ms: u64,

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

    /// Write 10 keys, then read back 100 and print each value length
    Demo,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,donnydb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .host(&args.host)
        .port(args.port)
        .read_timeout(Duration::from_millis(args.timeout_ms))
        .build();

    if let Err(e) = run(config, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: ClientConfig, command: Commands) -> Result<()> {
    let client = Client::open(config)?;

    let result = match command {
        Commands::Get { key } => client.get(&key).map(|value| {
            println!("{}", String::from_utf8_lossy(&value));
        }),
        Commands::Set { key, value } => client.set(&key, value.as_bytes()).map(|ok| {
            println!("{}", if ok { "OK" } else { "FAILED" });
        }),
        Commands::Demo => demo(&client),
    };

    // Close even if the command failed, but report the command's error first
    let closed = client.close();
    result.and(closed)
}

fn demo(client: &Client) -> Result<()> {
    for i in 0..10 {
        let value = format!("value {}", i).repeat(i + 1);
        client.set(&format!("key {}", i), value.as_bytes())?;
    }

    for i in 0..100 {
        let value = client.get(&format!("key {}", i))?;
        println!("for \"key {}\" value is {} bytes long", i, value.len());
    }

    Ok(())
}
