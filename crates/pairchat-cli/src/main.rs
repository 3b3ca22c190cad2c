//! pairchat: anonymous two-party chat client.
//!
//! Both partners run `pairchat chat` with the same secret code; the pairing
//! server matches them and relays messages, typing presence and photos.

mod commands;
mod config;
mod image;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::commands::chat::ChatOptions;

/// pairchat: anonymous chat paired by a shared secret code
#[derive(Parser)]
#[command(name = "pairchat", version, about = "Anonymous two-party chat paired by a shared secret code")]
struct Cli {
    /// Config file path
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pair with a partner and start chatting
    Chat {
        /// Secret code shared with your partner
        #[arg(short, long)]
        code: String,

        /// Your display name
        #[arg(short, long)]
        name: Option<String>,

        /// Your gender tag
        #[arg(short, long)]
        gender: Option<String>,

        /// Pairing server URL (ws:// or wss://)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Print today's secret code to share with your partner
    Code {
        /// Discard the stored code and issue a new one
        #[arg(long)]
        new: bool,

        /// Where the code is kept between runs
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the transcript.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("pairchat=debug,pairchat_cli=debug,pairchat_client=debug,pairchat_core=debug")
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("pairchat=warn,pairchat_cli=warn,pairchat_client=warn")
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config::state_dir().join("config.toml"));
    let cfg = match config::Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("pairchat: {e:#}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Chat {
            code,
            name,
            gender,
            url,
        } => {
            let defaults = &cfg.default;
            let opts = ChatOptions {
                secret_code: code,
                name: name.unwrap_or_else(|| defaults.name.clone()),
                gender: gender.unwrap_or_else(|| defaults.gender.clone()),
                server_url: url.unwrap_or_else(|| defaults.server_url.clone()),
                typing_expiry: defaults.typing_expiry(),
                max_image_kib: defaults.max_image_kib(),
            };
            commands::chat::run(opts).await
        }
        Command::Code { new, store } => {
            let store = store.unwrap_or_else(|| config::state_dir().join("secret_code.toml"));
            commands::code::run(&store, new)
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("pairchat: {e:#}");
        std::process::exit(1);
    }
}
