//! `pairchat chat`: pair with a partner and chat in the terminal.
//!
//! Lines typed on stdin are sent as chat messages; lines starting with `/`
//! are commands (see `/help`). Snapshots from the runtime are rendered to
//! stdout as they arrive.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use pairchat_client::{ChatCommand, ChatHandle, ChatRuntime, ClientConfig};
use pairchat_core::Session;

use crate::image::load_data_url;
use crate::render::Renderer;

const HELP: &str = "\
commands:
  /image <path>          send a photo
  /request               ask your partner for a photo
  /fulfill <id> <path>   answer a photo request
  /typing                show your partner that you are typing
  /new                   leave this partner and pair again
  /quit                  leave and exit";

/// Everything needed to start a chat.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub secret_code: String,
    pub name: String,
    pub gender: String,
    pub server_url: String,
    pub typing_expiry: Duration,
    pub max_image_kib: Option<u64>,
}

/// One parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Send(ChatCommand),
    Image(PathBuf),
    Fulfill { id: String, path: PathBuf },
    Help,
    Quit,
    Unknown(String),
    Empty,
}

fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Input::Send(ChatCommand::SendText(line.to_string()));
    };

    let mut parts = rest.splitn(3, char::is_whitespace);
    match (parts.next(), parts.next(), parts.next()) {
        (Some("quit" | "leave"), None, None) => Input::Quit,
        (Some("new"), None, None) => Input::Send(ChatCommand::NewPairing),
        (Some("request"), None, None) => Input::Send(ChatCommand::RequestPhoto),
        (Some("typing"), None, None) => Input::Send(ChatCommand::SetTyping(true)),
        (Some("help"), None, None) => Input::Help,
        (Some("image"), Some(path), extra) => {
            let path = match extra {
                Some(extra) => format!("{path} {extra}"),
                None => path.to_string(),
            };
            Input::Image(PathBuf::from(path))
        }
        (Some("fulfill"), Some(id), Some(path)) => Input::Fulfill {
            id: id.to_string(),
            path: PathBuf::from(path.trim()),
        },
        _ => Input::Unknown(trimmed.to_string()),
    }
}

/// Run an interactive chat until the user quits or stdin closes.
pub async fn run(opts: ChatOptions) -> Result<()> {
    let session = Session::new(opts.secret_code, opts.name, opts.gender);
    let config = ClientConfig {
        server_url: opts.server_url,
        typing_expiry: opts.typing_expiry,
    };
    info!(server = %config.server_url, "starting chat");

    let handle = ChatRuntime::spawn(config, session).context("cannot start chat")?;

    let mut snapshots = handle.snapshots();
    let printer = tokio::spawn(async move {
        let mut renderer = Renderer::new();
        loop {
            let lines = renderer.render(&snapshots.borrow_and_update());
            for line in lines {
                println!("{line}");
            }
            if snapshots.changed().await.is_err() {
                break;
            }
        }
    });

    println!("type a message and press enter, /help for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_line(&line) {
            Input::Send(command) => {
                let was_text = matches!(command, ChatCommand::SendText(_));
                handle.send(command).await?;
                if was_text {
                    handle.send(ChatCommand::SetTyping(false)).await?;
                }
            }
            Input::Image(path) => match load_data_url(&path, opts.max_image_kib) {
                Ok(image) => handle.send(ChatCommand::SendImage(image)).await?,
                Err(e) => eprintln!("pairchat: {e:#}"),
            },
            Input::Fulfill { id, path } => match load_data_url(&path, opts.max_image_kib) {
                Ok(image) => handle.send(ChatCommand::FulfillPhoto { id, image }).await?,
                Err(e) => eprintln!("pairchat: {e:#}"),
            },
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Unknown(input) => eprintln!("pairchat: unknown command {input}, try /help"),
            Input::Empty => {}
        }
    }

    shutdown(handle).await;
    if let Err(e) = printer.await {
        warn!("transcript printer failed: {}", e);
    }
    Ok(())
}

async fn shutdown(handle: ChatHandle) {
    // The runtime may already be gone; leaving twice is harmless.
    let _ = handle.send(ChatCommand::Leave).await;
    handle.join().await;
}
