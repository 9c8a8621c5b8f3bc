//! LexiTalk - Dyslexia practice in the terminal
//!
//! Talks to a practice server, plays its speech and optionally listens for
//! spoken answers.

use anyhow::Result;
use clap::Parser;
use lexitalk::audio;
use lexitalk::capture;
use lexitalk::client::{HttpPracticeClient, PracticeServer};
use lexitalk::config::Config;
use lexitalk::frontend::{self, TerminalPresenter};
use lexitalk::runtime::Runtime;
use lexitalk::session::Event;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Practice server base URL
    #[arg(short, long)]
    server: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Do not play server speech
    #[arg(long)]
    no_audio: bool,

    /// Do not use the microphone
    #[arg(long)]
    no_mic: bool,

    /// Read configuration from this file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if args.no_audio {
        config.audio_enabled = false;
    }
    if args.no_mic {
        config.dictation_enabled = false;
    }

    // Logs go to stderr so they never interleave with the conversation
    let level = if args.verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("📖 LexiTalk v{} starting...", env!("CARGO_PKG_VERSION"));

    let client = HttpPracticeClient::new(&config)?;
    if let Err(e) = client.open_session().await {
        warn!("⚠️ Could not reach practice server: {}", e);
    }

    let player = audio::create_player(&config, client.http());
    let runtime = Runtime::new(Arc::new(client), player, |sink| capture::detect(&config, sink))
        .with_presenter(Box::new(TerminalPresenter::new(std::io::stdout())));

    println!("{}", frontend::HELP);

    let events = runtime.sender();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match frontend::parse_line(&line) {
                    Some(parsed) => {
                        for event in parsed {
                            if events.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    None => println!("{}", frontend::HELP),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!("Error reading input: {}", e);
                    break;
                }
            }
        }
        let _ = events.send(Event::Quit);
    });

    runtime.run().await;
    Ok(())
}
