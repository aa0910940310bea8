use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use simple_chat::app::App;
use simple_chat::tui::{self, EventHandler, Tui};
use simple_chat::{handler, ui, ChatWidget, Config, ResponseMode};

#[derive(Parser)]
#[command(name = "simple-chat")]
#[command(about = "Chat with a simulated or remote bot from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use the local simulated bot instead of the remote service
    #[arg(long, global = true)]
    local: bool,

    /// Remote chat service URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Delay before the simulated bot answers, in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the transcript
    Ask {
        /// Message to send
        text: String,
        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };

    if let Some(Commands::Init) = cli.command {
        return init_config(&config_path);
    }

    let config = load_config(&cli, &config_path)?;
    let responder = config.responder()?;
    tracing::info!(responder = %responder.display_name(), "Starting");

    match cli.command {
        Some(Commands::Ask { text, json }) => ask(ChatWidget::new(responder), &text, json).await,
        _ => {
            let mut widget = ChatWidget::new(responder);
            if let Some(greeting) = &config.greeting {
                widget = widget.with_greeting(greeting.clone());
            }
            run_tui(widget).await
        }
    }
}

/// File, then environment, then command line
fn load_config(cli: &Cli, path: &Path) -> Result<Config> {
    let mut config = Config::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env();

    if cli.local {
        config.mode = ResponseMode::Local;
    }
    if let Some(url) = &cli.url {
        config.service_url = url.clone();
        if !cli.local {
            config.mode = ResponseMode::Remote;
        }
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.simulated_delay_ms = delay_ms;
    }

    Ok(config)
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Config::default()
        .save_to(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

async fn ask(mut widget: ChatWidget, text: &str, json: bool) -> Result<()> {
    widget.set_draft(text);
    if !widget.submit() {
        bail!("Nothing to send: the message is empty");
    }

    let outcome = widget.settle().await;

    if json {
        println!("{}", serde_json::to_string_pretty(widget.messages())?);
    } else {
        for msg in widget.messages() {
            println!("{} {}", msg.role.label(), msg.text);
        }
    }

    if let Some(Err(e)) = outcome {
        return Err(e).context("The bot failed to respond");
    }
    Ok(())
}

async fn run_tui(widget: ChatWidget) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(widget);
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event),
            Some(reply) = app.widget.next_reply() => {
                let outcome = app.widget.apply_reply(reply);
                app.on_reply(outcome);
            }
            else => break,
        }
    }

    app.quit();
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match open_log_file() {
        Some((log_path, file)) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %log_path.display(), "Logging initialized");
        }
        // No log file: drop logs rather than draw over the TUI
        None => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn open_log_file() -> Option<(PathBuf, fs::File)> {
    let mut candidates = Vec::new();
    if let Ok(dir) = Config::dir() {
        candidates.push(dir.join("logs").join("simple-chat.log"));
    }
    candidates.push(PathBuf::from(".simple-chat").join("logs").join("simple-chat.log"));

    candidates.into_iter().find_map(|candidate| {
        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
            .ok()?;
        Some((candidate, file))
    })
}
