//! Speak L2 CLI
//!
//! Interactive practice session against a local Ollama model. Typed lines are
//! chat turns; `/audio <file>` replies to a recording; replies are also spoken
//! into an audio file whose path is printed after each turn. Only the latest
//! reply file is kept, and it is removed when the session ends.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod command;
mod render;
mod reply;
mod session;

use std::{io::Write, path::PathBuf};

use ai_speech::ShutdownGuard;
use anyhow::Context;
use application::{ChatOrchestrator, ModelSelection, TurnInput};
use clap::Parser;
use domain::Language;
use infrastructure::{AppConfig, build_orchestrator, init_tracing};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use command::{Command, HELP};
use reply::ReplyAudio;
use session::SessionSettings;

/// Speak L2 CLI
#[derive(Parser)]
#[command(name = "speak-l2")]
#[command(author, version, about = "Practice speaking a second language with a local model", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to start with instead of the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Practice language (ja or en)
    #[arg(short, long)]
    lang: Option<Language>,

    /// Start with language-teacher mode off
    #[arg(long)]
    no_teacher: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config.telemetry, cli.verbose)?;

    // Removes leftover intermediate audio when main returns
    let _artifacts = ShutdownGuard::global();

    let orchestrator = build_orchestrator(&config)?;
    let mut settings = SessionSettings::from_config(&config)?;
    if let Some(language) = cli.lang {
        settings.language = language;
    }
    settings.teacher_mode = !cli.no_teacher;

    if !orchestrator.is_backend_healthy().await {
        eprintln!(
            "⚠️  Ollama is not reachable at {}. Start it with `ollama serve`.",
            config.inference.base_url
        );
    }

    let requested = cli.model.as_deref().unwrap_or(&settings.model).to_string();
    let selection = orchestrator.select_model(Some(&requested)).await;
    if let ModelSelection::Fallback { .. } = &selection {
        eprintln!("⚠️  Using {selection}");
    }
    settings.model = selection.into_name();

    println!("🗣️  Speak L2 {}", env!("CARGO_PKG_VERSION"));
    println!("   {}", settings.summary());
    println!("   Type a message, /help for commands, /quit to exit.");

    run_repl(&orchestrator, &mut settings).await?;

    info!("Session ended");
    Ok(())
}

async fn run_repl(
    orchestrator: &ChatOrchestrator,
    settings: &mut SessionSettings,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut replies = ReplyAudio::new();

    loop {
        print!("\n{}> ", settings.language);
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match Command::parse(&line) {
            Ok(None) => {},
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => handle(orchestrator, settings, &mut replies, command).await,
            Err(e) => eprintln!("❌ {e}"),
        }
    }

    Ok(())
}

async fn handle(
    orchestrator: &ChatOrchestrator,
    settings: &mut SessionSettings,
    replies: &mut ReplyAudio,
    command: Command,
) {
    debug!(?command, "Handling command");

    match command {
        Command::Say(text) => {
            let outcome = orchestrator
                .run_turn(settings.request(TurnInput::Text(text)))
                .await;
            println!("{}", render::outcome(&outcome, false));
            replies.replace(outcome.audio);
        },
        Command::Audio(path) => {
            let outcome = orchestrator
                .run_turn(settings.request(TurnInput::Audio(path)))
                .await;
            println!("{}", render::outcome(&outcome, true));
            replies.replace(outcome.audio);
        },
        Command::Models => {
            let models = orchestrator.list_models().await;
            println!("📦 Installed models:\n{}", render::models(&models, &settings.model));
        },
        Command::Model(name) => {
            let models = orchestrator.list_models().await;
            if !models.is_empty() && !models.contains(&name) {
                eprintln!("⚠️  {name} is not installed; requests will fail until it is pulled");
            }
            settings.model = name;
            println!("✅ Model: {}", settings.model);
        },
        Command::Teacher(on) => {
            settings.teacher_mode = on;
            println!("✅ Teacher mode {}", if on { "on" } else { "off" });
        },
        Command::Lang(language) => {
            settings.language = language;
            println!("✅ Practicing {}", language.display_name());
        },
        Command::Speed(speed) => report(settings.set_speed(speed), || format!("Speed {speed}")),
        Command::Temperature(t) => {
            report(settings.set_temperature(t), || format!("Temperature {t}"));
        },
        Command::MaxTokens(n) => report(settings.set_max_tokens(n), || format!("Max tokens {n}")),
        Command::Reset => {
            orchestrator.reset().await;
            println!("🧹 Conversation cleared");
        },
        Command::History => println!("{}", render::history(&orchestrator.history().await)),
        Command::Help => println!("{HELP}"),
        Command::Quit => {},
    }
}

fn report(result: Result<(), String>, success: impl FnOnce() -> String) {
    match result {
        Ok(()) => println!("✅ {}", success()),
        Err(e) => eprintln!("❌ {e}"),
    }
}
