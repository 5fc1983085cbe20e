use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use parley::core::config::{self, ResolvedConfig};
use parley::core::state::App;
use parley::core::turn::{TurnOutcome, run_turn};
use parley::inference::GeminiProvider;
use parley::tui;

#[derive(Parser)]
#[command(name = "parley", about = "Chat with Gemini from the terminal")]
struct Args {
    /// Config file (default: ~/.parley/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gemini model, e.g. gemini-2.0-flash
    #[arg(short, long)]
    model: Option<String>,

    /// Send one message, print the rendered HTML reply, and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Write the conversation as HTML to this file on exit
    #[arg(short, long)]
    transcript: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> io::Result<ExitCode> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Log to parley.log in the working directory; stdout belongs to the UI.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("parley.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config(args.config.as_deref()).map_err(io::Error::other)?;
    let resolved = config::resolve(&file_config, args.model.as_deref());
    log::info!(
        "parley starting up with model: {} (timeout {}s)",
        resolved.model_name,
        resolved.request_timeout_secs
    );

    let app = build_app(&resolved)?;

    match args.prompt {
        Some(prompt) => one_shot(app, &prompt).await,
        None => tui::run(app, args.transcript).map(|()| ExitCode::SUCCESS),
    }
}

fn build_app(config: &ResolvedConfig) -> io::Result<App> {
    let api_key = config.require_api_key().map_err(io::Error::other)?;
    let provider = GeminiProvider::new(
        api_key.to_string(),
        Some(config.gemini_base_url.clone()),
    );
    Ok(App::from_config(Arc::new(provider), config))
}

/// One turn without the TUI; the reply's HTML goes to stdout.
async fn one_shot(mut app: App, prompt: &str) -> io::Result<ExitCode> {
    let outcome = run_turn(&mut app, prompt).await;
    log::info!("One-shot turn finished: {:?}", outcome);

    match outcome {
        TurnOutcome::Ignored => {
            eprintln!("Nothing to send: the prompt is empty.");
            Ok(ExitCode::from(2))
        }
        TurnOutcome::Completed | TurnOutcome::Failed | TurnOutcome::Rejected => {
            if let Some(entry) = app.conversation.last() {
                println!("{}", entry.content);
            }
            Ok(if outcome == TurnOutcome::Completed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
