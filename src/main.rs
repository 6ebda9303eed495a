use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use carte_gateway::voice::SpeechToText;
use carte_gateway::{Catalog, Config, Daemon};

/// Carte - Voice-driven menu assistant gateway for restaurants
#[derive(Parser)]
#[command(name = "carte", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "CARTE_PORT", default_value = "8790")]
    port: u16,

    /// Path to the menu catalog document (JSON)
    #[arg(short, long, env = "CARTE_MENU")]
    menu: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (text-only turns)
    #[arg(long, env = "CARTE_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a summary of the loaded menu catalog
    ShowMenu,
    /// Run the intent payload parser on a raw model reply
    TestParse {
        /// Raw text as the model produced it
        raw: String,
    },
    /// Transcribe a local audio file through the configured STT backend
    TestTranscribe {
        /// Path to a WAV file
        file: PathBuf,
        /// Language hint (e.g. "fr")
        #[arg(short, long)]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,carte_gateway=info",
        1 => "info,carte_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::ShowMenu => show_menu(cli.menu.as_deref()),
            Command::TestParse { raw } => test_parse(&raw),
            Command::TestTranscribe { file, language } => {
                test_transcribe(&file, language.as_deref()).await
            }
        };
    }

    tracing::info!(
        port = cli.port,
        disable_voice = cli.disable_voice,
        "starting carte gateway"
    );

    let mut config = Config::load_with_options(cli.disable_voice)?;
    if cli.menu.is_some() {
        config.menu_path = cli.menu;
    }

    let daemon = Daemon::new(&config, cli.port)?;
    daemon.run().await?;

    Ok(())
}

/// Print a summary of the loaded catalog
fn show_menu(menu: Option<&std::path::Path>) -> anyhow::Result<()> {
    let catalog = match menu {
        Some(path) => Catalog::load(path)?,
        None => Catalog::embedded()?,
    };

    println!(
        "{} — {} categories, {} items\n",
        catalog.restaurant.name,
        catalog.categories.len(),
        catalog.item_count()
    );

    for (key, info) in &catalog.categories {
        println!("[{key}] {}", info.name);
        for item in catalog.items_in(key) {
            println!(
                "  {:>3}  {} — {:.2} {}",
                item.id, item.name, item.price, catalog.restaurant.currency
            );
        }
    }

    Ok(())
}

/// Run the payload parser on a raw string and print the outcome
fn test_parse(raw: &str) -> anyhow::Result<()> {
    let parsed = carte_gateway::intent::parse(raw);

    println!("reply: {}", parsed.reply);
    match parsed.action {
        Some(action) => println!("action: {action:#?}"),
        None => println!("action: none (text-only fallback)"),
    }

    Ok(())
}

/// Send a local audio file through the configured STT backend
async fn test_transcribe(file: &std::path::Path, language: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let stt = SpeechToText::from_config(&config.voice, &config.api_keys, config.request_timeout)?
        .ok_or_else(|| anyhow::anyhow!("no STT backend configured (set OPENAI_API_KEY or DEEPGRAM_API_KEY)"))?;

    let audio = std::fs::read(file)?;
    println!("Transcribing {} ({} bytes)...", file.display(), audio.len());

    let language = language.map(String::from).or(config.language);
    let transcription = stt.transcribe(&audio, language.as_deref()).await?;

    if transcription.is_speech() {
        println!("text: {}", transcription.text);
        if let Some(lang) = transcription.language {
            println!("language: {lang}");
        }
    } else {
        println!("no speech detected");
    }

    Ok(())
}
