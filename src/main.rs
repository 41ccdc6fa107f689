//! Concise CLI - AI-powered text and article summarisation
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{Parser, Subcommand};
use colored::Colorize;
use concise::client::{ApiClient, SummarizeApi};
use concise::controller::Settlement;
use concise::{reveal, ui, Config};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "concise")]
#[command(author, version, about = "TUI for AI-powered text and article summarisation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a block of text
    Text {
        /// Text to summarize
        text: String,
        /// Maximum summary length
        #[arg(long)]
        max_length: Option<u32>,
        /// Print the summary at once instead of typing it out
        #[arg(long)]
        plain: bool,
    },
    /// Summarise a web article by URL
    Url {
        /// URL of the article to summarize
        url: String,
        /// Print the summary at once instead of typing it out
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Some(Commands::Text {
            text,
            max_length,
            plain,
        }) => {
            let client = ApiClient::new(&config.service.base_url, config.timeout())?;
            let max_length = max_length.unwrap_or(config.summarize.max_length);

            let settlement =
                Settlement::from_text_response(client.summarize_text(&text, max_length).await);
            print_settlement(settlement, plain, &config).await?;
        }
        Some(Commands::Url { url, plain }) => {
            let client = ApiClient::new(&config.service.base_url, config.timeout())?;

            let settlement = Settlement::from_url_response(client.summarize_url(&url).await);
            print_settlement(settlement, plain, &config).await?;
        }
        None => {
            // Default: Launch the TUI
            ui::run(config).await?;
        }
    }

    Ok(())
}

/// Print a settled request, typing the summary out unless asked not to
async fn print_settlement(
    settlement: Settlement,
    plain: bool,
    config: &Config,
) -> anyhow::Result<()> {
    match settlement {
        Settlement::Succeeded(summary) => {
            println!("{}\n", "✨ Summary".bold());
            if plain || !atty::is(atty::Stream::Stdout) {
                println!("{summary}");
            } else {
                let mut stdout = std::io::stdout();
                reveal::type_out(&mut stdout, &summary, config.reveal_interval()).await?;
            }
            Ok(())
        }
        Settlement::Failed(message) => anyhow::bail!("{}", message.red()),
    }
}
