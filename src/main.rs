mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "warden",
    version,
    about = "Warden — prompt risk analysis and moderation pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a prompt and print the result.
    Analyze {
        /// The prompt to analyze.
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,

        /// Override the configured block threshold (0-100) for this call.
        #[arg(short, long)]
        threshold: Option<u8>,

        /// Skip recording the result to the flagged store.
        #[arg(long)]
        no_record: bool,
    },
    /// Inspect or clear the flagged-prompt store.
    Flagged {
        #[command(subcommand)]
        action: FlaggedAction,
    },
    /// Show configuration and store status.
    Status,
}

#[derive(Subcommand)]
enum FlaggedAction {
    /// List all flagged prompts, newest first.
    List,
    /// Irreversibly delete all flagged prompts.
    Clear {
        /// Required confirmation — clearing cannot be undone.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cfg = warden_core::config::load(&cli.config)?;

    match cli.command {
        Commands::Analyze {
            prompt,
            threshold,
            no_record,
        } => {
            if prompt.is_empty() {
                anyhow::bail!("no prompt provided. Usage: warden analyze <prompt>");
            }
            let prompt = prompt.join(" ");
            commands::analyze(&cfg, &prompt, threshold, no_record).await?;
        }
        Commands::Flagged { action } => match action {
            FlaggedAction::List => commands::flagged_list(&cfg).await?,
            FlaggedAction::Clear { yes } => commands::flagged_clear(&cfg, yes).await?,
        },
        Commands::Status => commands::status(&cli.config, &cfg).await,
    }

    Ok(())
}
