use clap::{Parser, Subcommand};
use sedusa_core::DEFAULT_OVERLAP;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sedusa", version, about = "Sedusa haptic story CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a story session (reads pause/resume/stop/status from stdin)
    Run(commands::run::RunArgs),
    /// Compile a pattern and print its segments as JSON
    Compile {
        /// Pattern name
        pattern: String,
        /// Overlap between combo sub-segments (0.0 - 0.95)
        #[arg(long, default_value_t = DEFAULT_OVERLAP)]
        overlap: f64,
    },
    /// Print the act timeline for a session length
    Timeline {
        /// Session length in minutes
        #[arg(long, default_value_t = 10)]
        length: u32,
    },
    /// List loaded patterns
    Patterns {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Compile { pattern, overlap } => commands::compile::run(&pattern, overlap),
        Commands::Timeline { length } => commands::timeline::run(length),
        Commands::Patterns { json } => commands::patterns::run(json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
