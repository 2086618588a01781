use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "powerstreak", version, about = "Daily check-in streaks with escalating rewards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check in for today
    Checkin {
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Current streak, gate state and next milestones
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Upcoming rewards
    Preview {
        /// Number of days to show
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// This week's check-in calendar
    Calendar,
    /// Badge catalog with progress
    Badges,
    /// Rank ladder with unlock status
    Ranks,
    /// Block until the check-in gate reopens
    Wait,
    /// Check-in history statistics
    Stats {
        /// Number of recent check-ins to list
        #[arg(long, default_value = "10")]
        recent: usize,
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("powerstreak=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Checkin { json } => commands::checkin::run(json).await,
        Commands::Status { json } => commands::status::run(json).await,
        Commands::Preview { days } => commands::preview::run(days).await,
        Commands::Calendar => commands::calendar::run().await,
        Commands::Badges => commands::badges::run().await,
        Commands::Ranks => commands::ranks::run().await,
        Commands::Wait => commands::wait::run().await,
        Commands::Stats { recent, json } => commands::stats::run(recent, json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "powerstreak", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
