use clap::{CommandFactory, Parser, Subcommand};
use habitstreak_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitstreak", version, about = "Habit streak and statistics CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current and longest streak for one habit
    Streak(commands::streak::StreakArgs),
    /// Completion rate over a date window
    Rate(commands::rate::RateArgs),
    /// Statistics report for one habit
    Stats(commands::stats::StatsArgs),
    /// Dashboard summary for one habit, with recomputed streak fields
    Summary(commands::summary::SummaryArgs),
    /// Cross-habit overview
    Overview(commands::overview::OverviewArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let result = match cli.command {
        Commands::Streak(args) => commands::streak::run(args, &config),
        Commands::Rate(args) => commands::rate::run(args, &config),
        Commands::Stats(args) => commands::stats::run(args, &config),
        Commands::Summary(args) => commands::summary::run(args, &config),
        Commands::Overview(args) => commands::overview::run(args, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "habitstreak", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
