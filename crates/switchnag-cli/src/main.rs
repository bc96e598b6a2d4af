use clap::{Parser, Subcommand};

mod commands;
mod console;
mod desktop;
mod logging;

#[derive(Parser)]
#[command(name = "switchnag", version, about = "Nags you to switch tasks, takes Wi-Fi away if you don't")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder and cooldown loops with an interactive menu
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Show what a reminder looks like at a given anger level
    Preview(commands::preview::PreviewArgs),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Preview(args) => commands::preview::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
