use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod api;
mod commands;
mod logging;
mod output;
mod scheduler;
#[cfg(test)]
mod test_support;

use commands::serve::ServeOptions;

#[derive(Parser)]
#[command(name = "seasonwatch")]
#[command(about = "Seasonwatch - Get told when the next season of a show is announced")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Path to the config file (defaults to $SEASONWATCH_CONFIG or the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API with the recurring check
    #[command(long_about = "Serve the HTTP API and re-check every tracked season on the configured cron schedule. Stops gracefully on SIGINT or SIGTERM.")]
    Serve {
        /// Cron schedule expression (e.g., '0 9 * * *' for daily at 09:00)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Serve the API without the recurring check
        #[arg(long, action = ArgAction::SetTrue)]
        no_scheduler: bool,

        /// Run one check right after startup
        #[arg(long, action = ArgAction::SetTrue)]
        check_on_startup: bool,

        /// Write logs to this file, rotated daily, instead of stderr
        #[arg(long, value_name = "FILE")]
        log_file: Option<PathBuf>,
    },
    /// Start tracking a season
    #[command(long_about = "Fetch the season's episode listing and start tracking it. Seasons that are already announced are reported and not stored.")]
    Add {
        /// IMDb title id of the show (e.g., tt0944947)
        show_id: String,

        /// Season number
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        season: u32,
    },
    /// List tracked seasons
    List,
    /// Re-check every tracked season once
    Check,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration, including environment overrides
    Show,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve { log_file, .. } => log_file.clone(),
        _ => None,
    };
    logging::init_logging(cli.verbose, cli.quiet, log_file.as_deref())?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_file = commands::config_path(cli.config.clone());
    let config = commands::load_config(Some(config_file.clone()))?;

    let result = match cli.command {
        Commands::Serve {
            schedule,
            no_scheduler,
            check_on_startup,
            log_file: _,
        } => {
            let options = ServeOptions {
                schedule,
                no_scheduler,
                check_on_startup,
            };
            commands::serve::run_serve(config, options, &output).await
        }
        Commands::Add { show_id, season } => commands::series::run_add(&config, &show_id, season, &output).await,
        Commands::List => commands::series::run_list(&config, &output).await,
        Commands::Check => commands::series::run_check(&config, &output).await,
        Commands::Config { cmd: ConfigCommands::Show } => {
            commands::config::show_config(&config, &config_file, &output)
        }
    };

    // Human mode gets the full color-eyre report; JSON modes stay machine readable
    if let (Err(e), false) = (&result, output.format() == output::OutputFormat::Human) {
        output.error(format!("{:#}", e));
        std::process::exit(1);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_rejects_season_zero() {
        assert!(Cli::try_parse_from(["seasonwatch", "add", "tt1", "0"]).is_err());
        let cli = Cli::try_parse_from(["seasonwatch", "add", "tt1", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Add { ref show_id, season: 3 } if show_id == "tt1"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["seasonwatch", "list", "--output", "json", "-vv"]).unwrap();
        assert_eq!(cli.output, output::OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }
}
