use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::Result;

use anime_track_config::{Config, PathManager};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "tsugi")]
#[command(about = "Tsugi - track your anime progress and never miss a new episode")]
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

    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Acting user id (defaults to $TSUGI_USER_ID)
    #[arg(short, long, global = true)]
    user: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the episode-notification scheduler
    #[command(long_about = "Run the background scheduler that periodically compares tracked entries against the catalog's airing data and announces newly aired episodes.")]
    Daemon {
        /// Seconds between reconciliation ticks (overrides config)
        #[arg(long, value_name = "SECONDS")]
        interval: Option<u64>,

        /// Run a single tick and exit
        #[arg(long, action = ArgAction::SetTrue)]
        once: bool,
    },
    /// Create the tracking schema if it does not exist
    InitDb,
    /// Start tracking an anime (searched by name)
    Track {
        /// Search text for the catalog
        query: String,

        /// Short alias for later commands (defaults to the title's initials)
        #[arg(long)]
        alias: Option<String>,

        /// Episode you are currently on
        #[arg(long, default_value_t = 0)]
        episode: i32,
    },
    /// Record the last episode you watched
    Watched {
        /// Alias or title name
        identifier: String,
        episode: i32,
    },
    /// Change an entry's status
    Mark {
        /// Alias or title name
        identifier: String,
        /// watching, completed, want_to_watch, paused, or dropped
        status: String,
    },
    /// Rename an entry's alias
    Alias {
        /// Alias or title name
        identifier: String,
        new_alias: String,
    },
    /// Stop tracking an anime
    Untrack {
        /// Alias or title name
        identifier: String,
    },
    /// List tracked anime
    List {
        /// Only show entries with this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Show detailed progress and next-airing info for one entry
    Progress {
        /// Alias or title name
        identifier: String,
    },
    /// Search the catalog
    Search { query: String },
    /// Browse a season's catalog
    Seasonal {
        /// winter, spring, summer, or fall
        season: String,
        year: i32,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 25)]
        per_page: u32,
    },
}

fn load_config(path_override: Option<PathBuf>) -> Result<Config> {
    let path = match path_override {
        Some(path) => path,
        None => PathManager::new()
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?
            .config_file(),
    };
    Config::load_or_default(&path).map_err(|e| color_eyre::eyre::eyre!("{}", e))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The daemon also logs to a daily-rotated file so unattended runs
    // keep a trail; interactive commands log to stderr only.
    let log_file = match &cli.command {
        Commands::Daemon { .. } => PathManager::new().ok().map(|p| p.log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Daemon { interval, once } => {
            commands::daemon::run_daemon(config, interval, once, &output).await
        }
        Commands::InitDb => commands::daemon::run_init_db(config, &output).await,
        Commands::Search { query } => commands::catalog::run_search(config, &query, &output).await,
        Commands::Seasonal {
            season,
            year,
            page,
            per_page,
        } => commands::catalog::run_seasonal(config, &season, year, page, per_page, &output).await,
        Commands::Track {
            query,
            alias,
            episode,
        } => {
            let user = commands::resolve_user(cli.user, &output)?;
            let ctx = commands::build_context(config).await?;
            commands::tracklist::run_track(&ctx, user, &query, alias, episode, &output).await
        }
        Commands::Watched {
            identifier,
            episode,
        } => {
            let user = commands::resolve_user(cli.user, &output)?;
            let ctx = commands::build_context(config).await?;
            commands::tracklist::run_watched(&ctx, user, &identifier, episode, &output).await
        }
        Commands::Mark { identifier, status } => {
            let user = commands::resolve_user(cli.user, &output)?;
            let ctx = commands::build_context(config).await?;
            commands::tracklist::run_mark(&ctx, user, &identifier, &status, &output).await
        }
        Commands::Alias {
            identifier,
            new_alias,
        } => {
            let user = commands::resolve_user(cli.user, &output)?;
            let ctx = commands::build_context(config).await?;
            commands::tracklist::run_alias(&ctx, user, &identifier, &new_alias, &output).await
        }
        Commands::Untrack { identifier } => {
            let user = commands::resolve_user(cli.user, &output)?;
            let ctx = commands::build_context(config).await?;
            commands::tracklist::run_untrack(&ctx, user, &identifier, &output).await
        }
        Commands::List { status } => {
            let user = commands::resolve_user(cli.user, &output)?;
            let ctx = commands::build_context(config).await?;
            commands::tracklist::run_list(&ctx, user, status, &output).await
        }
        Commands::Progress { identifier } => {
            let user = commands::resolve_user(cli.user, &output)?;
            let ctx = commands::build_context(config).await?;
            commands::tracklist::run_progress(&ctx, user, &identifier, &output).await
        }
    }
}
