use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use undervalued_music_server::config::{self, DEFAULT_PORT, DEFAULT_SHARE_BASE_URL};
use undervalued_music_server::music::{add_moderated_music, NewMusic};
use undervalued_music_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use undervalued_music_server::sqlite_persistence::SqliteStore;
use undervalued_music_server::user::issue_auth_token;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing the database file (music.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Host used in share links.
    #[clap(long, default_value = DEFAULT_SHARE_BASE_URL)]
    pub share_base_url: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Adds a moderated submission to the catalog.
    AddMusic {
        #[clap(long)]
        title: String,
        #[clap(long)]
        album: String,
        #[clap(long)]
        artist: String,
        #[clap(long)]
        listen_link: Option<String>,
    },

    /// Prints a new session token for the given user, creating the user if needed.
    AddUser { user_handle: String },
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            share_base_url: args.share_base_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = config::AppConfig::resolve(&(&cli_args).into(), file_config)?;

    info!("Opening database at {:?}...", app_config.music_db_path());
    let store = Arc::new(SqliteStore::new(app_config.music_db_path())?);

    match cli_args.command {
        Some(Command::AddMusic {
            title,
            album,
            artist,
            listen_link,
        }) => {
            let id = add_moderated_music(
                store.as_ref(),
                NewMusic {
                    title,
                    album,
                    artist,
                    listen_link,
                },
            )?;
            println!("{}", id);
            Ok(())
        }
        Some(Command::AddUser { user_handle }) => {
            let token = issue_auth_token(store.as_ref(), &user_handle)?;
            println!("{}", token.0);
            Ok(())
        }
        None => run_server(ServerConfig::from(&app_config), store).await,
    }
}
