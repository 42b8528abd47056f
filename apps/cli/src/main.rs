//! ZBooks CLI - command-line interface for the ZBooks accounting backend
//!
//! This CLI provides a `zbooks` command for managing the authenticated
//! session (login, OTP, logout) and the user's organizations. The session
//! token pair is persisted under `~/.zbooks/` so it survives between
//! invocations, with the same transparent refresh-on-401 behavior the web
//! client has.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use zbooks_client::{ApiClient, ClientConfig, FileSessionStore, SessionStore};

use commands::{auth, org};
use commands::{OrgCommand, OtpCommand};

/// ZBooks CLI - session and organization management
#[derive(Parser, Debug)]
#[command(
    name = "zbooks",
    author,
    version,
    about = "ZBooks - small-business accounting client",
    long_about = "Command-line client for the ZBooks accounting backend.\nManages the authenticated session and the user's organizations."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// API base URL (overrides ZBOOKS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with email and password
    ///
    /// Prompts for the password; stores the issued token pair under
    /// ~/.zbooks/ for subsequent commands.
    Login {
        /// Login email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Register a new account and log in
    Register(auth::RegisterArgs),

    /// Log out and clear the stored session
    Logout,

    /// Show the authenticated user profile
    Whoami {
        /// Print the raw profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// One-time passcode login
    #[command(subcommand)]
    Otp(OtpCommand),

    /// Organization management
    #[command(subcommand)]
    Org(OrgCommand),
}

/// Session directory: `$ZBOOKS_HOME`, else `~/.zbooks`.
fn session_dir() -> PathBuf {
    if let Ok(home) = std::env::var("ZBOOKS_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".zbooks")
}

fn build_client(api_url: Option<String>) -> anyhow::Result<Arc<ApiClient>> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = api_url {
        config = config.with_base_url(url);
    }

    let store = Arc::new(FileSessionStore::new(&session_dir())?) as Arc<dyn SessionStore>;
    Ok(Arc::new(ApiClient::new(config, store)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client = build_client(args.api_url)?;

    match args.command {
        Command::Login { email } => auth::login(&client, email).await,
        Command::Register(register_args) => auth::register(&client, register_args).await,
        Command::Logout => auth::logout(&client).await,
        Command::Whoami { json } => auth::whoami(&client, json).await,
        Command::Otp(command) => auth::otp(&client, command).await,
        Command::Org(command) => org::execute(&client, command).await,
    }
}
