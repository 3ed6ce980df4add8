//! buildtrack — drives the session gate against a live hosted backend.
//!
//! `watch` runs the full loop with an in-process navigator so redirect
//! decisions are visible as they happen; `status` is a one-shot read of the
//! completion flags plus the decided target; `login`/`logout` are session
//! plumbing for scripting.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use backend::auth::{AuthApiError, AuthClient, spawn_refresh_task};
use backend::config::{BackendConfig, ConfigError};
use backend::status::{StatusApiError, StatusClient};
use gate::decision::{GateSnapshot, decide};
use gate::providers::{AuthProvider, Navigator, ProviderError, StatusReader};
use gate::route::{Redirect, RouteGroup};
use gate::runner::{GateDeps, spawn_gate};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("auth request failed: {0}")]
    Auth(#[from] AuthApiError),
    #[error("status read failed: {0}")]
    Status(#[from] ProviderError),
    #[error("status client setup failed: {0}")]
    StatusApi(#[from] StatusApiError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "buildtrack", about = "Construction-project tracking gate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and print the session.
    Login(CredentialArgs),
    /// Fetch both completion flags and print the decided target.
    Status(StatusArgs),
    /// Run the gate loop, following redirects in-process until interrupted.
    Watch(WatchArgs),
    /// Revoke an access token.
    Logout(LogoutArgs),
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long, env = "BUILDTRACK_EMAIL")]
    email: String,

    #[arg(long, env = "BUILDTRACK_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct StatusArgs {
    #[command(flatten)]
    credentials: CredentialArgs,

    /// Route group the client currently shows.
    #[arg(long, default_value = "app")]
    current: RouteGroup,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[command(flatten)]
    credentials: CredentialArgs,

    /// Sign out after this many seconds to exercise the sign-out path.
    #[arg(long)]
    signout_after: Option<u64>,
}

#[derive(Args, Debug)]
struct LogoutArgs {
    #[arg(long, env = "BUILDTRACK_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,
}

/// In-process navigator: applies redirects to its own current-group cell so
/// the gate sees them take effect, and prints each hop.
struct ShellNavigator {
    current: Mutex<RouteGroup>,
}

impl ShellNavigator {
    fn new(initial: RouteGroup) -> Self {
        Self { current: Mutex::new(initial) }
    }
}

impl Navigator for ShellNavigator {
    fn current_route_group(&self) -> RouteGroup {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn redirect_to(&self, redirect: &Redirect) {
        match redirect.step {
            Some(step) => println!("-> {}:{step}", redirect.group),
            None => println!("-> {}", redirect.group),
        }
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = redirect.group;
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = BackendConfig::from_env()?;

    match cli.command {
        Command::Login(args) => run_login(config, args).await,
        Command::Status(args) => run_status(config, args).await,
        Command::Watch(args) => run_watch(config, args).await,
        Command::Logout(args) => run_logout(config, args).await,
    }
}

async fn run_login(config: BackendConfig, args: CredentialArgs) -> Result<(), CliError> {
    let auth = AuthClient::new(config)?;
    let session = auth.sign_in_with_password(&args.email, &args.password).await?;
    println!("signed in as {}", session.user_id);
    println!("access token: {}", session.access_token);
    Ok(())
}

async fn run_status(config: BackendConfig, args: StatusArgs) -> Result<(), CliError> {
    let auth = Arc::new(AuthClient::new(config.clone())?);
    let session = auth
        .sign_in_with_password(&args.credentials.email, &args.credentials.password)
        .await?;
    let status = StatusClient::new(config, Arc::clone(&auth))?;

    // Independent reads keyed by the same user id; issue both at once.
    let (profile, investment) =
        tokio::join!(status.profile_status(session.user_id), status.investment_status(session.user_id));
    let profile = profile?;
    let investment = investment?;

    let snapshot = GateSnapshot {
        initialised: true,
        session: Some(session),
        profile_complete: profile,
        investment_complete: investment,
        current: args.current,
    };
    let target = decide(&snapshot);

    let rendered = serde_json::to_string_pretty(&serde_json::json!({
        "profile_complete": profile,
        "investment_complete": investment,
        "current": args.current,
        "target": target.to_string(),
    }))
    .unwrap_or_default();
    println!("{rendered}");
    Ok(())
}

async fn run_watch(config: BackendConfig, args: WatchArgs) -> Result<(), CliError> {
    let auth = Arc::new(AuthClient::new(config.clone())?);
    let status = Arc::new(StatusClient::new(config, Arc::clone(&auth))?);
    let navigator = Arc::new(ShellNavigator::new(RouteGroup::Auth));

    let (_handle, _join) = spawn_gate(GateDeps {
        auth: Arc::clone(&auth) as Arc<dyn AuthProvider>,
        status,
        navigator,
    });

    auth.sign_in_with_password(&args.credentials.email, &args.credentials.password)
        .await?;
    let _refresh = spawn_refresh_task(Arc::clone(&auth));

    if let Some(secs) = args.signout_after {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        if let Err(e) = auth.sign_out().await {
            tracing::warn!(error = %e, "sign-out failed");
        }
        // Give the gate loop a moment to print the final redirect.
        tokio::time::sleep(Duration::from_millis(300)).await;
    } else {
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}

async fn run_logout(config: BackendConfig, args: LogoutArgs) -> Result<(), CliError> {
    let auth = AuthClient::new(config)?;
    auth.revoke_token(&args.access_token).await?;
    println!("signed out");
    Ok(())
}
