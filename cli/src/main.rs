mod render;
mod repl;

use clap::{Parser, Subcommand};
use message_dashboard::Dashboard;
use message_dashboard::config::{ConfigError, DashboardConfig};
use message_dashboard::net::api::ApiError;
use message_dashboard::net::types::MessageId;
use message_dashboard::state::list::FetchOrdering;
use tracing::Level;

use crate::render::render;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Api(#[from] ApiError),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    ListFailed(String),
    #[error("{0} classification(s) failed")]
    ClassificationFailed(usize),
}

#[derive(Parser, Debug)]
#[command(name = "msgdash-cli", about = "Physician message dashboard")]
struct Cli {
    /// Backend base URL. Overrides `DASHBOARD_API_BASE`.
    #[arg(long)]
    base_url: Option<String>,

    /// Discard list results from superseded requests.
    #[arg(long, default_value_t = false)]
    latest_request_wins: bool,

    #[arg(long, short, env = "DASHBOARD_VERBOSE", default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the message list once and print it.
    List {
        #[arg(long)]
        physician: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Classify messages and print each outcome.
    Classify {
        #[arg(required = true)]
        ids: Vec<MessageId>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    let mut config = DashboardConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base = base_url.trim_end_matches('/').to_owned();
    }
    if cli.latest_request_wins {
        config.ordering = FetchOrdering::LatestRequestWins;
    }
    let dash = Dashboard::from_config(&config)?;

    match cli.command {
        None => repl::run(dash).await,
        Some(Command::List { physician, from, to }) => {
            list_once(&dash, physician.unwrap_or_default(), from.unwrap_or_default(), to.unwrap_or_default())
                .await
        }
        Some(Command::Classify { ids }) => classify_once(&dash, ids).await,
    }
}

async fn list_once(dash: &Dashboard, physician: String, from: String, to: String) -> Result<(), CliError> {
    dash.set_filter(physician);
    dash.set_date_range(from, to);
    dash.search().await;

    let state = dash.snapshot();
    print!("{}", render(&state));
    match state.error() {
        Some(error) => Err(CliError::ListFailed(error.to_owned())),
        None => Ok(()),
    }
}

async fn classify_once(dash: &Dashboard, ids: Vec<MessageId>) -> Result<(), CliError> {
    let handles: Vec<_> = ids.iter().map(|id| dash.spawn_classify(*id)).collect();
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "classification task did not finish");
        }
    }
    let state = dash.snapshot();

    let mut failed = 0;
    for id in ids {
        match state.outcome(id) {
            Some(outcome) => {
                if outcome.is_error() {
                    failed += 1;
                }
                println!("{id}: {outcome}");
            }
            None => println!("{id}: no result"),
        }
    }
    if failed > 0 {
        return Err(CliError::ClassificationFailed(failed));
    }
    Ok(())
}
