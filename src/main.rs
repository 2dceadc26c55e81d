use std::path::PathBuf;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filebrowser::{AppState, Config, config, routes};

#[derive(Parser, Debug)]
#[command(name = "filebrowser")]
#[command(about = "Read-only HTTP file browser for a local directory tree")]
#[command(version)]
struct Cli {
    /// Root directory to serve files from
    #[arg(short, long, env = "ROOT_DIR", default_value = "./srv")]
    root: PathBuf,

    /// Address to listen on (`host:port`; hostnames are resolved at bind time)
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Page title (overrides the config file)
    #[arg(short, long, env = "APP_TITLE")]
    title: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, env = "FILEBROWSER_VERBOSE")]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long, env = "FILEBROWSER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "filebrowser=debug,tower_http=debug"
    } else {
        "filebrowser=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from file if provided, otherwise use defaults
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    if let Some(title) = cli.title {
        config.title = title;
    }

    let root = config::open_root(&cli.root)?;
    info!("Serving files from: {}", root.as_path().display());

    let state = AppState::new(root, config);
    let app = routes::app(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(cli.listen.as_str()).await?;
    info!("Starting filebrowser on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
