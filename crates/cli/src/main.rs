use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use {
    clap::Parser,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    postwright_browser::EditorService,
    postwright_gateway::{AppState, run},
};

#[derive(Parser)]
#[command(name = "postwright", about = "Blog posting over a driven browser")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long)]
    port: Option<u16>,

    /// Explicit config file (skips discovery).
    #[arg(long, env = "POSTWRIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Run the browser with a visible window.
    #[arg(long, default_value_t = false)]
    headed: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let mut cfg = match &cli.config {
        Some(path) => postwright_config::load_config(path)?,
        None => postwright_config::discover_and_load(),
    };

    if let Some(ref bind) = cli.bind {
        cfg.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    if cli.headed {
        cfg.editor.headless = false;
    }

    let credentials = cfg.credentials.resolve().ok_or_else(|| {
        anyhow::anyhow!(
            "missing credentials: set NAVER_ID and NAVER_PW (or the [credentials] config section)"
        )
    })?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.bind, cfg.server.port).parse()?;
    info!(account = %credentials.id, headless = cfg.editor.headless, "starting postwright");

    let state = AppState {
        editor: Arc::new(EditorService::new(cfg.editor.clone(), credentials)),
        title_max_chars: cfg.editor.title_max_chars,
    };

    run(addr, state).await
}
