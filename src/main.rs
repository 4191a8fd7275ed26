use clap::Parser;
use reco_core::{config::Config, format_score, RecommendClient};

#[derive(Parser)]
#[command(name = "reco", about = "reco — terminal client for the state-entity recommendation service")]
struct Cli {
    /// Write debug logs to /tmp/reco-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// Override the backend base URL from the config file.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// One-shot mode: submit this query, print the ranked list, and exit
    /// without starting the TUI.
    #[arg(long, value_name = "QUERY")]
    producto: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/reco-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("reco debug log started — tail -f /tmp/reco-debug.log");
    }

    let mut config = Config::load()?;
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }

    match cli.producto {
        Some(producto) => run_oneshot(&config, &producto),
        None => reco_tui::run(config),
    }
}

/// Submit one query outside the TUI and print the ranked list to stdout.
///
/// Exits non-zero on any request failure, printing the same message the TUI
/// would show.
fn run_oneshot(config: &Config, producto: &str) -> anyhow::Result<()> {
    let producto = producto.trim();
    if producto.is_empty() {
        anyhow::bail!("--producto must not be empty");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let client = RecommendClient::new(config.backend.base_url.clone());

    match runtime.block_on(client.recommend(producto)) {
        Ok(recommendations) => {
            if recommendations.is_empty() {
                println!("Sin resultados.");
                return Ok(());
            }
            for (rank, rec) in recommendations.iter().enumerate() {
                println!("{:>3}. {}  {}", rank + 1, rec.entidad, format_score(rec.score));
            }
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "one-shot request failed");
            anyhow::bail!("{}", err.user_message())
        }
    }
}
