//! reco TUI — ratatui application shell.

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;

use reco_core::config::Config;
use reco_core::RecommendClient;
use std::sync::Arc;

/// Start the TUI against the backend named in `config`.
///
/// Owns the tokio runtime for the lifetime of the UI; the event loop itself
/// runs synchronously on the main thread and only the in-flight request is
/// spawned onto the runtime.
pub fn run(config: Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let client = Arc::new(RecommendClient::new(config.backend.base_url.clone()));
    let theme = theme::Theme::load_default();
    App::new(config, client, runtime.handle().clone(), theme).run()
}
