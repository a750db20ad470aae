// Entrypoint for the CLI application.
// - Keeps `main` small: load settings, build the Kodi client and hand it
//   to the UI loop.
// - Returns `anyhow::Result` so startup failures print with context.

use anyhow::Context;
use kodictl::{api::KodiClient, config::Settings, ui};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Log to stderr so tracing output never tangles with the menus.
    // Quiet by default; RUST_LOG=kodictl=debug shows every request.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load().context("loading configuration")?;
    let client = KodiClient::new(&settings.server)?;

    // Start the interactive menu. This call blocks until the user exits.
    ui::run(&client, settings.refresh.pacing())?;
    Ok(())
}
