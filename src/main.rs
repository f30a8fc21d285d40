mod actions;
mod app;
mod forms;
mod request;
mod state;
mod ui;
mod utils;

use app::App;
use color_eyre::Result;
use timetrack_tui::config::Config;
use timetrack_tui::logging;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = Config::load()?;
    logging::init(&config.logging)?;
    tracing::info!(base_url = config.base_url(), "starting timetrack-tui");

    let app = App::new(&config)?;
    let terminal = ratatui::init();
    let app_result = app.run(terminal).await;
    ratatui::restore();
    app_result
}
