pub mod config;
pub mod logging;
pub mod session;
pub mod tui;

use anyhow::Result;
use config::ConsoleConfig;
use tui::{ConsoleApp, default_service_bundle};

pub fn run_console(config: ConsoleConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let bundle = default_service_bundle(&config)?;
        let mut app = ConsoleApp::from_service_bundle(&config, bundle);
        app.run().await
    })
}
