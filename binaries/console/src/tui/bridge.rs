use std::sync::Arc;

use anyhow::{Context, Result};
use console_interface::{QueryService, StatusSource};
use platform_client::PlatformClients;
use tracing::{info, warn};

use crate::config::ConsoleConfig;

/// Services the console runs against. Tests swap in the scripted mocks.
pub struct ServiceBundle {
    pub status_source: Arc<dyn StatusSource>,
    pub query_service: Arc<dyn QueryService>,
}

impl ServiceBundle {
    pub fn new(status_source: Arc<dyn StatusSource>, query_service: Arc<dyn QueryService>) -> Self {
        Self {
            status_source,
            query_service,
        }
    }
}

pub fn default_service_bundle(config: &ConsoleConfig) -> Result<ServiceBundle> {
    let clients = PlatformClients::new(&config.client_settings())
        .with_context(|| format!("failed to initialize platform clients for {}", config.status_url))?;

    match clients.query_url() {
        Some(url) => info!(target: "tui", %url, "query service configured"),
        None => warn!(target: "tui", "no environment URL configured, queries are disabled"),
    }

    Ok(ServiceBundle::new(
        clients.status_source(),
        clients.query_service(),
    ))
}
