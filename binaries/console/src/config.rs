use std::{path::PathBuf, time::Duration};

use anyhow::{Result, bail};
use clap::Parser;
use console_interface::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use dt_protocol::{DEFAULT_STATUS_PAGE_URL, DEFAULT_STATUS_URL};
use platform_client::ClientSettings;

use crate::{
    session::{DEFAULT_POLL_INTERVAL, DEFAULT_QUERY, DEFAULT_QUERY_TIMEOUT, MAX_POLL_INTERVAL},
    tui::ViewType,
};

#[derive(Debug, Parser)]
#[command(name = "dt-console", version, about = "Platform status and query console")]
pub struct ConsoleArgs {
    /// Status document polled by the home view
    #[arg(long, env = "DT_STATUS_URL", default_value = DEFAULT_STATUS_URL)]
    pub status_url: String,

    /// Page linked when the status document can't be loaded
    #[arg(long, env = "DT_STATUS_PAGE_URL", default_value = DEFAULT_STATUS_PAGE_URL)]
    pub status_page_url: String,

    /// Environment URL hosting the query service
    #[arg(long, env = "DT_ENVIRONMENT_URL")]
    pub environment_url: Option<String>,

    /// Session token forwarded to the query service
    #[arg(long, env = "DT_PLATFORM_TOKEN", hide_env_values = true)]
    pub platform_token: Option<String>,

    /// How often the status document is refreshed (e.g. 5m, 90s)
    #[arg(long, env = "DT_POLL_INTERVAL", default_value = "5m", value_parser = humantime::parse_duration)]
    pub poll_interval: Duration,

    /// Timeout passed to the query service with every query
    #[arg(long, env = "DT_QUERY_TIMEOUT", default_value = "30s", value_parser = humantime::parse_duration)]
    pub query_timeout: Duration,

    /// Initial query text
    #[arg(long, default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Rows per result page (25, 50, 100 or 200)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Ignore HTTP(S)_PROXY settings
    #[arg(long)]
    pub no_proxy: bool,

    /// Initial view (home, dashboard, help)
    #[arg(long, default_value = "home")]
    pub view: String,

    /// Color theme (dark, light)
    #[arg(long, default_value = "dark")]
    pub theme: String,

    /// Write logs to this file; the terminal is owned by the UI
    #[arg(long, env = "DT_CONSOLE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub status_url: String,
    pub status_page_url: String,
    pub environment_url: Option<String>,
    pub platform_token: Option<String>,
    pub use_system_proxy: bool,
    pub poll_interval: Duration,
    pub query_timeout: Duration,
    pub default_query: String,
    pub page_size: usize,
    pub initial_view: ViewType,
    pub theme: String,
    pub log_file: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            status_page_url: DEFAULT_STATUS_PAGE_URL.to_string(),
            environment_url: None,
            platform_token: None,
            use_system_proxy: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            default_query: DEFAULT_QUERY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            initial_view: ViewType::Home,
            theme: "dark".to_string(),
            log_file: None,
        }
    }
}

impl TryFrom<ConsoleArgs> for ConsoleConfig {
    type Error = anyhow::Error;

    fn try_from(args: ConsoleArgs) -> Result<Self> {
        if args.poll_interval.is_zero() {
            bail!("--poll-interval must be greater than zero");
        }
        if args.poll_interval > MAX_POLL_INTERVAL {
            bail!(
                "--poll-interval must be at most {}",
                humantime::format_duration(MAX_POLL_INTERVAL)
            );
        }
        if args.query_timeout.is_zero() {
            bail!("--query-timeout must be greater than zero");
        }
        if !PAGE_SIZE_OPTIONS.contains(&args.page_size) {
            bail!(
                "--page-size must be one of {:?}, got {}",
                PAGE_SIZE_OPTIONS,
                args.page_size
            );
        }
        let Some(initial_view) = ViewType::parse(&args.view) else {
            bail!("unknown view '{}' (expected home, dashboard or help)", args.view);
        };

        Ok(Self {
            status_url: args.status_url,
            status_page_url: args.status_page_url,
            environment_url: args.environment_url.filter(|url| !url.trim().is_empty()),
            platform_token: args.platform_token.filter(|token| !token.is_empty()),
            use_system_proxy: !args.no_proxy,
            poll_interval: args.poll_interval,
            query_timeout: args.query_timeout,
            default_query: args.query,
            page_size: args.page_size,
            initial_view,
            theme: args.theme,
            log_file: args.log_file,
        })
    }
}

impl ConsoleConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            status_url: self.status_url.clone(),
            environment_url: self.environment_url.clone(),
            platform_token: self.platform_token.clone(),
            use_system_proxy: self.use_system_proxy,
        }
    }
}
