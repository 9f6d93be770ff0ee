use std::{
    collections::VecDeque,
    io::{self, Stdout},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use console_interface::{PollState, QueryError, QueryState};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio_stream::{Stream, StreamExt, wrappers::WatchStream};
use tracing::{debug, info};

use super::{
    bridge::ServiceBundle,
    theme::ThemeConfig,
    updates::StateUpdate,
    views::{DashboardView, HelpView, HomeView, View, ViewAction, ViewContext},
};
use crate::{
    config::ConsoleConfig,
    session::{QueryExecutor, QuerySession, StatusPoller},
};

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(5);
const MAX_STATUS_MESSAGES: usize = 5;
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewType {
    Home,
    Dashboard,
    Help,
}

impl ViewType {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "home" | "status" => Some(ViewType::Home),
            "dashboard" | "query" => Some(ViewType::Dashboard),
            "help" => Some(ViewType::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: MessageLevel,
    pub created_at: Instant,
}

/// Latest state from each session machine plus UI-only bookkeeping.
#[derive(Debug, Default)]
pub struct AppState {
    pub poll_state: PollState,
    pub query_state: QueryState,
    pub status_messages: VecDeque<StatusMessage>,
}

pub struct ConsoleApp {
    current_view: ViewType,
    view_stack: Vec<ViewType>,
    should_quit: bool,
    state: AppState,
    theme: ThemeConfig,
    status_page_url: String,
    poller: StatusPoller,
    session: QuerySession,
    home: HomeView,
    dashboard: DashboardView,
    help: HelpView,
}

impl ConsoleApp {
    pub fn from_service_bundle(config: &ConsoleConfig, bundle: ServiceBundle) -> Self {
        let poller = StatusPoller::new(bundle.status_source, config.poll_interval);
        let session = QuerySession::new(
            QueryExecutor::new(bundle.query_service),
            config.default_query.clone(),
            config.query_timeout,
        );

        Self {
            current_view: config.initial_view.clone(),
            view_stack: Vec::new(),
            should_quit: false,
            state: AppState::default(),
            theme: ThemeConfig::by_name(&config.theme),
            status_page_url: config.status_page_url.clone(),
            poller,
            session,
            home: HomeView::new(),
            dashboard: DashboardView::new(&config.default_query, config.page_size),
            help: HelpView::new(),
        }
    }

    pub fn current_view(&self) -> &ViewType {
        &self.current_view
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn push_view(&mut self, view: ViewType) {
        let previous = std::mem::replace(&mut self.current_view, view);
        self.view_stack.push(previous);
    }

    pub fn pop_view(&mut self) {
        if let Some(view) = self.view_stack.pop() {
            self.current_view = view;
        }
    }

    pub fn switch_view(&mut self, view: ViewType) {
        self.current_view = view;
    }

    /// Tab flips between the two main views and drops any pushed overlays.
    fn toggle_main_view(&mut self) {
        let next = match self.current_view {
            ViewType::Home => ViewType::Dashboard,
            ViewType::Dashboard | ViewType::Help => ViewType::Home,
        };
        self.view_stack.clear();
        self.switch_view(next);
    }

    pub fn show_status_message(&mut self, text: String, level: MessageLevel) {
        if self.state.status_messages.len() == MAX_STATUS_MESSAGES {
            self.state.status_messages.pop_front();
        }
        self.state.status_messages.push_back(StatusMessage {
            text,
            level,
            created_at: Instant::now(),
        });
    }

    fn prune_status_messages(&mut self, now: Instant) {
        self.state
            .status_messages
            .retain(|message| now.duration_since(message.created_at) < STATUS_MESSAGE_TTL);
    }

    /// Starts status polling. Query execution is driven by key presses.
    pub fn start_services(&mut self) {
        self.poller.start();
    }

    pub fn stop_services(&mut self) {
        self.poller.stop();
    }

    /// Every state published by the poller and the query session, starting
    /// with their current values.
    pub fn state_updates(&self) -> impl Stream<Item = StateUpdate> + Unpin + use<> {
        let status = WatchStream::new(self.poller.subscribe()).map(StateUpdate::StatusChanged);
        let query = WatchStream::new(self.session.subscribe()).map(StateUpdate::QueryChanged);
        status.merge(query)
    }

    #[cfg(test)]
    pub(crate) fn view_stack_len(&self) -> usize {
        self.view_stack.len()
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &AppState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn dashboard(&self) -> &DashboardView {
        &self.dashboard
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &QuerySession {
        &self.session
    }

    pub fn process_state_update(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::StatusChanged(state) => self.state.poll_state = state,
            StateUpdate::QueryChanged(state) => {
                if let QueryState::Ready(result) = &state {
                    self.dashboard.reset_table();
                    let text = format!("Query returned {} rows", result.len());
                    self.show_status_message(text, MessageLevel::Success);
                }
                self.state.query_state = state;
            }
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.toggle_main_view();
                return;
            }
            KeyCode::F(1) => {
                if self.current_view != ViewType::Help {
                    self.push_view(ViewType::Help);
                }
                return;
            }
            KeyCode::Esc => {
                self.pop_view();
                return;
            }
            _ => {}
        }

        let ctx = ViewContext {
            state: &self.state,
            theme: &self.theme,
            status_page_url: &self.status_page_url,
        };
        let action = match self.current_view {
            ViewType::Home => self.home.handle_key(key, &ctx),
            ViewType::Dashboard => self.dashboard.handle_key(key, &ctx),
            ViewType::Help => self.help.handle_key(key, &ctx),
        };
        self.apply_action(action);
    }

    fn apply_action(&mut self, action: ViewAction) {
        match action {
            ViewAction::None => {}
            ViewAction::SwitchView(view) => self.switch_view(view),
            ViewAction::PushView(view) => self.push_view(view),
            ViewAction::PopView => self.pop_view(),
            ViewAction::RunQuery(text) => self.run_query(text),
            ViewAction::ShowStatus(text) => self.show_status_message(text, MessageLevel::Info),
            ViewAction::Quit => self.should_quit = true,
        }
    }

    /// Claims the session with the editor text as of this key press and
    /// executes it in the background. The outcome arrives through
    /// [`Self::state_updates`].
    fn run_query(&mut self, text: String) {
        self.session.set_query_text(text);
        match self.session.begin() {
            Ok(run) => {
                debug!(target: "tui", chars = run.text().len(), "query started");
                tokio::spawn(run.complete());
            }
            Err(QueryError::InFlight) => self.show_status_message(
                "A query is already running".to_string(),
                MessageLevel::Warning,
            ),
            Err(err) => self.show_status_message(err.user_message(), MessageLevel::Error),
        }
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let [tabs_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.size());

        frame.render_widget(Paragraph::new(self.tab_line()), tabs_area);

        let ctx = ViewContext {
            state: &self.state,
            theme: &self.theme,
            status_page_url: &self.status_page_url,
        };
        let hints = match self.current_view {
            ViewType::Home => {
                self.home.render(frame, body_area, &ctx);
                self.home.help_text()
            }
            ViewType::Dashboard => {
                self.dashboard.render(frame, body_area, &ctx);
                self.dashboard.help_text()
            }
            ViewType::Help => {
                self.help.render(frame, body_area, &ctx);
                self.help.help_text()
            }
        };

        let footer = match self.state.status_messages.back() {
            Some(message) => Line::styled(
                message.text.clone(),
                self.theme.message_style(&message.level),
            ),
            None => Line::styled(
                hints
                    .iter()
                    .map(|(key, action)| format!("{key} {action}"))
                    .collect::<Vec<_>>()
                    .join("  "),
                self.theme.muted_style(),
            ),
        };
        frame.render_widget(Paragraph::new(footer), footer_area);
    }

    fn tab_line(&self) -> Line<'static> {
        let mut tabs: Vec<(ViewType, &str)> = vec![
            (ViewType::Home, self.home.title()),
            (ViewType::Dashboard, self.dashboard.title()),
        ];
        if self.current_view == ViewType::Help {
            tabs.push((ViewType::Help, self.help.title()));
        }

        let mut spans = vec![Span::styled(" dt-console ", self.theme.title_style())];
        for (view, label) in tabs {
            let style = if self.current_view == view {
                self.theme.header_style()
            } else {
                self.theme.muted_style()
            };
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(label.to_string(), style));
        }
        Line::from(spans)
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        info!(target: "tui", view = ?self.current_view(), "console started");

        let outcome = self.event_loop(&mut terminal).await;

        self.stop_services();
        restore_terminal(&mut terminal)?;
        info!(target: "tui", "console stopped");
        outcome
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        self.start_services();
        let mut updates = self.state_updates();
        let mut input_tick = tokio::time::interval(INPUT_POLL_INTERVAL);

        while !self.should_quit() {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                Some(update) = updates.next() => self.process_state_update(update),
                _ = input_tick.tick() => {
                    while event::poll(Duration::ZERO)? {
                        if let Event::Key(key) = event::read()? {
                            if key.kind == KeyEventKind::Press {
                                self.handle_key_event(key);
                            }
                        }
                    }
                    self.prune_status_messages(Instant::now());
                }
            }
        }
        Ok(())
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
