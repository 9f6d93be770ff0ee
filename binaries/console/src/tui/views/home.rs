use chrono::Local;
use console_interface::{PollState, StatusSnapshot};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{View, ViewAction, ViewContext};
use crate::tui::{app::ViewType, theme::ThemeConfig};

/// Components listed under the headline; the rest stay on the status page.
pub const MAX_COMPONENTS: usize = 5;

const WIDGET_TITLE: &str = "Dynatrace Platform Status";

/// Platform status widget.
#[derive(Debug, Default)]
pub struct HomeView;

impl HomeView {
    pub fn new() -> Self {
        Self
    }
}

/// Lines shown inside the status widget for the given poll state.
pub fn status_lines(
    state: &PollState,
    theme: &ThemeConfig,
    status_page_url: &str,
) -> Vec<Line<'static>> {
    match state {
        PollState::Loading => vec![Line::styled(
            "Loading status information...",
            theme.muted_style(),
        )],
        PollState::Error(reason) => vec![
            Line::styled("Unable to load status information", theme.error_style()),
            Line::styled(reason.clone(), theme.muted_style()),
            Line::default(),
            link_line("View status page", status_page_url, theme),
        ],
        PollState::Ready(snapshot) => snapshot_lines(snapshot, theme, status_page_url),
    }
}

fn snapshot_lines(
    snapshot: &StatusSnapshot,
    theme: &ThemeConfig,
    status_page_url: &str,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled("● ", theme.status_style(snapshot.level())),
        Span::styled(
            snapshot.headline(),
            theme.header_style().add_modifier(Modifier::BOLD),
        ),
    ])];

    if !snapshot.description.is_empty() {
        lines.push(Line::styled(
            snapshot.description.clone(),
            theme.text_style(),
        ));
    }

    if !snapshot.components.is_empty() {
        lines.push(Line::default());
        lines.push(Line::styled("Component Status", theme.header_style()));
        for component in snapshot.components.iter().take(MAX_COMPONENTS) {
            lines.push(Line::from(vec![
                Span::styled("  ● ", theme.status_style(component.level())),
                Span::styled(component.name.clone(), theme.text_style()),
                Span::styled(format!("  {}", component.status), theme.muted_style()),
            ]));
        }
    }

    lines.push(Line::default());
    lines.push(Line::styled(
        format!(
            "Last updated {}",
            snapshot
                .fetched_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        ),
        theme.muted_style(),
    ));
    lines.push(link_line("View full status page", status_page_url, theme));
    lines
}

fn link_line(label: &str, url: &str, theme: &ThemeConfig) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), theme.text_style()),
        Span::styled(url.to_string(), theme.link_style()),
    ])
}

impl View for HomeView {
    fn title(&self) -> &str {
        "Home"
    }

    fn help_text(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("Tab", "Query dashboard"),
            ("F1", "Help"),
            ("q", "Quit"),
        ]
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &ViewContext<'_>) -> ViewAction {
        match key.code {
            KeyCode::Char('q') => ViewAction::Quit,
            KeyCode::Char('d') => ViewAction::SwitchView(ViewType::Dashboard),
            KeyCode::Char('?') => ViewAction::PushView(ViewType::Help),
            _ => ViewAction::None,
        }
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &ViewContext<'_>) {
        let lines = status_lines(&ctx.state.poll_state, ctx.theme, ctx.status_page_url);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ctx.theme.muted))
            .title(Span::styled(WIDGET_TITLE, ctx.theme.title_style()));

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}
