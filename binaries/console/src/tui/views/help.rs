use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{DashboardView, HomeView, View, ViewAction, ViewContext};

pub const GLOBAL_BINDINGS: [(&str, &str); 5] = [
    ("Tab", "Switch between Home and Dashboard"),
    ("F1", "Show this help"),
    ("Esc", "Close the current view"),
    ("Ctrl+Q", "Quit"),
    ("Ctrl+C", "Quit"),
];

#[derive(Debug, Default)]
pub struct HelpView;

impl HelpView {
    pub fn new() -> Self {
        Self
    }

    fn section(
        title: &str,
        bindings: &[(&'static str, &'static str)],
        ctx: &ViewContext<'_>,
    ) -> Vec<Line<'static>> {
        let mut lines = vec![Line::styled(title.to_string(), ctx.theme.title_style())];
        lines.extend(bindings.iter().map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("  {key:<12}"), ctx.theme.header_style()),
                Span::styled(action.to_string(), ctx.theme.text_style()),
            ])
        }));
        lines.push(Line::default());
        lines
    }
}

impl View for HelpView {
    fn title(&self) -> &str {
        "Help"
    }

    fn help_text(&self) -> Vec<(&'static str, &'static str)> {
        vec![("Esc", "Back"), ("q", "Back")]
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &ViewContext<'_>) -> ViewAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Enter => ViewAction::PopView,
            _ => ViewAction::None,
        }
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &ViewContext<'_>) {
        let mut lines = Self::section("Global", &GLOBAL_BINDINGS, ctx);
        lines.extend(Self::section("Home", &HomeView::new().help_text(), ctx));
        lines.extend(Self::section(
            "Dashboard",
            &DashboardView::new("", 0).help_text(),
            ctx,
        ));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ctx.theme.muted))
            .title(Span::styled("Keyboard Shortcuts", ctx.theme.title_style()));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}
