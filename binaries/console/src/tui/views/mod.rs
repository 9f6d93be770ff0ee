mod dashboard;
mod help;
mod home;

use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

pub use dashboard::DashboardView;
pub use help::HelpView;
pub use home::{HomeView, MAX_COMPONENTS, status_lines};

use super::{
    app::{AppState, ViewType},
    theme::ThemeConfig,
};

/// Read-only data a view needs to render and handle input.
pub struct ViewContext<'a> {
    pub state: &'a AppState,
    pub theme: &'a ThemeConfig,
    pub status_page_url: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    None,
    SwitchView(ViewType),
    PushView(ViewType),
    PopView,
    RunQuery(String),
    ShowStatus(String),
    Quit,
}

pub trait View {
    fn title(&self) -> &str;

    fn help_text(&self) -> Vec<(&'static str, &'static str)>;

    fn handle_key(&mut self, key: KeyEvent, ctx: &ViewContext<'_>) -> ViewAction;

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &ViewContext<'_>);
}
