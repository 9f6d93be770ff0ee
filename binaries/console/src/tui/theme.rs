use console_interface::StatusLevel;
use ratatui::style::{Color, Modifier, Style};

use super::app::MessageLevel;

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeConfig {
    pub name: String,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub error: Color,
    pub operational: Color,
    pub minor: Color,
    pub major: Color,
    pub critical: Color,
    pub unknown: Color,
}

impl ThemeConfig {
    pub fn default_dark() -> Self {
        Self {
            name: "dark".to_string(),
            text: Color::Rgb(240, 240, 245),
            muted: Color::Rgb(180, 180, 190),
            accent: Color::Rgb(108, 93, 211),
            error: Color::Rgb(238, 61, 72),
            operational: Color::Rgb(42, 176, 111),
            minor: Color::Rgb(245, 211, 40),
            major: Color::Rgb(253, 130, 50),
            critical: Color::Rgb(220, 23, 42),
            unknown: Color::Gray,
        }
    }

    pub fn default_light() -> Self {
        Self {
            name: "light".to_string(),
            text: Color::Black,
            muted: Color::DarkGray,
            accent: Color::Rgb(80, 64, 190),
            error: Color::Rgb(200, 30, 45),
            operational: Color::Rgb(20, 130, 70),
            minor: Color::Rgb(170, 130, 0),
            major: Color::Rgb(200, 90, 0),
            critical: Color::Rgb(180, 0, 20),
            unknown: Color::DarkGray,
        }
    }

    /// Unknown names fall back to the dark theme.
    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::default_light(),
            _ => Self::default_dark(),
        }
    }

    pub fn status_style(&self, level: StatusLevel) -> Style {
        let color = match level {
            StatusLevel::Operational => self.operational,
            StatusLevel::Minor => self.minor,
            StatusLevel::Major => self.major,
            StatusLevel::Critical => self.critical,
            StatusLevel::Unknown => self.unknown,
        };
        Style::default().fg(color)
    }

    pub fn message_style(&self, level: &MessageLevel) -> Style {
        match level {
            MessageLevel::Info => self.text_style(),
            MessageLevel::Success => Style::default().fg(self.operational),
            MessageLevel::Warning => Style::default().fg(self.minor),
            MessageLevel::Error => self.error_style(),
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn header_style(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }

    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::default_dark()
    }
}
