//! Status bar component

use crate::api::notify::{Notification, NotificationLevel};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph},
    Frame,
};

const SHORTCUTS: &str = "f: filter • s: sort • n/p: page • *: favorite • ?: help • q: quit";

/// Status bar component
pub struct StatusBar;

impl StatusBar {
    /// Render requests in flight, the latest notification, or the shortcuts
    pub fn render(f: &mut Frame, area: Rect, in_flight: usize, notice: Option<&Notification>) {
        let (text, color) = match notice {
            Some(n) => {
                let color = match n.level {
                    NotificationLevel::Error => Color::Red,
                    NotificationLevel::Warning => Color::Yellow,
                    NotificationLevel::Info => Color::Green,
                };
                (n.message.clone(), color)
            }
            None if in_flight > 0 => (format!("⟳ {} request(s) in flight...", in_flight), Color::Yellow),
            None => (SHORTCUTS.to_string(), Color::Gray),
        };

        let status_bar = Paragraph::new(text)
            .block(Block::default())
            .alignment(Alignment::Center)
            .style(Style::default().fg(color));

        f.render_widget(status_bar, area);
    }
}
