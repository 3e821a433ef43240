use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

/// Creates a styled main dialog block
pub fn create_dialog_block(title: &str, theme_color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .title_style(Style::default().fg(theme_color).add_modifier(Modifier::BOLD))
        .style(Style::default().fg(theme_color))
}

/// Creates a single-line form field, with a cursor when focused
pub fn create_field_paragraph<'a>(label: &str, value: &'a str, focused: bool) -> Paragraph<'a> {
    let (border_color, text) = if focused {
        (Color::Yellow, format!("{}█", value))
    } else {
        (Color::Gray, value.to_string())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", label))
        .title_style(Style::default().fg(Color::White))
        .style(Style::default().fg(border_color));

    Paragraph::new(text).block(block).style(Style::default().fg(Color::White))
}

/// Instruction shortcut definition: (key, color, description)
pub type InstructionShortcut = (&'static str, Color, &'static str);

/// Creates a paragraph with color-coded instruction shortcuts
pub fn create_instructions_paragraph<'a>(instructions: &[InstructionShortcut]) -> Paragraph<'a> {
    let spans: Vec<Span> = instructions
        .iter()
        .flat_map(|(key, color, desc)| {
            [
                Span::styled(*key, Style::default().fg(*color).add_modifier(Modifier::BOLD)),
                Span::styled(*desc, Style::default().fg(Color::Gray)),
            ]
        })
        .collect();

    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

pub mod shortcuts {
    use super::*;

    pub const SEPARATOR: InstructionShortcut = (" • ", Color::Gray, "");
    pub const ESC_CANCEL: InstructionShortcut = ("Esc", Color::Red, " Cancel");
    pub const ENTER_APPLY: InstructionShortcut = ("Enter", Color::Green, " Apply");
    pub const TAB_NEXT: InstructionShortcut = ("Tab", Color::Cyan, " Next field");
    pub const SPACE_TOGGLE: InstructionShortcut = ("Space", Color::Cyan, " Toggle");
    pub const SCROLL: InstructionShortcut = ("j/k", Color::Cyan, " Scroll");
    pub const ANY_KEY_CLOSE: InstructionShortcut = ("Any key", Color::Green, " Close");
}
