//! Modal dialog component.
//!
//! Hosts the filter form plus the informational dialogs (notices, help and
//! the debug log viewer). Only one dialog is open at a time; while
//! one is open it receives every key press.

use crate::logger::Logger;
use crate::ui::components::dialogs::{system_dialogs, FilterFormDialog};
use crate::ui::core::{
    actions::{Action, DialogType},
    Component,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, style::Color, widgets::ScrollbarState, Frame};

pub struct DialogComponent {
    pub dialog_type: Option<DialogType>,
    filter_form: FilterFormDialog,
    scroll_offset: usize,
    scrollbar_state: ScrollbarState,
    logger: Option<Logger>,
}

impl Default for DialogComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogComponent {
    pub fn new() -> Self {
        Self {
            dialog_type: None,
            filter_form: FilterFormDialog::default(),
            scroll_offset: 0,
            scrollbar_state: ScrollbarState::new(0),
            logger: None,
        }
    }

    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = Some(logger);
    }

    pub fn is_visible(&self) -> bool {
        self.dialog_type.is_some()
    }

    pub fn filter_form(&self) -> &FilterFormDialog {
        &self.filter_form
    }

    fn clear_dialog(&mut self) {
        self.dialog_type = None;
        self.scroll_offset = 0;
        self.scrollbar_state = ScrollbarState::new(0);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Lines of text in the open dialog
    fn content_lines(&self) -> usize {
        match &self.dialog_type {
            Some(DialogType::Help) => system_dialogs::help_line_count(),
            Some(DialogType::Logs) => self.logger.as_ref().map_or(0, |l| l.get_logs().len()),
            Some(DialogType::Info(message)) => message.lines().count(),
            Some(DialogType::FilterForm(_)) | None => 0,
        }
    }

    fn scroll(&mut self, delta: isize) {
        let last_line = self.content_lines().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(last_line);
        self.scrollbar_state = self.scrollbar_state.position(self.scroll_offset);
    }

    fn handle_scrollable_key(&mut self, key: KeyEvent, close_keys: &[KeyCode]) -> Action {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.scroll(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll(-1),
            KeyCode::PageDown => self.scroll(10),
            KeyCode::PageUp => self.scroll(-10),
            KeyCode::Home => self.scroll(isize::MIN),
            KeyCode::End => self.scroll(isize::MAX),
            code if close_keys.contains(&code) => return Action::HideDialog,
            _ => {}
        }
        Action::None
    }
}

impl Component for DialogComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        match &self.dialog_type {
            None => Action::None,
            Some(DialogType::FilterForm(_)) => self.filter_form.handle_key_events(key),
            Some(DialogType::Help) => {
                self.handle_scrollable_key(key, &[KeyCode::Esc, KeyCode::Char('?'), KeyCode::Char('q')])
            }
            Some(DialogType::Logs) => {
                self.handle_scrollable_key(key, &[KeyCode::Esc, KeyCode::Char('G'), KeyCode::Char('q')])
            }
            Some(DialogType::Info(_)) => match key.code {
                KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up | KeyCode::Down => {
                    self.handle_scrollable_key(key, &[])
                }
                _ => Action::HideDialog,
            },
        }
    }

    fn update(&mut self, action: Action) -> Action {
        match action {
            Action::ShowDialog(dialog_type) => {
                if let DialogType::FilterForm(form) = &dialog_type {
                    self.filter_form = FilterFormDialog::from_form(form);
                }
                self.scroll_offset = 0;
                self.scrollbar_state = ScrollbarState::new(0);
                self.dialog_type = Some(dialog_type);
                Action::None
            }
            Action::HideDialog => {
                self.clear_dialog();
                Action::None
            }
            Action::ApplyFilters(_) => {
                self.clear_dialog();
                action
            }
            _ => action,
        }
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        let Some(dialog_type) = self.dialog_type.clone() else {
            return;
        };

        match dialog_type {
            DialogType::FilterForm(_) => self.filter_form.render(f, rect),
            DialogType::Info(message) => {
                // Keep the stored offset within what the window can show
                self.scroll_offset = system_dialogs::render_message_dialog(
                    f,
                    rect,
                    " Info ",
                    Color::Blue,
                    &message,
                    self.scroll_offset,
                    &mut self.scrollbar_state,
                );
            }
            DialogType::Help => {
                self.scroll_offset =
                    system_dialogs::render_help_dialog(f, rect, self.scroll_offset, &mut self.scrollbar_state);
            }
            DialogType::Logs => {
                let logs = self.logger.as_ref().map(Logger::get_logs).unwrap_or_default();
                self.scroll_offset =
                    system_dialogs::render_logs_dialog(f, rect, &logs, self.scroll_offset, &mut self.scrollbar_state);
            }
        }
    }
}
