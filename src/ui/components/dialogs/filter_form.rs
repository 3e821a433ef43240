//! Editable filter form for the source table.
//!
//! Every field is free text except "Has TNS Name", which is a checkbox. The
//! cone search is shown as three plain fields; [`FilterFormDialog::to_form`]
//! only produces a [`ConeSearch`] when at least one of them is filled in.

use super::common::{create_dialog_block, create_field_paragraph, create_instructions_paragraph, shortcuts};
use crate::sources::{ConeSearch, FilterForm};
use crate::ui::core::actions::Action;
use crate::ui::layout::LayoutManager;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Clear, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    SourceId,
    Ra,
    Dec,
    Radius,
    StartDate,
    EndDate,
    SimbadClass,
    MinRedshift,
    MaxRedshift,
    HasTnsName,
}

impl FilterField {
    pub const ALL: [FilterField; 10] = [
        Self::SourceId,
        Self::Ra,
        Self::Dec,
        Self::Radius,
        Self::StartDate,
        Self::EndDate,
        Self::SimbadClass,
        Self::MinRedshift,
        Self::MaxRedshift,
        Self::HasTnsName,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SourceId => "Source ID",
            Self::Ra => "RA (deg)",
            Self::Dec => "Dec (deg)",
            Self::Radius => "Radius (deg)",
            Self::StartDate => "Start Date (YYYY-MM-DD)",
            Self::EndDate => "End Date (YYYY-MM-DD)",
            Self::SimbadClass => "Simbad Class",
            Self::MinRedshift => "Min Redshift",
            Self::MaxRedshift => "Max Redshift",
            Self::HasTnsName => "Has TNS Name",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterFormDialog {
    values: [String; 9],
    has_tns_name: bool,
    focused: usize,
}

impl FilterFormDialog {
    /// Open the form pre-filled with previously applied data
    pub fn from_form(form: &FilterForm) -> Self {
        let cone = form.position.clone().unwrap_or_default();
        Self {
            values: [
                form.source_id.clone(),
                cone.ra,
                cone.dec,
                cone.radius,
                form.start_date.clone(),
                form.end_date.clone(),
                form.simbad_class.clone(),
                form.min_redshift.clone(),
                form.max_redshift.clone(),
            ],
            has_tns_name: form.has_tns_name,
            focused: 0,
        }
    }

    pub fn focused_field(&self) -> FilterField {
        FilterField::ALL[self.focused]
    }

    pub fn value(&self, field: FilterField) -> &str {
        match field {
            FilterField::HasTnsName => {
                if self.has_tns_name {
                    "[x]"
                } else {
                    "[ ]"
                }
            }
            other => self.values[other as usize].as_str(),
        }
    }

    pub fn to_form(&self) -> FilterForm {
        let cone = ConeSearch {
            ra: self.values[FilterField::Ra as usize].clone(),
            dec: self.values[FilterField::Dec as usize].clone(),
            radius: self.values[FilterField::Radius as usize].clone(),
        };

        FilterForm {
            source_id: self.values[FilterField::SourceId as usize].clone(),
            position: (!cone.is_empty()).then_some(cone),
            start_date: self.values[FilterField::StartDate as usize].clone(),
            end_date: self.values[FilterField::EndDate as usize].clone(),
            simbad_class: self.values[FilterField::SimbadClass as usize].clone(),
            min_redshift: self.values[FilterField::MinRedshift as usize].clone(),
            max_redshift: self.values[FilterField::MaxRedshift as usize].clone(),
            has_tns_name: self.has_tns_name,
        }
    }

    fn focused_value_mut(&mut self) -> Option<&mut String> {
        match self.focused_field() {
            FilterField::HasTnsName => None,
            field => Some(&mut self.values[field as usize]),
        }
    }

    pub fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::HideDialog,
            KeyCode::Enter => Action::ApplyFilters(self.to_form()),
            KeyCode::Tab | KeyCode::Down => {
                self.focused = (self.focused + 1) % FilterField::ALL.len();
                Action::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focused = (self.focused + FilterField::ALL.len() - 1) % FilterField::ALL.len();
                Action::None
            }
            KeyCode::Char(' ') if self.focused_field() == FilterField::HasTnsName => {
                self.has_tns_name = !self.has_tns_name;
                Action::None
            }
            KeyCode::Char(c) => {
                if let Some(value) = self.focused_value_mut() {
                    value.push(c);
                }
                Action::None
            }
            KeyCode::Backspace => {
                if let Some(value) = self.focused_value_mut() {
                    value.pop();
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        // Ten fields at three lines each, title borders and instructions
        let dialog_area = LayoutManager::centered_rect_lines(60, 34, area);
        f.render_widget(Clear, dialog_area);
        f.render_widget(create_dialog_block(" Filter Sources ", Color::Cyan), dialog_area);

        let mut constraints: Vec<Constraint> = FilterField::ALL.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(constraints)
            .split(dialog_area);

        for (i, field) in FilterField::ALL.iter().enumerate() {
            let focused = i == self.focused;
            if *field == FilterField::HasTnsName {
                let style = if focused {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                let checkbox = Paragraph::new(format!(" {} {}", self.value(*field), field.label())).style(style);
                f.render_widget(checkbox, chunks[i]);
            } else {
                f.render_widget(create_field_paragraph(field.label(), self.value(*field), focused), chunks[i]);
            }
        }

        let instructions = create_instructions_paragraph(&[
            shortcuts::ENTER_APPLY,
            shortcuts::SEPARATOR,
            shortcuts::TAB_NEXT,
            shortcuts::SEPARATOR,
            shortcuts::SPACE_TOGGLE,
            shortcuts::SEPARATOR,
            shortcuts::ESC_CANCEL,
        ]);
        f.render_widget(instructions, chunks[FilterField::ALL.len()]);
    }
}
