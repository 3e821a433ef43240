use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use sourcedeck::sources::{ConeSearch, FilterForm};
use sourcedeck::ui::components::dialogs::{system_dialogs, FilterField, FilterFormDialog};
use sourcedeck::ui::components::DialogComponent;
use sourcedeck::ui::core::{Action, Component, DialogType};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(form: &mut FilterFormDialog, text: &str) {
    for c in text.chars() {
        form.handle_key_events(key(KeyCode::Char(c)));
    }
}

#[test]
fn test_form_typing_and_focus() {
    let mut form = FilterFormDialog::default();
    assert_eq!(form.focused_field(), FilterField::SourceId);

    type_text(&mut form, "ZTF21x");
    form.handle_key_events(key(KeyCode::Backspace));
    assert_eq!(form.value(FilterField::SourceId), "ZTF21");

    form.handle_key_events(key(KeyCode::BackTab));
    assert_eq!(form.focused_field(), FilterField::HasTnsName);
    form.handle_key_events(key(KeyCode::Char(' ')));
    assert_eq!(form.value(FilterField::HasTnsName), "[x]");

    form.handle_key_events(key(KeyCode::Tab));
    form.handle_key_events(key(KeyCode::Tab));
    assert_eq!(form.focused_field(), FilterField::Ra);
    type_text(&mut form, "10.5");

    let Action::ApplyFilters(submitted) = form.handle_key_events(key(KeyCode::Enter)) else {
        panic!("expected submitted filters");
    };
    assert_eq!(submitted.source_id, "ZTF21");
    assert!(submitted.has_tns_name);
    assert_eq!(
        submitted.position,
        Some(ConeSearch {
            ra: "10.5".to_string(),
            dec: String::new(),
            radius: String::new(),
        })
    );
}

#[test]
fn test_untouched_cone_is_absent() {
    let form = FilterFormDialog::from_form(&FilterForm {
        min_redshift: "0.1".to_string(),
        ..Default::default()
    });

    let submitted = form.to_form();
    assert_eq!(submitted.position, None);
    assert_eq!(submitted.min_redshift, "0.1");
}

#[test]
fn test_dialog_opens_form_with_previous_values() {
    let mut dialog = DialogComponent::new();
    let previous = FilterForm {
        simbad_class: "Galaxy".to_string(),
        ..Default::default()
    };

    dialog.update(Action::ShowDialog(DialogType::FilterForm(previous)));
    assert!(dialog.is_visible());
    assert_eq!(dialog.filter_form().value(FilterField::SimbadClass), "Galaxy");

    let action = dialog.handle_key_events(key(KeyCode::Enter));
    let passed = dialog.update(action);

    assert!(matches!(passed, Action::ApplyFilters(ref form) if form.simbad_class == "Galaxy"));
    assert!(!dialog.is_visible());
}

#[test]
fn test_message_dialogs_close_on_other_keys() {
    let mut dialog = DialogComponent::new();
    dialog.update(Action::ShowDialog(DialogType::Info("Select a group first".to_string())));

    assert!(matches!(dialog.handle_key_events(key(KeyCode::Char('j'))), Action::None));
    let action = dialog.handle_key_events(key(KeyCode::Char('x')));
    assert!(matches!(action, Action::HideDialog));

    dialog.update(action);
    assert!(!dialog.is_visible());
}

#[test]
fn test_help_closes_on_its_own_keys() {
    let mut dialog = DialogComponent::new();
    dialog.update(Action::ShowDialog(DialogType::Help));

    assert!(matches!(dialog.handle_key_events(key(KeyCode::Char('x'))), Action::None));
    assert!(matches!(dialog.handle_key_events(key(KeyCode::Char('?'))), Action::HideDialog));
}

#[test]
fn test_scrolling_up_right_after_end() {
    let mut dialog = DialogComponent::new();
    dialog.update(Action::ShowDialog(DialogType::Help));

    dialog.handle_key_events(key(KeyCode::End));
    assert_eq!(dialog.scroll_offset(), system_dialogs::help_line_count() - 1);

    // Drawing settles the offset on the last full window
    let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
    terminal.draw(|f| dialog.render(f, f.area())).unwrap();
    let bottom = dialog.scroll_offset();
    assert!(bottom < system_dialogs::help_line_count() - 1);

    dialog.handle_key_events(key(KeyCode::Up));
    assert_eq!(dialog.scroll_offset(), bottom - 1);

    dialog.handle_key_events(key(KeyCode::Home));
    assert_eq!(dialog.scroll_offset(), 0);
}
