use super::common::{create_dialog_block, create_instructions_paragraph, shortcuts};
use crate::constants::DIALOG_TITLE_DEBUG_LOGS;
use crate::ui::layout::LayoutManager;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

const HELP_TEXT: &str = r"
SOURCEDECK - Source Catalog Browser
===================================

TABLE NAVIGATION
----------------
j/k, ↑/↓        Select row
h/l, ←/→        Select column
Enter           Expand or collapse the selected source
n/p, PgDn/PgUp  Next or previous page
+               Cycle rows per page (10, 25, 50, 100)
s               Sort by selected column (again to flip order)
v               Show or hide columns

FILTERING
---------
f               Open the filter form
Tab             Select a filter chip
x               Remove the selected (or last) chip
c               Clear all filters

SOURCES
-------
*               Add or remove the source from favorites
g               Make the source's next group active
P               Pending save requests for the active group
S               Sources saved to the active group
A               Back to all sources
a / d           Accept or decline a save request (pending view)

GENERAL
-------
r               Refresh the current view
G               Show debug logs
?               Toggle this help
q, Ctrl+C       Quit

Press 'Esc' or '?' to close this help panel
";

/// Number of lines in the help text
pub fn help_line_count() -> usize {
    HELP_TEXT.lines().count()
}

/// Slice `content` to what fits and update the scrollbar to match.
///
/// Returns the text, whether it overflows, and the offset actually used.
fn visible_window(
    content: &str,
    scroll_offset: usize,
    height: usize,
    scrollbar_state: &mut ScrollbarState,
) -> (String, bool, usize) {
    let lines: Vec<&str> = content.lines().collect();
    let overflowing = lines.len() > height;
    let offset = scroll_offset.min(lines.len().saturating_sub(height));

    *scrollbar_state = scrollbar_state
        .content_length(lines.len())
        .viewport_content_length(height)
        .position(offset);

    let text = lines.iter().skip(offset).take(height).copied().collect::<Vec<_>>().join("\n");
    (text, overflowing, offset)
}

fn render_scrollbar(f: &mut Frame, area: Rect, scrollbar_state: &mut ScrollbarState) {
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"))
        .track_symbol(Some("│"))
        .thumb_symbol("▐")
        .style(Style::default().fg(Color::Gray))
        .thumb_style(Style::default().fg(Color::White));

    f.render_stateful_widget(scrollbar, area, scrollbar_state);
}

/// Message box; any key other than j/k closes it
pub fn render_message_dialog(
    f: &mut Frame,
    area: Rect,
    title: &str,
    theme_color: Color,
    message: &str,
    scroll_offset: usize,
    scrollbar_state: &mut ScrollbarState,
) -> usize {
    let dialog_area = LayoutManager::centered_rect_lines(70, 12, area);
    f.render_widget(Clear, dialog_area);
    f.render_widget(create_dialog_block(title, theme_color), dialog_area);

    let content_area = Rect::new(
        dialog_area.x + 1,
        dialog_area.y + 1,
        dialog_area.width.saturating_sub(2),
        dialog_area.height.saturating_sub(4),
    );
    let instructions_area = Rect::new(
        dialog_area.x + 1,
        dialog_area.y + dialog_area.height.saturating_sub(2),
        dialog_area.width.saturating_sub(2),
        1,
    );

    let (text, overflowing, offset) =
        visible_window(message, scroll_offset, content_area.height as usize, scrollbar_state);

    let message_paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(message_paragraph, content_area);

    let instructions = create_instructions_paragraph(&[shortcuts::ANY_KEY_CLOSE, shortcuts::SEPARATOR, shortcuts::SCROLL]);
    f.render_widget(instructions, instructions_area);

    if overflowing {
        render_scrollbar(f, content_area, scrollbar_state);
    }
    offset
}

fn render_full_screen_text(
    f: &mut Frame,
    area: Rect,
    title: &str,
    content: &str,
    scroll_offset: usize,
    scrollbar_state: &mut ScrollbarState,
) -> usize {
    let outer = LayoutManager::centered_rect(90, 90, area);
    f.render_widget(Clear, outer);

    let block = create_dialog_block(title, Color::White).title_alignment(Alignment::Center);
    let inner = block.inner(outer);
    f.render_widget(block, outer);

    let (text, overflowing, offset) = visible_window(content, scroll_offset, inner.height as usize, scrollbar_state);
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::White)), inner);

    if overflowing {
        render_scrollbar(f, inner, scrollbar_state);
    }
    offset
}

pub fn render_help_dialog(f: &mut Frame, area: Rect, scroll_offset: usize, scrollbar_state: &mut ScrollbarState) -> usize {
    render_full_screen_text(
        f,
        area,
        " Help - Press 'Esc' or '?' to close ",
        HELP_TEXT,
        scroll_offset,
        scrollbar_state,
    )
}

pub fn render_logs_dialog(
    f: &mut Frame,
    area: Rect,
    logs: &[String],
    scroll_offset: usize,
    scrollbar_state: &mut ScrollbarState,
) -> usize {
    let content = if logs.is_empty() {
        "No debug logs available".to_string()
    } else {
        logs.join("\n")
    };

    render_full_screen_text(f, area, DIALOG_TITLE_DEBUG_LOGS, &content, scroll_offset, scrollbar_state)
}
