use crate::config::Config;
use crate::constants::{FIRST_PAGE, LOADING_SOURCES, NO_SOURCES, ROWS_PER_PAGE_OPTIONS};
use crate::constants::{TITLE_ALL_SOURCES, TITLE_PENDING_SOURCES, TITLE_SAVED_SOURCES};
use crate::sources::filter::{filter_chips, normalize_filter_form, remove_chip};
use crate::sources::{FilterForm, FilterSet, SaveRequestDecision, SortOrder, SortSpec, Source, SourceQuery};
use crate::ui::components::columns::{render_cell, render_details, CellValue, ColumnId, Emphasis, RenderContext};
use crate::ui::core::{
    actions::{Action, DialogType, ViewMode},
    Component,
};
use crate::utils::coords::CoordinateFormat;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};
use std::collections::{BTreeSet, HashSet};

/// Paginated, sortable, filterable table of sources.
///
/// The rows, page number and match count are owned by the store and pushed
/// in through [`SourceTableComponent::update_data`]. The component only
/// keeps presentation state: displayed columns, filter chips, the last
/// applied form, rows per page, sort and cursor positions.
pub struct SourceTableComponent {
    sources: Vec<Source>,
    page_number: u32,
    total_matches: u64,
    loading: bool,
    favorites: BTreeSet<String>,
    view_mode: ViewMode,
    active_group: Option<i64>,

    pub columns: Vec<ColumnId>,
    pub chips: Vec<String>,
    pub form_data: FilterForm,
    filters: FilterSet,
    pub rows_per_page: u32,
    pub sort: Option<SortSpec>,

    selected_row: usize,
    selected_column: usize,
    selected_chip: Option<usize>,
    expanded: HashSet<String>,
    picker_cursor: Option<usize>,
    table_state: TableState,

    coordinate_format: CoordinateFormat,
    classifications_in_group_only: bool,
    date_format: String,
    time_format: String,
}

impl Default for SourceTableComponent {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl SourceTableComponent {
    pub fn new(config: &Config) -> Self {
        Self {
            sources: Vec::new(),
            page_number: FIRST_PAGE,
            total_matches: 0,
            loading: false,
            favorites: BTreeSet::new(),
            view_mode: ViewMode::AllSources,
            active_group: config.table.default_group,
            columns: config.visible_columns(),
            chips: Vec::new(),
            form_data: FilterForm::default(),
            filters: FilterSet::new(),
            rows_per_page: config.table.rows_per_page,
            sort: None,
            selected_row: 0,
            selected_column: 0,
            selected_chip: None,
            expanded: HashSet::new(),
            picker_cursor: None,
            table_state: TableState::default(),
            coordinate_format: config.table.coordinate_format,
            classifications_in_group_only: config.table.classifications_in_group_only,
            date_format: config.display.date_format.clone(),
            time_format: config.display.time_format.clone(),
        }
    }

    pub fn update_data(
        &mut self,
        sources: Vec<Source>,
        page_number: u32,
        total_matches: u64,
        favorites: BTreeSet<String>,
        loading: bool,
    ) {
        self.sources = sources;
        self.page_number = page_number.max(FIRST_PAGE);
        self.total_matches = total_matches;
        self.favorites = favorites;
        self.loading = loading;

        // A new page replaces the old one wholesale
        let ids: HashSet<&str> = self.sources.iter().map(|s| s.id.as_str()).collect();
        self.expanded.retain(|id| ids.contains(id.as_str()));
        if self.selected_row >= self.sources.len() {
            self.selected_row = self.sources.len().saturating_sub(1);
        }
        self.update_table_state();
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
        if let Some(group_id) = view_mode.group_id() {
            self.active_group = Some(group_id);
        }
        self.selected_row = 0;
        self.update_table_state();
    }

    pub fn set_active_group(&mut self, group_id: Option<i64>) {
        self.active_group = group_id;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn active_group(&self) -> Option<i64> {
        self.active_group
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn selected_source(&self) -> Option<&Source> {
        self.sources.get(self.selected_row)
    }

    pub fn selected_column(&self) -> Option<ColumnId> {
        self.columns.get(self.selected_column).copied()
    }

    /// Whether the column picker overlay has the keyboard
    pub fn is_picking_columns(&self) -> bool {
        self.picker_cursor.is_some()
    }

    pub fn is_expanded(&self, source_id: &str) -> bool {
        self.expanded.contains(source_id)
    }

    pub fn total_pages(&self) -> u32 {
        let rows = u64::from(self.rows_per_page.max(1));
        let pages = self.total_matches.div_ceil(rows).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Query for `page_number` with the current filters, sort and page size
    pub fn query_for_page(&self, page_number: u32) -> SourceQuery {
        SourceQuery {
            page_number,
            num_per_page: self.rows_per_page,
            sort: self.sort.clone(),
            filters: self.filters.clone(),
        }
    }

    fn fetch_page(&self, page_number: u32) -> Action {
        if !self.pages_server_side() {
            return Action::None;
        }
        Action::FetchSources(self.query_for_page(page_number))
    }

    /// Apply submitted filter form data and go back to the first page
    pub fn apply_filter_form(&mut self, form: FilterForm) -> Action {
        self.filters = normalize_filter_form(&form);
        self.chips = filter_chips(&self.filters);
        self.form_data = form;
        self.selected_chip = None;
        self.selected_row = 0;
        Action::FetchSources(self.query_for_page(FIRST_PAGE))
    }

    /// Drop the filters behind one chip and re-fetch the first page
    pub fn remove_chip_at(&mut self, index: usize) -> Action {
        let Some(label) = self.chips.get(index).cloned() else {
            return Action::None;
        };

        self.filters = remove_chip(&label, &self.filters);
        self.chips = filter_chips(&self.filters);
        self.form_data = FilterForm::from_filter_set(&self.filters);
        self.selected_chip = None;
        self.selected_row = 0;
        Action::FetchSources(self.query_for_page(FIRST_PAGE))
    }

    pub fn clear_filters(&mut self) -> Action {
        self.apply_filter_form(FilterForm::default())
    }

    pub fn next_page(&mut self) -> Action {
        if self.page_number >= self.total_pages() {
            return Action::None;
        }
        self.selected_row = 0;
        self.fetch_page(self.page_number + 1)
    }

    pub fn previous_page(&mut self) -> Action {
        if self.page_number <= FIRST_PAGE {
            return Action::None;
        }
        self.selected_row = 0;
        self.fetch_page(self.page_number - 1)
    }

    /// Group lists are fetched whole, so page size and sort only apply to
    /// the full listing
    fn pages_server_side(&self) -> bool {
        self.view_mode == ViewMode::AllSources
    }

    pub fn cycle_rows_per_page(&mut self) -> Action {
        if !self.pages_server_side() {
            return Action::None;
        }
        let position = ROWS_PER_PAGE_OPTIONS
            .iter()
            .position(|n| *n == self.rows_per_page)
            .unwrap_or(0);
        self.rows_per_page = ROWS_PER_PAGE_OPTIONS[(position + 1) % ROWS_PER_PAGE_OPTIONS.len()];
        self.selected_row = 0;
        self.fetch_page(FIRST_PAGE)
    }

    /// Sort by the selected column, flipping direction if it already sorts
    pub fn sort_by_selected_column(&mut self) -> Action {
        if !self.pages_server_side() {
            return Action::None;
        }
        let Some(field) = self.selected_column().and_then(|c| c.sort_field()) else {
            return Action::None;
        };

        let order = match &self.sort {
            Some(current) if current.field == field => current.order.toggled(),
            _ => SortOrder::Asc,
        };
        self.sort = Some(SortSpec {
            field: field.to_string(),
            order,
        });
        self.fetch_page(FIRST_PAGE)
    }

    pub fn toggle_expanded(&mut self) {
        if let Some(id) = self.selected_source().map(|s| s.id.clone()) {
            if !self.expanded.remove(&id) {
                self.expanded.insert(id);
            }
        }
    }

    /// Show or hide a column, keeping the canonical column order
    pub fn toggle_column(&mut self, column: ColumnId) {
        if self.columns.contains(&column) {
            if self.columns.len() > 1 {
                self.columns.retain(|c| *c != column);
            }
        } else {
            self.columns = ColumnId::ALL
                .iter()
                .copied()
                .filter(|c| *c == column || self.columns.contains(c))
                .collect();
        }
        self.selected_column = self.selected_column.min(self.columns.len().saturating_sub(1));
    }

    fn toggle_favorite(&self) -> Action {
        match self.selected_source() {
            Some(source) => Action::ToggleFavorite {
                source_id: source.id.clone(),
                favorite: !self.favorites.contains(&source.id),
            },
            None => Action::None,
        }
    }

    fn review_selected(&self, decision: SaveRequestDecision) -> Action {
        let ViewMode::Pending(group_id) = self.view_mode else {
            return Action::None;
        };
        match self.selected_source() {
            Some(source) => Action::ReviewSaveRequest {
                source_id: source.id.clone(),
                group_id,
                decision,
            },
            None => Action::None,
        }
    }

    fn navigate_to_group(&self) -> Action {
        let Some(source) = self.selected_source() else {
            return Action::None;
        };
        // Cycle through the source's groups, starting after the active one
        let position = self
            .active_group
            .and_then(|active| source.groups.iter().position(|g| g.id == active));
        let next = match position {
            Some(i) => source.groups.get((i + 1) % source.groups.len()),
            None => source.groups.first(),
        };
        next.map_or(Action::None, |g| Action::NavigateToGroup(g.id))
    }

    fn group_view(&self, pending: bool) -> Action {
        match self.active_group {
            Some(group_id) if pending => Action::SetViewMode(ViewMode::Pending(group_id)),
            Some(group_id) => Action::SetViewMode(ViewMode::Saved(group_id)),
            None => Action::ShowDialog(DialogType::Info(
                "Select a group first (press 'g' on a source)".to_string(),
            )),
        }
    }

    fn update_table_state(&mut self) {
        if self.sources.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(self.selected_row));
        }
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            active_group: self.active_group,
            classifications_in_group_only: self.classifications_in_group_only,
            coordinate_format: self.coordinate_format,
            favorites: &self.favorites,
            date_format: &self.date_format,
            time_format: &self.time_format,
            now: chrono::Utc::now(),
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent, cursor: usize) -> Action {
        let last = ColumnId::ALL.len() - 1;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.picker_cursor = Some((cursor + 1).min(last)),
            KeyCode::Char('k') | KeyCode::Up => self.picker_cursor = Some(cursor.saturating_sub(1)),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_column(ColumnId::ALL[cursor]),
            KeyCode::Esc | KeyCode::Char('v') => self.picker_cursor = None,
            _ => {}
        }
        Action::None
    }

    fn title(&self) -> String {
        match self.view_mode {
            ViewMode::AllSources => format!(" {} ", TITLE_ALL_SOURCES),
            ViewMode::Pending(id) => format!(" {} (group {}) ", TITLE_PENDING_SOURCES, id),
            ViewMode::Saved(id) => format!(" {} (group {}) ", TITLE_SAVED_SOURCES, id),
        }
    }

    fn render_chips(&self, f: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled("Filters: ", Style::default().fg(Color::Gray))];
        if self.chips.is_empty() {
            spans.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
        }
        for (i, chip) in self.chips.iter().enumerate() {
            let style = if self.selected_chip == Some(i) {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            };
            spans.push(Span::styled(format!(" {} ", chip), style));
            spans.push(Span::raw(" "));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(self.title());

        if self.sources.is_empty() {
            let message = if self.loading { LOADING_SOURCES } else { NO_SOURCES };
            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(paragraph, area);
            return;
        }

        let header_cells = self.columns.iter().enumerate().map(|(i, column)| {
            let arrow = match (&self.sort, column.sort_field()) {
                (Some(sort), Some(field)) if sort.field == field => match sort.order {
                    SortOrder::Asc => " ▲",
                    SortOrder::Desc => " ▼",
                },
                _ => "",
            };
            let mut style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
            if i == self.selected_column {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(format!("{}{}", column.label(), arrow)).style(style)
        });
        let header = Row::new(header_cells).height(1);

        let ctx = self.render_context();
        let rows: Vec<Row> = self
            .sources
            .iter()
            .map(|source| {
                let cells = self
                    .columns
                    .iter()
                    .map(|column| styled_cell(render_cell(*column, source, &ctx)));
                Row::new(cells)
            })
            .collect();

        let widths: Vec<Constraint> = self.columns.iter().map(|c| Constraint::Length(c.width())).collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_details(&self, f: &mut Frame, area: Rect, source: &Source) {
        let ctx = self.render_context();
        let items: Vec<ListItem> = render_details(source, &ctx)
            .into_iter()
            .map(|line| match line.heading {
                Some(heading) => ListItem::new(Line::from(Span::styled(
                    heading,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))),
                None => {
                    let mut spans = vec![Span::raw(format!("  {}", line.text))];
                    if let Some(link) = line.link {
                        spans.push(Span::styled(format!("  {}", link), Style::default().fg(Color::Cyan)));
                    }
                    ListItem::new(Line::from(spans))
                }
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", source.id)),
        );
        f.render_widget(list, area);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let tooltip = match (self.selected_source(), self.selected_column()) {
            (Some(source), Some(column)) => render_cell(column, source, &self.render_context()).tooltip,
            _ => None,
        };

        let mut text = format!(
            "Page {}/{} • {} matches • {} rows/page",
            self.page_number,
            self.total_pages(),
            self.total_matches,
            self.rows_per_page
        );
        if let Some(tooltip) = tooltip {
            text.push_str(&format!(" • {}", tooltip));
        }

        f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Gray)), area);
    }

    fn render_picker(&self, f: &mut Frame, area: Rect, cursor: usize) {
        let height = (ColumnId::ALL.len() as u16 + 2).min(area.height);
        let picker_area = Rect::new(
            area.x + area.width.saturating_sub(30),
            area.y,
            30.min(area.width),
            height,
        );
        f.render_widget(Clear, picker_area);

        let items: Vec<ListItem> = ColumnId::ALL
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let mark = if self.columns.contains(column) { "[x]" } else { "[ ]" };
                let label = if column.label().is_empty() { "Favorite" } else { column.label() };
                let style = if i == cursor {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Span::styled(format!("{} {}", mark, label), style))
            })
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Columns "));
        f.render_widget(list, picker_area);
    }
}

fn styled_cell(value: CellValue) -> Cell<'static> {
    let style = match value.emphasis {
        Emphasis::Normal => Style::default().fg(Color::White),
        Emphasis::Strong => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Emphasis::Muted => Style::default().fg(Color::DarkGray),
        Emphasis::Link => Style::default().fg(Color::Cyan),
    };
    Cell::from(value.text).style(style)
}

impl Component for SourceTableComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        if let Some(cursor) = self.picker_cursor {
            return self.handle_picker_key(key, cursor);
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.sources.is_empty() {
                    self.selected_row = (self.selected_row + 1).min(self.sources.len() - 1);
                    self.update_table_state();
                }
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
                self.update_table_state();
                Action::None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
                Action::None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.selected_column = (self.selected_column + 1).min(self.columns.len().saturating_sub(1));
                Action::None
            }
            KeyCode::Char('n') | KeyCode::PageDown => self.next_page(),
            KeyCode::Char('p') | KeyCode::PageUp => self.previous_page(),
            KeyCode::Char('+') => self.cycle_rows_per_page(),
            KeyCode::Char('s') => self.sort_by_selected_column(),
            KeyCode::Enter => {
                self.toggle_expanded();
                Action::None
            }
            KeyCode::Char('f') => Action::ShowDialog(DialogType::FilterForm(self.form_data.clone())),
            KeyCode::Tab => {
                self.selected_chip = match (self.selected_chip, self.chips.len()) {
                    (_, 0) => None,
                    (None, _) => Some(0),
                    (Some(i), n) if i + 1 < n => Some(i + 1),
                    (Some(_), _) => None,
                };
                Action::None
            }
            KeyCode::Char('x') => match self.selected_chip.or(self.chips.len().checked_sub(1)) {
                Some(index) => self.remove_chip_at(index),
                None => Action::None,
            },
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Char('v') => {
                self.picker_cursor = Some(0);
                Action::None
            }
            KeyCode::Char('*') => self.toggle_favorite(),
            KeyCode::Char('a') => self.review_selected(SaveRequestDecision::Accept),
            KeyCode::Char('d') => self.review_selected(SaveRequestDecision::Decline),
            KeyCode::Char('g') => self.navigate_to_group(),
            KeyCode::Char('P') => self.group_view(true),
            KeyCode::Char('S') => self.group_view(false),
            KeyCode::Char('A') => Action::SetViewMode(ViewMode::AllSources),
            _ => Action::None,
        }
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        let expanded_source = self
            .selected_source()
            .filter(|s| self.expanded.contains(&s.id))
            .cloned();

        let mut constraints = vec![Constraint::Length(1), Constraint::Min(5)];
        if expanded_source.is_some() {
            constraints.push(Constraint::Percentage(40));
        }
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(rect);

        self.render_chips(f, chunks[0]);
        self.render_table(f, chunks[1]);
        if let Some(source) = &expanded_source {
            self.render_details(f, chunks[2], source);
        }
        self.render_footer(f, chunks[chunks.len() - 1]);

        if let Some(cursor) = self.picker_cursor {
            self.render_picker(f, chunks[1], cursor);
        }
    }
}
