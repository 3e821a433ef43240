use crate::api::{ApiEvent, ChannelNotifier, Dispatcher, Notification, NotificationLevel, Notifier, Transport};
use crate::config::Config;
use crate::constants::{
    FIRST_PAGE, SUCCESS_FAVORITE_ADDED, SUCCESS_FAVORITE_REMOVED, SUCCESS_SAVE_REQUEST_ACCEPTED,
    SUCCESS_SAVE_REQUEST_DECLINED,
};
use crate::logger::Logger;
use crate::sources::actions::{self, FETCH_PENDING_GROUP_SOURCES, FETCH_SAVED_GROUP_SOURCES, FETCH_SOURCES};
use crate::sources::{SaveRequestDecision, SourceQuery, SourceStore};
use crate::ui::components::{DialogComponent, SourceTableComponent, StatusBar};
use crate::ui::core::{
    actions::{Action, DialogType, ViewMode},
    event_handler::EventType,
    task_manager::TaskManager,
    Component,
};
use crate::ui::layout::LayoutManager;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Root component: owns the source store and turns actions into API calls.
///
/// Every request runs as its own task through the [`TaskManager`]. Their
/// lifecycle events arrive on `api_rx` and are folded into the store on the
/// next tick, after which the table is refreshed from the store.
pub struct AppComponent {
    // Component composition
    table: SourceTableComponent,
    dialog: DialogComponent,

    // Application state
    store: SourceStore,
    last_query: SourceQuery,
    notice: Option<Notification>,

    // Services
    dispatcher: Dispatcher,
    notifier: Arc<ChannelNotifier>,
    api_rx: mpsc::UnboundedReceiver<ApiEvent>,
    notification_rx: mpsc::UnboundedReceiver<Notification>,
    task_manager: TaskManager,
    logger: Logger,

    should_quit: bool,
}

impl AppComponent {
    pub fn new(config: &Config, transport: Arc<dyn Transport>, logger: Logger) -> Self {
        let (notifier, notification_rx) = ChannelNotifier::new();
        let notifier = Arc::new(notifier);
        let (dispatcher, api_rx) = Dispatcher::new(transport, notifier.clone());

        let table = SourceTableComponent::new(config);
        let last_query = table.query_for_page(FIRST_PAGE);

        let mut dialog = DialogComponent::new();
        dialog.set_logger(logger.clone());

        Self {
            table,
            dialog,
            store: SourceStore::new(),
            last_query,
            notice: None,
            dispatcher,
            notifier,
            api_rx,
            notification_rx,
            task_manager: TaskManager::new(),
            logger,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn store(&self) -> &SourceStore {
        &self.store
    }

    pub fn table(&self) -> &SourceTableComponent {
        &self.table
    }

    pub fn dialog(&self) -> &DialogComponent {
        &self.dialog
    }

    pub fn notice(&self) -> Option<&Notification> {
        self.notice.as_ref()
    }

    /// Whether the latest notice is an error
    pub fn has_error_notice(&self) -> bool {
        self.notice
            .as_ref()
            .is_some_and(|n| n.level == NotificationLevel::Error)
    }

    /// Get the number of active background tasks
    pub fn active_task_count(&self) -> usize {
        self.task_manager.task_count()
    }

    /// Fetch the first page and the favorites listing
    pub fn trigger_initial_load(&mut self) {
        self.logger.log("AppComponent: Starting initial load".to_string());
        self.fetch_sources(self.last_query.clone());

        let dispatcher = self.dispatcher.clone();
        self.task_manager
            .spawn_request("Fetch favorites".to_string(), async move {
                actions::fetch_favorites(&dispatcher).await
            });
    }

    /// Fold finished API events and notifications into state.
    ///
    /// Returns how many API events were applied.
    pub fn process_background_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.api_rx.try_recv() {
            log::debug!("Event: {}", event.wire_type());
            self.store.apply(&event);
            applied += 1;
        }

        while let Ok(notification) = self.notification_rx.try_recv() {
            self.logger.log(format!("Notification: {}", notification.message));
            self.notice = Some(notification);
        }

        let finished = self.task_manager.cleanup_finished_tasks();
        if !finished.is_empty() {
            self.logger
                .log(format!("Background: Cleaned up {} finished tasks", finished.len()));
        }

        if applied > 0 {
            self.sync_component_data();
        }
        applied
    }

    /// Push the store's data for the current view into the table
    fn sync_component_data(&mut self) {
        let view_mode = self.table.view_mode();
        let (sources, page_number, total_matches, loading) = match view_mode {
            ViewMode::AllSources => (
                self.store.sources().to_vec(),
                self.store.page_number(),
                self.store.total_matches(),
                self.store.is_loading(FETCH_SOURCES),
            ),
            ViewMode::Pending(group_id) => {
                let sources = self.store.pending(group_id).to_vec();
                let total = sources.len() as u64;
                (sources, FIRST_PAGE, total, self.store.is_loading(FETCH_PENDING_GROUP_SOURCES))
            }
            ViewMode::Saved(group_id) => {
                let sources = self.store.saved(group_id).to_vec();
                let total = sources.len() as u64;
                (sources, FIRST_PAGE, total, self.store.is_loading(FETCH_SAVED_GROUP_SOURCES))
            }
        };

        self.table
            .update_data(sources, page_number, total_matches, self.store.favorites().clone(), loading);
    }

    fn fetch_sources(&mut self, query: SourceQuery) {
        self.last_query = query.clone();
        let description = format!("Fetch sources page {}", query.page_number);
        let dispatcher = self.dispatcher.clone();
        self.task_manager.spawn_request(description, async move {
            actions::fetch_sources(&dispatcher, &query).await
        });
    }

    fn fetch_group_view(&mut self, view_mode: ViewMode) {
        let dispatcher = self.dispatcher.clone();
        match view_mode {
            ViewMode::AllSources => {
                // The table's page size and sort are authoritative; keep the page
                let query = self.table.query_for_page(self.last_query.page_number);
                self.fetch_sources(query);
            }
            ViewMode::Pending(group_id) => {
                self.task_manager
                    .spawn_request(format!("Fetch pending sources for group {}", group_id), async move {
                        actions::fetch_pending_group_sources(&dispatcher, group_id).await
                    });
            }
            ViewMode::Saved(group_id) => {
                self.task_manager
                    .spawn_request(format!("Fetch saved sources for group {}", group_id), async move {
                        actions::fetch_saved_group_sources(&dispatcher, group_id).await
                    });
            }
        }
    }

    /// Handle global keyboard shortcuts that aren't component-specific
    fn handle_global_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => {
                self.logger.log("Global key: 'q' - quitting application".to_string());
                Action::Quit
            }
            KeyCode::Char('?') => Action::ShowDialog(DialogType::Help),
            KeyCode::Char('G') => {
                self.logger.log("Global key: 'G' - opening logs dialog".to_string());
                Action::ShowDialog(DialogType::Logs)
            }
            KeyCode::Char('r') => Action::Refresh,
            _ => Action::None,
        }
    }

    /// Resolve one app-level action; may yield a follow-up action
    pub fn handle_app_action(&mut self, action: Action) -> Action {
        match action {
            Action::Quit => {
                self.should_quit = true;
                Action::None
            }
            Action::FetchSources(query) => {
                if self.table.view_mode() != ViewMode::AllSources {
                    // Filters and paging apply to the full listing
                    self.table.set_view_mode(ViewMode::AllSources);
                }
                self.fetch_sources(query);
                Action::None
            }
            Action::ApplyFilters(form) => {
                self.logger.log(format!("Applying filters: {:?}", form));
                self.table.apply_filter_form(form)
            }
            Action::ToggleFavorite { source_id, favorite } => {
                let dispatcher = self.dispatcher.clone();
                let notifier = self.notifier.clone();
                let description = format!("Toggle favorite {} -> {}", source_id, favorite);
                self.task_manager.spawn_request(description, async move {
                    let outcome = if favorite {
                        actions::add_to_favorites(&dispatcher, &source_id).await
                    } else {
                        actions::remove_from_favorites(&dispatcher, &source_id).await
                    };
                    if outcome.is_success() {
                        let message = if favorite { SUCCESS_FAVORITE_ADDED } else { SUCCESS_FAVORITE_REMOVED };
                        notifier.notify(Notification::info(message));
                    }
                    outcome
                });
                Action::None
            }
            Action::ReviewSaveRequest {
                source_id,
                group_id,
                decision,
            } => {
                let dispatcher = self.dispatcher.clone();
                let notifier = self.notifier.clone();
                let description = format!("{:?} save request {} for group {}", decision, source_id, group_id);
                self.task_manager.spawn_request(description, async move {
                    let outcome = actions::review_save_request(&dispatcher, decision, &source_id, group_id).await;
                    if outcome.is_success() {
                        let message = match decision {
                            SaveRequestDecision::Accept => SUCCESS_SAVE_REQUEST_ACCEPTED,
                            SaveRequestDecision::Decline => SUCCESS_SAVE_REQUEST_DECLINED,
                        };
                        notifier.notify(Notification::info(message));
                    }
                    outcome
                });
                Action::None
            }
            Action::NavigateToGroup(group_id) => {
                self.table.set_active_group(Some(group_id));
                self.notice = Some(Notification::info(format!("Active group: {}", group_id)));
                match self.table.view_mode() {
                    ViewMode::Pending(_) => Action::SetViewMode(ViewMode::Pending(group_id)),
                    ViewMode::Saved(_) => Action::SetViewMode(ViewMode::Saved(group_id)),
                    ViewMode::AllSources => Action::None,
                }
            }
            Action::SetViewMode(view_mode) => {
                self.table.set_view_mode(view_mode);
                self.fetch_group_view(view_mode);
                self.sync_component_data();
                Action::None
            }
            Action::Refresh => {
                self.fetch_group_view(self.table.view_mode());
                Action::None
            }
            Action::ShowDialog(_) | Action::HideDialog | Action::None => Action::None,
        }
    }

    /// Process an event through the component hierarchy
    pub fn handle_event(&mut self, event_type: EventType) -> anyhow::Result<()> {
        let action = match event_type {
            EventType::Key(key) => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    Action::Quit
                } else if self.dialog.is_visible() {
                    // Dialog has priority when visible
                    self.dialog.handle_key_events(key)
                } else if self.table.is_picking_columns() {
                    self.table.handle_key_events(key)
                } else {
                    self.notice = None;
                    match self.handle_global_key(key) {
                        Action::None => self.table.handle_key_events(key),
                        global => global,
                    }
                }
            }
            EventType::Resize(_, _) | EventType::Tick | EventType::Other => Action::None,
        };

        let mut action = self.update(action);
        while !matches!(action, Action::None) {
            action = self.handle_app_action(action);
            action = self.update(action);
        }

        Ok(())
    }
}

impl Component for AppComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        // This shouldn't be called directly - use handle_event instead
        self.handle_global_key(key)
    }

    fn update(&mut self, action: Action) -> Action {
        self.dialog.update(action)
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        let chunks = LayoutManager::main_layout(rect);

        self.table.render(f, chunks[0]);

        StatusBar::render(f, chunks[1], self.store.in_flight_count(), self.notice.as_ref());

        // Render dialog on top if visible (includes help dialog)
        if self.dialog.is_visible() {
            self.dialog.render(f, rect);
        }
    }
}
