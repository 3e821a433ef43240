use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;
use sourcedeck::api::{Method, NotificationLevel, RequestDescriptor, Transport, TransportError, TransportResponse};
use sourcedeck::config::Config;
use sourcedeck::constants::SUCCESS_FAVORITE_ADDED;
use sourcedeck::logger::Logger;
use sourcedeck::ui::core::{EventType, ViewMode};
use sourcedeck::ui::AppComponent;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Minimal backend: a fixed listing, favorites, and an error for group 13
#[derive(Default)]
struct FakeBackend {
    seen: Mutex<Vec<RequestDescriptor>>,
}

impl FakeBackend {
    fn requests(&self) -> Vec<RequestDescriptor> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        self.seen.lock().unwrap().push(request.clone());

        let group = request.body().get("group_ids").and_then(|v| v.as_i64());
        let body = match (request.method(), request.endpoint()) {
            (Method::Get, "/api/sources") if group == Some(13) => {
                json!({"status": "error", "message": "Unknown group"})
            }
            (Method::Get, "/api/sources") => json!({
                "status": "success",
                "data": {
                    "sources": [
                        {"id": "ZTF1", "ra": 1.0, "dec": 2.0, "groups": [{"id": 4, "name": "Program"}]},
                        {"id": "ZTF2", "ra": 3.0, "dec": 4.0}
                    ],
                    "pageNumber": request.body().get("pageNumber").cloned().unwrap_or(json!(1)),
                    "totalMatches": 30
                }
            }),
            (Method::Get, "/api/listing") => json!({"status": "success", "data": [{"obj_id": "ZTF2"}]}),
            _ => json!({"status": "success", "data": {}}),
        };

        Ok(TransportResponse {
            status: 200,
            body: body.to_string(),
        })
    }
}

fn key(c: char) -> EventType {
    EventType::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn new_app() -> (AppComponent, Arc<FakeBackend>) {
    let backend = Arc::new(FakeBackend::default());
    let app = AppComponent::new(&Config::default(), backend.clone(), Logger::new());
    (app, backend)
}

/// Tick until `done` holds, as the render loop would
async fn settle(app: &mut AppComponent, done: impl Fn(&AppComponent) -> bool) {
    for _ in 0..200 {
        app.process_background_events();
        if done(app) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("background work did not settle");
}

#[tokio::test]
async fn test_initial_load_fills_table_and_favorites() {
    let (mut app, _backend) = new_app();

    app.trigger_initial_load();
    settle(&mut app, |a| a.active_task_count() == 0 && a.store().in_flight_count() == 0).await;

    assert_eq!(app.store().sources().len(), 2);
    assert!(app.store().is_favorite("ZTF2"));
    assert_eq!(app.table().total_pages(), 3);
    assert_eq!(app.table().selected_source().map(|s| s.id.as_str()), Some("ZTF1"));
}

#[tokio::test]
async fn test_next_page_requests_page_two() {
    let (mut app, backend) = new_app();
    app.trigger_initial_load();
    settle(&mut app, |a| a.store().sources().len() == 2).await;

    app.handle_event(key('n')).unwrap();
    settle(&mut app, |a| a.store().page_number() == 2).await;

    let last = backend.requests().into_iter().last().unwrap();
    assert_eq!(last.body().get("pageNumber"), Some(&json!(2)));
}

#[tokio::test]
async fn test_favorite_toggle_updates_store_and_notifies() {
    let (mut app, backend) = new_app();
    app.trigger_initial_load();
    settle(&mut app, |a| a.store().sources().len() == 2).await;

    app.handle_event(key('*')).unwrap();
    settle(&mut app, |a| a.store().is_favorite("ZTF1") && a.notice().is_some()).await;

    assert_eq!(app.notice().map(|n| n.message.as_str()), Some(SUCCESS_FAVORITE_ADDED));
    assert!(backend
        .requests()
        .iter()
        .any(|r| r.method() == Method::Post && r.endpoint() == "/api/listing"));
}

#[tokio::test]
async fn test_pending_view_for_selected_group() {
    let (mut app, backend) = new_app();
    app.trigger_initial_load();
    settle(&mut app, |a| a.store().sources().len() == 2).await;

    app.handle_event(key('g')).unwrap();
    assert_eq!(app.table().active_group(), Some(4));

    app.handle_event(key('P')).unwrap();
    assert_eq!(app.table().view_mode(), ViewMode::Pending(4));
    settle(&mut app, |a| a.store().pending(4).len() == 2).await;

    let pending_fetch = backend
        .requests()
        .into_iter()
        .find(|r| r.body().get("pendingOnly").is_some())
        .unwrap();
    assert_eq!(pending_fetch.body().get("group_ids"), Some(&json!(4)));

    app.handle_event(key('a')).unwrap();
    settle(&mut app, |a| a.active_task_count() == 0 && a.store().in_flight_count() == 0).await;
    assert!(backend
        .requests()
        .iter()
        .any(|r| r.method() == Method::Patch && r.endpoint() == "/api/source_groups/ZTF1"));
}

#[tokio::test]
async fn test_group_view_leaves_listing_query_untouched() {
    let (mut app, backend) = new_app();
    app.trigger_initial_load();
    settle(&mut app, |a| a.store().sources().len() == 2).await;

    app.handle_event(key('g')).unwrap();
    app.handle_event(key('P')).unwrap();
    settle(&mut app, |a| a.store().pending(4).len() == 2).await;

    // Page size and sort keys do nothing while browsing a group list
    app.handle_event(key('+')).unwrap();
    app.handle_event(key('l')).unwrap();
    app.handle_event(key('s')).unwrap();
    assert_eq!(app.table().rows_per_page, 10);
    assert_eq!(app.table().sort, None);

    app.handle_event(key('A')).unwrap();
    settle(&mut app, |a| a.active_task_count() == 0 && a.store().in_flight_count() == 0).await;

    let listing = backend
        .requests()
        .into_iter()
        .filter(|r| r.body().contains_key("numPerPage"))
        .last()
        .unwrap();
    assert_eq!(listing.body().get("numPerPage"), Some(&json!(app.table().rows_per_page)));
    assert_eq!(listing.body().get("sortBy"), None);
    assert_eq!(app.table().total_pages(), 3);
}

#[tokio::test]
async fn test_back_to_listing_uses_current_table_settings() {
    let (mut app, backend) = new_app();
    app.trigger_initial_load();
    settle(&mut app, |a| a.store().sources().len() == 2).await;

    app.handle_event(key('+')).unwrap();
    app.handle_event(key('l')).unwrap();
    app.handle_event(key('s')).unwrap();
    app.handle_event(key('g')).unwrap();
    app.handle_event(key('S')).unwrap();
    app.handle_event(key('A')).unwrap();
    settle(&mut app, |a| a.active_task_count() == 0 && a.store().in_flight_count() == 0).await;

    let listing = backend
        .requests()
        .into_iter()
        .filter(|r| r.body().contains_key("numPerPage"))
        .last()
        .unwrap();
    assert_eq!(listing.body().get("numPerPage"), Some(&json!(25)));
    assert_eq!(listing.body().get("sortBy"), Some(&json!("id")));
}

#[tokio::test]
async fn test_rejected_request_surfaces_error_notice() {
    let (mut app, _backend) = new_app();

    app.handle_app_action(sourcedeck::ui::core::Action::SetViewMode(ViewMode::Saved(13)));
    settle(&mut app, |a| a.notice().is_some()).await;

    assert!(app.has_error_notice());
    assert_eq!(app.notice().map(|n| n.level), Some(NotificationLevel::Error));
    assert_eq!(app.store().last_error(), Some("Unknown group"));
}

#[tokio::test]
async fn test_quit_keys() {
    let (mut app, _backend) = new_app();
    app.handle_event(key('q')).unwrap();
    assert!(app.should_quit());

    let (mut app, _backend) = new_app();
    app.handle_event(EventType::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)))
        .unwrap();
    assert!(app.should_quit());
}

#[tokio::test]
async fn test_dialog_takes_keys_first() {
    let (mut app, _backend) = new_app();

    app.handle_event(key('?')).unwrap();
    assert!(app.dialog().is_visible());

    // 'q' closes help instead of quitting
    app.handle_event(key('q')).unwrap();
    assert!(!app.dialog().is_visible());
    assert!(!app.should_quit());
}
