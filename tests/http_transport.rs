use axum::{
    extract::State,
    http::{HeaderMap, Method as HttpMethod, StatusCode, Uri},
    Json, Router,
};
use serde_json::{json, Value};
use sourcedeck::api::{
    ChannelNotifier, Credentials, Dispatcher, HttpTransport, JsonMap, Method, RequestDescriptor, RequestOptions,
    Transport,
};
use sourcedeck::sources::actions;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Recorder {
    fn all(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(recorder): State<Recorder>,
    method: HttpMethod,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    recorder.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
    });

    if uri.path() == "/api/broken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": "Invalid group"})),
        );
    }
    (StatusCode::OK, Json(json!({"status": "success", "data": {}})))
}

async fn spawn_backend() -> (String, Recorder) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorder = Recorder::default();
    let app = Router::new().fallback(record).with_state(recorder.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), recorder)
}

fn body(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

#[tokio::test]
async fn test_get_encodes_body_into_query() {
    let (url, recorder) = spawn_backend().await;
    let transport = HttpTransport::new(&url, None).unwrap();

    let request = RequestDescriptor::new(
        "/api/sources",
        "FETCH_SOURCES",
        Method::Get,
        body(json!({"pageNumber": 2, "sourceID": "ZTF 21", "group_ids": [1, 2]})),
        RequestOptions::default(),
    );
    let response = transport.send(&request).await.unwrap();
    assert_eq!(response.status, 200);

    let seen = recorder.all();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/api/sources");
    let query = seen[0].query.clone().unwrap();
    assert!(query.contains("pageNumber=2"));
    assert!(query.contains("sourceID=ZTF+21"));
    assert!(query.contains("group_ids=1%2C2"));
    assert!(seen[0].body.is_empty());
}

#[tokio::test]
async fn test_delete_serializes_body() {
    let (url, recorder) = spawn_backend().await;
    let transport = Arc::new(HttpTransport::new(&url, Some("secret".to_string())).unwrap());
    let (notifier, _notifications) = ChannelNotifier::new();
    let (dispatcher, _events) = Dispatcher::new(transport, Arc::new(notifier));

    let outcome = actions::remove_from_favorites(&dispatcher, "ZTF21abcdefg").await;
    assert!(outcome.is_success());

    let seen = recorder.all();
    assert_eq!(seen[0].method, "DELETE");
    assert_eq!(seen[0].path, "/api/listing");
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    let sent: Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(sent, json!({"obj_id": "ZTF21abcdefg", "list_name": "favorites"}));
}

#[tokio::test]
async fn test_declining_refetches_group_lists() {
    let (url, recorder) = spawn_backend().await;
    let transport = Arc::new(HttpTransport::new(&url, None).unwrap());
    let (notifier, _notifications) = ChannelNotifier::new();
    let (dispatcher, _events) = Dispatcher::new(transport, Arc::new(notifier));

    let outcome = actions::decline_save_request(&dispatcher, "ZTF21abc", 5).await;
    assert!(outcome.is_success());

    let seen = recorder.all();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].method, "PATCH");
    assert_eq!(seen[0].path, "/api/source_groups/ZTF21abc");
    let sent: Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(sent, json!({"groupID": 5, "active": false, "requested": false}));

    let queries: Vec<String> = seen[1..].iter().filter_map(|r| r.query.clone()).collect();
    assert!(queries.iter().any(|q| q.contains("pendingOnly=true")));
    assert!(queries.iter().any(|q| q.contains("savedStatus=savedToAllSelected")));
}

#[tokio::test]
async fn test_error_body_is_decoded_despite_http_status() {
    let (url, _recorder) = spawn_backend().await;
    let transport = Arc::new(HttpTransport::new(&url, None).unwrap());
    let (notifier, mut notifications) = ChannelNotifier::new();
    let (dispatcher, _events) = Dispatcher::new(transport, Arc::new(notifier));

    let outcome = dispatcher.post("/api/broken", "SAVE", JsonMap::new()).await;

    assert!(!outcome.is_success());
    assert_eq!(notifications.try_recv().unwrap().message, "Invalid group");
}

#[tokio::test]
async fn test_token_only_sent_to_same_origin() {
    let (base, home) = spawn_backend().await;
    let (elsewhere_url, elsewhere) = spawn_backend().await;
    let transport = HttpTransport::new(&base, Some("abc123".to_string())).unwrap();

    let local = RequestDescriptor::new("/api/sources", "A", Method::Get, JsonMap::new(), RequestOptions::default());
    let remote = RequestDescriptor::new(
        format!("{}/api/sources", elsewhere_url),
        "B",
        Method::Get,
        JsonMap::new(),
        RequestOptions::default(),
    );
    let remote_included = RequestDescriptor::new(
        format!("{}/api/sources", elsewhere_url),
        "C",
        Method::Get,
        JsonMap::new(),
        RequestOptions::default().with_credentials(Credentials::Include),
    );

    transport.send(&local).await.unwrap();
    transport.send(&remote).await.unwrap();
    transport.send(&remote_included).await.unwrap();

    assert_eq!(home.all()[0].authorization.as_deref(), Some("token abc123"));
    assert_eq!(elsewhere.all()[0].authorization, None);
    assert_eq!(elsewhere.all()[1].authorization.as_deref(), Some("token abc123"));
}

#[tokio::test]
async fn test_unreachable_backend_fails() {
    // Bind and drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let transport = Arc::new(HttpTransport::new(&format!("http://{addr}"), None).unwrap());
    let (notifier, mut notifications) = ChannelNotifier::new();
    let (dispatcher, mut events) = Dispatcher::new(transport, Arc::new(notifier));

    let outcome = dispatcher.get("/api/sources", "FETCH_SOURCES", JsonMap::new()).await;

    assert!(matches!(outcome, sourcedeck::api::ApiOutcome::Failed { .. }));
    assert!(notifications.try_recv().is_ok());
    events.try_recv().unwrap();
    assert_eq!(events.try_recv().unwrap().wire_type(), "FETCH_SOURCES_FAIL");
}

#[test]
fn test_invalid_base_url_is_rejected() {
    assert!(HttpTransport::new("not a url", None).is_err());
}
