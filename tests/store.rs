use serde_json::{json, Value};
use sourcedeck::api::{ApiEvent, JsonMap, Method, RequestDescriptor, RequestOptions};
use sourcedeck::constants::ERROR_REQUEST_REJECTED;
use sourcedeck::sources::actions::{
    ACCEPT_SAVE_REQUEST, ADD_TO_FAVORITES, FETCH_FAVORITES, FETCH_PENDING_GROUP_SOURCES, FETCH_SAVED_GROUP_SOURCES,
    FETCH_SOURCES, REMOVE_FROM_FAVORITES,
};
use sourcedeck::sources::SourceStore;

fn object(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

fn request(endpoint: &str, action_type: &str, method: Method, body: Value) -> RequestDescriptor {
    RequestDescriptor::new(endpoint, action_type, method, object(body), RequestOptions::default())
}

fn succeeded(request: &RequestDescriptor, data: Value) -> ApiEvent {
    ApiEvent::Succeeded {
        request_id: request.id(),
        action_type: request.action_type().to_string(),
        payload: object(json!({"status": "success", "data": data})),
    }
}

/// Applies Started followed by a successful terminal event
fn complete(store: &mut SourceStore, request: RequestDescriptor, data: Value) {
    let done = succeeded(&request, data);
    store.apply(&ApiEvent::Started(request));
    store.apply(&done);
}

fn source(id: &str) -> Value {
    json!({"id": id, "ra": 1.0, "dec": 2.0})
}

#[test]
fn test_sources_page_replaces_listing() {
    let mut store = SourceStore::new();

    complete(
        &mut store,
        request("/api/sources", FETCH_SOURCES, Method::Get, json!({"pageNumber": 2})),
        json!({"sources": [source("ZTF1"), source("ZTF2")], "pageNumber": 2, "totalMatches": 42}),
    );

    assert_eq!(store.sources().len(), 2);
    assert_eq!(store.page_number(), 2);
    assert_eq!(store.total_matches(), 42);

    complete(
        &mut store,
        request("/api/sources", FETCH_SOURCES, Method::Get, json!({})),
        json!({"sources": [source("ZTF3")], "totalMatches": 1}),
    );

    assert_eq!(store.sources()[0].id, "ZTF3");
    assert_eq!(store.page_number(), 1);
}

#[test]
fn test_in_flight_tracking() {
    let mut store = SourceStore::new();
    let fetch = request("/api/sources", FETCH_SOURCES, Method::Get, json!({}));
    let done = succeeded(&fetch, json!({"sources": []}));

    store.apply(&ApiEvent::Started(fetch));
    assert!(store.is_loading(FETCH_SOURCES));
    assert!(!store.is_loading(FETCH_FAVORITES));
    assert_eq!(store.in_flight_count(), 1);

    store.apply(&done);
    assert!(!store.is_loading(FETCH_SOURCES));
    assert_eq!(store.in_flight_count(), 0);
}

#[test]
fn test_group_lists_keyed_by_requested_group() {
    let mut store = SourceStore::new();

    complete(
        &mut store,
        request("/api/sources", FETCH_PENDING_GROUP_SOURCES, Method::Get, json!({"group_ids": 7})),
        json!({"sources": [source("ZTF1"), source("ZTF2")]}),
    );
    complete(
        &mut store,
        request("/api/sources", FETCH_SAVED_GROUP_SOURCES, Method::Get, json!({"group_ids": 7})),
        json!({"sources": [source("ZTF9")]}),
    );

    assert_eq!(store.pending(7).len(), 2);
    assert_eq!(store.saved(7)[0].id, "ZTF9");
    assert!(store.pending(8).is_empty());
    assert!(store.saved(8).is_empty());
}

#[test]
fn test_accepted_request_leaves_pending_list() {
    let mut store = SourceStore::new();
    complete(
        &mut store,
        request("/api/sources", FETCH_PENDING_GROUP_SOURCES, Method::Get, json!({"group_ids": 7})),
        json!({"sources": [source("ZTF1"), source("ZTF2")]}),
    );

    complete(
        &mut store,
        request(
            "/api/source_groups/ZTF1",
            ACCEPT_SAVE_REQUEST,
            Method::Patch,
            json!({"groupID": 7, "active": true, "requested": false}),
        ),
        json!({}),
    );

    let remaining: Vec<&str> = store.pending(7).iter().map(|s| s.id.as_str()).collect();
    assert_eq!(remaining, vec!["ZTF2"]);
}

#[test]
fn test_favorites_follow_listing_calls() {
    let mut store = SourceStore::new();

    complete(
        &mut store,
        request("/api/listing", FETCH_FAVORITES, Method::Get, json!({"listName": "favorites"})),
        json!([{"obj_id": "ZTF1", "list_name": "favorites"}, {"obj_id": "ZTF2", "list_name": "favorites"}]),
    );
    assert!(store.is_favorite("ZTF1"));
    assert!(store.is_favorite("ZTF2"));

    complete(
        &mut store,
        request("/api/listing", ADD_TO_FAVORITES, Method::Post, json!({"obj_id": "ZTF3"})),
        json!({}),
    );
    complete(
        &mut store,
        request("/api/listing", REMOVE_FROM_FAVORITES, Method::Delete, json!({"obj_id": "ZTF1"})),
        json!({}),
    );

    let favorites: Vec<&str> = store.favorites().iter().map(String::as_str).collect();
    assert_eq!(favorites, vec!["ZTF2", "ZTF3"]);
}

#[test]
fn test_errors_are_remembered_until_next_success() {
    let mut store = SourceStore::new();
    let rejected = request("/api/sources", FETCH_SOURCES, Method::Get, json!({}));
    store.apply(&ApiEvent::Started(rejected.clone()));
    store.apply(&ApiEvent::Rejected {
        request_id: rejected.id(),
        action_type: FETCH_SOURCES.to_string(),
        message: Some("Invalid page".to_string()),
        payload: JsonMap::new(),
    });
    assert_eq!(store.last_error(), Some("Invalid page"));
    assert_eq!(store.in_flight_count(), 0);

    let silent = request("/api/sources", FETCH_SOURCES, Method::Get, json!({}));
    store.apply(&ApiEvent::Rejected {
        request_id: silent.id(),
        action_type: FETCH_SOURCES.to_string(),
        message: None,
        payload: JsonMap::new(),
    });
    assert_eq!(store.last_error(), Some(ERROR_REQUEST_REJECTED));

    let failed = request("/api/sources", FETCH_SOURCES, Method::Get, json!({}));
    store.apply(&ApiEvent::Started(failed.clone()));
    store.apply(&ApiEvent::Failed {
        request: failed,
        error: "connection refused".to_string(),
    });
    assert_eq!(store.last_error(), Some("connection refused"));
    assert!(!store.is_loading(FETCH_SOURCES));

    complete(
        &mut store,
        request("/api/sources", FETCH_SOURCES, Method::Get, json!({})),
        json!({"sources": []}),
    );
    assert_eq!(store.last_error(), None);
}

#[test]
fn test_undecodable_page_keeps_previous_listing() {
    let mut store = SourceStore::new();
    complete(
        &mut store,
        request("/api/sources", FETCH_SOURCES, Method::Get, json!({})),
        json!({"sources": [source("ZTF1")], "totalMatches": 1}),
    );

    complete(
        &mut store,
        request("/api/sources", FETCH_SOURCES, Method::Get, json!({})),
        json!({"sources": "not a list"}),
    );

    assert_eq!(store.sources()[0].id, "ZTF1");
}
