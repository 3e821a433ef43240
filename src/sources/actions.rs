//! Backend actions for sources, expressed through the dispatcher

use serde_json::{json, Value};

use super::filter::FilterSet;
use crate::api::{ApiOutcome, Dispatcher, JsonMap};
use crate::constants::{DEFAULT_ROWS_PER_PAGE, FAVORITES_LIST_NAME, FIRST_PAGE};

pub const FETCH_SOURCES: &str = "skyportal/FETCH_SOURCES";
pub const FETCH_PENDING_GROUP_SOURCES: &str = "skyportal/FETCH_PENDING_GROUP_SOURCES";
pub const FETCH_SAVED_GROUP_SOURCES: &str = "skyportal/FETCH_SAVED_GROUP_SOURCES";
pub const ACCEPT_SAVE_REQUEST: &str = "skyportal/ACCEPT_SAVE_REQUEST";
pub const DECLINE_SAVE_REQUEST: &str = "skyportal/DECLINE_SAVE_REQUEST";
pub const FETCH_FAVORITES: &str = "skyportal/FETCH_FAVORITES";
pub const ADD_TO_FAVORITES: &str = "skyportal/ADD_TO_FAVORITES";
pub const REMOVE_FROM_FAVORITES: &str = "skyportal/REMOVE_FROM_FAVORITES";

const SOURCES_ENDPOINT: &str = "/api/sources";
const LISTING_ENDPOINT: &str = "/api/listing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Server-side sort: backend field name plus direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// Everything the backend needs to produce one page of sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub page_number: u32,
    pub num_per_page: u32,
    pub sort: Option<SortSpec>,
    pub filters: FilterSet,
}

impl Default for SourceQuery {
    fn default() -> Self {
        Self {
            page_number: FIRST_PAGE,
            num_per_page: DEFAULT_ROWS_PER_PAGE,
            sort: None,
            filters: FilterSet::new(),
        }
    }
}

impl SourceQuery {
    /// Query parameters in the backend's naming
    pub fn to_params(&self) -> JsonMap {
        let mut params = JsonMap::new();
        params.insert("pageNumber".to_string(), json!(self.page_number));
        params.insert("numPerPage".to_string(), json!(self.num_per_page));
        params.insert("totalMatches".to_string(), json!(true));

        if let Some(sort) = &self.sort {
            params.insert("sortBy".to_string(), json!(sort.field));
            params.insert("sortOrder".to_string(), json!(sort.order.as_str()));
        }

        for (key, value) in &self.filters {
            params.insert(key.clone(), Value::String(value.clone()));
        }

        params
    }
}

/// Verdict on a pending request to save a source to a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRequestDecision {
    Accept,
    Decline,
}

impl SaveRequestDecision {
    pub fn action_type(&self) -> &'static str {
        match self {
            Self::Accept => ACCEPT_SAVE_REQUEST,
            Self::Decline => DECLINE_SAVE_REQUEST,
        }
    }
}

pub async fn fetch_sources(dispatcher: &Dispatcher, query: &SourceQuery) -> ApiOutcome {
    dispatcher
        .get(SOURCES_ENDPOINT, FETCH_SOURCES, query.to_params())
        .await
}

pub async fn fetch_pending_group_sources(dispatcher: &Dispatcher, group_id: i64) -> ApiOutcome {
    let mut params = JsonMap::new();
    params.insert("group_ids".to_string(), json!(group_id));
    params.insert("pendingOnly".to_string(), json!(true));
    dispatcher
        .get(SOURCES_ENDPOINT, FETCH_PENDING_GROUP_SOURCES, params)
        .await
}

pub async fn fetch_saved_group_sources(dispatcher: &Dispatcher, group_id: i64) -> ApiOutcome {
    let mut params = JsonMap::new();
    params.insert("group_ids".to_string(), json!(group_id));
    params.insert("savedStatus".to_string(), json!("savedToAllSelected"));
    dispatcher
        .get(SOURCES_ENDPOINT, FETCH_SAVED_GROUP_SOURCES, params)
        .await
}

/// Accept or decline a save request, then re-fetch the group's pending and
/// saved lists so they reflect the server, whatever the verdict's outcome.
pub async fn review_save_request(
    dispatcher: &Dispatcher,
    decision: SaveRequestDecision,
    source_id: &str,
    group_id: i64,
) -> ApiOutcome {
    let mut body = JsonMap::new();
    body.insert("groupID".to_string(), json!(group_id));
    body.insert("active".to_string(), json!(decision == SaveRequestDecision::Accept));
    body.insert("requested".to_string(), json!(false));

    let outcome = dispatcher
        .patch(&format!("/api/source_groups/{}", source_id), decision.action_type(), body)
        .await;

    tokio::join!(
        fetch_pending_group_sources(dispatcher, group_id),
        fetch_saved_group_sources(dispatcher, group_id),
    );

    outcome
}

pub async fn accept_save_request(dispatcher: &Dispatcher, source_id: &str, group_id: i64) -> ApiOutcome {
    review_save_request(dispatcher, SaveRequestDecision::Accept, source_id, group_id).await
}

pub async fn decline_save_request(dispatcher: &Dispatcher, source_id: &str, group_id: i64) -> ApiOutcome {
    review_save_request(dispatcher, SaveRequestDecision::Decline, source_id, group_id).await
}

pub async fn fetch_favorites(dispatcher: &Dispatcher) -> ApiOutcome {
    let mut params = JsonMap::new();
    params.insert("listName".to_string(), json!(FAVORITES_LIST_NAME));
    dispatcher.get(LISTING_ENDPOINT, FETCH_FAVORITES, params).await
}

fn listing_body(source_id: &str) -> JsonMap {
    let mut body = JsonMap::new();
    body.insert("obj_id".to_string(), json!(source_id));
    body.insert("list_name".to_string(), json!(FAVORITES_LIST_NAME));
    body
}

pub async fn add_to_favorites(dispatcher: &Dispatcher, source_id: &str) -> ApiOutcome {
    dispatcher
        .post(LISTING_ENDPOINT, ADD_TO_FAVORITES, listing_body(source_id))
        .await
}

/// The listing endpoint identifies the entry through the DELETE body
pub async fn remove_from_favorites(dispatcher: &Dispatcher, source_id: &str) -> ApiOutcome {
    dispatcher
        .delete(LISTING_ENDPOINT, REMOVE_FROM_FAVORITES, Some(listing_body(source_id)))
        .await
}
