//! State folded from dispatcher events
//!
//! Events are applied in arrival order. Two overlapping requests resolve as
//! "last terminal event wins"; the store does not try to sequence them.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use super::actions::{
    ACCEPT_SAVE_REQUEST, ADD_TO_FAVORITES, DECLINE_SAVE_REQUEST, FETCH_FAVORITES, FETCH_PENDING_GROUP_SOURCES,
    FETCH_SAVED_GROUP_SOURCES, FETCH_SOURCES, REMOVE_FROM_FAVORITES,
};
use super::{Source, SourcesPage};
use crate::api::{ApiEvent, JsonMap, RequestDescriptor};
use crate::constants::ERROR_REQUEST_REJECTED;

#[derive(Debug, Default)]
pub struct SourceStore {
    page: SourcesPage,
    pending: HashMap<i64, Vec<Source>>,
    saved: HashMap<i64, Vec<Source>>,
    favorites: BTreeSet<String>,
    in_flight: HashMap<Uuid, RequestDescriptor>,
    last_error: Option<String>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &[Source] {
        &self.page.sources
    }

    pub fn page_number(&self) -> u32 {
        self.page.page_number
    }

    pub fn total_matches(&self) -> u64 {
        self.page.total_matches
    }

    pub fn pending(&self, group_id: i64) -> &[Source] {
        self.pending.get(&group_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn saved(&self, group_id: i64) -> &[Source] {
        self.saved.get(&group_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn favorites(&self) -> &BTreeSet<String> {
        &self.favorites
    }

    pub fn is_favorite(&self, source_id: &str) -> bool {
        self.favorites.contains(source_id)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether any request of `action_type` is still waiting for its terminal event
    pub fn is_loading(&self, action_type: &str) -> bool {
        self.in_flight.values().any(|r| r.action_type() == action_type)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn apply(&mut self, event: &ApiEvent) {
        match event {
            ApiEvent::Started(request) => {
                self.in_flight.insert(request.id(), request.clone());
            }
            ApiEvent::Succeeded {
                request_id,
                action_type,
                payload,
            } => {
                let request = self.in_flight.remove(request_id);
                self.last_error = None;
                self.apply_success(action_type, request.as_ref(), payload);
            }
            ApiEvent::Rejected {
                request_id, message, ..
            } => {
                self.in_flight.remove(request_id);
                self.last_error = Some(message.clone().unwrap_or_else(|| ERROR_REQUEST_REJECTED.to_string()));
            }
            ApiEvent::Failed { request, error } => {
                self.in_flight.remove(&request.id());
                self.last_error = Some(error.clone());
            }
        }
    }

    fn apply_success(&mut self, action_type: &str, request: Option<&RequestDescriptor>, payload: &JsonMap) {
        let data = payload.get("data").cloned().unwrap_or(Value::Null);

        match action_type {
            FETCH_SOURCES => match serde_json::from_value::<SourcesPage>(data) {
                Ok(page) => self.page = page,
                Err(e) => log::warn!("Store: could not decode sources page: {}", e),
            },
            FETCH_PENDING_GROUP_SOURCES | FETCH_SAVED_GROUP_SOURCES => {
                let Some(group_id) = request.and_then(request_group_id) else {
                    log::warn!("Store: {} finished without a known group", action_type);
                    return;
                };
                let sources = match serde_json::from_value::<SourcesPage>(data) {
                    Ok(page) => page.sources,
                    Err(e) => {
                        log::warn!("Store: could not decode group sources: {}", e);
                        return;
                    }
                };
                if action_type == FETCH_PENDING_GROUP_SOURCES {
                    self.pending.insert(group_id, sources);
                } else {
                    self.saved.insert(group_id, sources);
                }
            }
            ACCEPT_SAVE_REQUEST | DECLINE_SAVE_REQUEST => {
                // The follow-up fetches replace both lists; drop the row now so
                // it does not linger until they land.
                if let Some(request) = request {
                    let source_id = request.endpoint().rsplit('/').next().unwrap_or_default();
                    if let Some(group_id) = request.body().get("groupID").and_then(Value::as_i64) {
                        if let Some(list) = self.pending.get_mut(&group_id) {
                            list.retain(|s| s.id != source_id);
                        }
                    }
                }
            }
            FETCH_FAVORITES => {
                if let Value::Array(entries) = data {
                    self.favorites = entries
                        .iter()
                        .filter_map(|e| e.get("obj_id").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect();
                }
            }
            ADD_TO_FAVORITES => {
                if let Some(id) = request.and_then(request_obj_id) {
                    self.favorites.insert(id);
                }
            }
            REMOVE_FROM_FAVORITES => {
                if let Some(id) = request.and_then(request_obj_id) {
                    self.favorites.remove(&id);
                }
            }
            other => log::debug!("Store: ignoring {}", other),
        }
    }
}

fn request_group_id(request: &RequestDescriptor) -> Option<i64> {
    request.body().get("group_ids").and_then(Value::as_i64)
}

fn request_obj_id(request: &RequestDescriptor) -> Option<String> {
    request.body().get("obj_id").and_then(Value::as_str).map(str::to_string)
}
