//! Action dispatcher for backend API calls
//!
//! Every call goes through [`Dispatcher::call`], which emits a `Started` event,
//! performs a single HTTP round trip through a [`Transport`], and then emits
//! exactly one terminal event: `Succeeded`, `Rejected` or `Failed`. The same
//! outcome is returned to the caller so it can fold the result into state it
//! owns instead of relying on the event stream alone.
//!
//! There is no retry, timeout, de-duplication or cancellation here. Callers
//! that need any of these have to build them on top.

pub mod notify;
pub mod transport;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};

use crate::constants::{ERROR_INVALID_ACTION_TYPE, ERROR_REQUEST_REJECTED};

/// JSON object used for request bodies and decoded responses
pub type JsonMap = Map<String, Value>;

/// Suffix of the terminal action emitted when the backend reports success
pub const SUFFIX_OK: &str = "_OK";
/// Suffix of the terminal action emitted when the backend reports an error
pub const SUFFIX_ERROR: &str = "_ERROR";
/// Suffix of the terminal action emitted when the request itself failed
pub const SUFFIX_FAIL: &str = "_FAIL";

/// HTTP verbs accepted by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When to attach the API credentials to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
    /// Only for requests that target the configured backend origin
    #[default]
    SameOrigin,
    /// Always
    Include,
    /// Never
    Omit,
}

/// Caller-supplied transport overrides, merged on top of the defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub credentials: Option<Credentials>,
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Resolved transport settings for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportOptions {
    pub credentials: Credentials,
    pub headers: BTreeMap<String, String>,
    /// Serialized JSON body, absent for GET
    pub body: Option<String>,
}

impl TransportOptions {
    fn build(method: Method, body: &JsonMap, extra: RequestOptions) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.extend(extra.headers);

        let body = match method {
            Method::Get => None,
            _ => Some(Value::Object(body.clone()).to_string()),
        };

        Self {
            credentials: extra.credentials.unwrap_or_default(),
            headers,
            body,
        }
    }
}

/// Everything needed to perform one API call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    id: Uuid,
    endpoint: String,
    action_type: String,
    method: Method,
    body: JsonMap,
    options: TransportOptions,
}

impl RequestDescriptor {
    pub fn new(
        endpoint: impl Into<String>,
        action_type: impl Into<String>,
        method: Method,
        body: JsonMap,
        extra: RequestOptions,
    ) -> Self {
        let options = TransportOptions::build(method, &body, extra);
        Self {
            id: Uuid::new_v4(),
            endpoint: endpoint.into(),
            action_type: action_type.into(),
            method,
            body,
            options,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn body(&self) -> &JsonMap {
        &self.body
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Query parameters for a GET request, flattened from the body.
    ///
    /// Strings are used verbatim, arrays are comma-joined, nulls are skipped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        if self.method != Method::Get {
            return Vec::new();
        }

        self.body
            .iter()
            .filter_map(|(key, value)| query_value(value).map(|v| (key.clone(), v)))
            .collect()
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(items.iter().filter_map(query_value).collect::<Vec<_>>().join(",")),
        other => Some(other.to_string()),
    }
}

/// One step of a request lifecycle, as observed by subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEvent {
    Started(RequestDescriptor),
    Succeeded {
        request_id: Uuid,
        action_type: String,
        payload: JsonMap,
    },
    Rejected {
        request_id: Uuid,
        action_type: String,
        message: Option<String>,
        payload: JsonMap,
    },
    Failed {
        request: RequestDescriptor,
        error: String,
    },
}

impl ApiEvent {
    pub fn action_type(&self) -> &str {
        match self {
            Self::Started(request) => request.action_type(),
            Self::Succeeded { action_type, .. } | Self::Rejected { action_type, .. } => action_type,
            Self::Failed { request, .. } => request.action_type(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        match self {
            Self::Started(request) | Self::Failed { request, .. } => request.id(),
            Self::Succeeded { request_id, .. } | Self::Rejected { request_id, .. } => *request_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started(_))
    }

    /// Action name in the `TYPE`, `TYPE_OK`, `TYPE_ERROR`, `TYPE_FAIL` convention
    pub fn wire_type(&self) -> String {
        let suffix = match self {
            Self::Started(_) => "",
            Self::Succeeded { .. } => SUFFIX_OK,
            Self::Rejected { .. } => SUFFIX_ERROR,
            Self::Failed { .. } => SUFFIX_FAIL,
        };
        format!("{}{}", self.action_type(), suffix)
    }

    /// Render as a flat `{ "type": ..., ... }` record.
    ///
    /// Decoded response fields are spread into the record; `type` always
    /// reflects the event tag even if the payload carries its own `type`.
    pub fn to_wire(&self) -> Value {
        let mut record = match self {
            Self::Started(request) | Self::Failed { request, .. } => {
                let mut map = JsonMap::new();
                map.insert(
                    "parameters".to_string(),
                    serde_json::to_value(request).unwrap_or(Value::Null),
                );
                map
            }
            Self::Succeeded { payload, .. } | Self::Rejected { payload, .. } => payload.clone(),
        };
        record.insert("type".to_string(), Value::String(self.wire_type()));
        Value::Object(record)
    }
}

/// Result of one dispatcher invocation, handed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    Succeeded(JsonMap),
    Rejected { message: Option<String>, payload: JsonMap },
    Failed { request: RequestDescriptor, error: String },
}

impl ApiOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// The `data` member of a successful payload
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Succeeded(payload) => payload.get("data"),
            _ => None,
        }
    }

    fn to_event(&self, request: &RequestDescriptor) -> ApiEvent {
        match self {
            Self::Succeeded(payload) => ApiEvent::Succeeded {
                request_id: request.id(),
                action_type: request.action_type().to_string(),
                payload: payload.clone(),
            },
            Self::Rejected { message, payload } => ApiEvent::Rejected {
                request_id: request.id(),
                action_type: request.action_type().to_string(),
                message: message.clone(),
                payload: payload.clone(),
            },
            Self::Failed { request, error } => ApiEvent::Failed {
                request: request.clone(),
                error: error.clone(),
            },
        }
    }
}

/// Decode a raw response body into an outcome.
///
/// Only a JSON object whose `status` is exactly `"success"` counts as success.
pub fn decode_response(request: &RequestDescriptor, body: &str) -> ApiOutcome {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(payload)) => {
            if payload.get("status").and_then(Value::as_str) == Some("success") {
                ApiOutcome::Succeeded(payload)
            } else {
                let message = payload.get("message").and_then(Value::as_str).map(str::to_string);
                ApiOutcome::Rejected { message, payload }
            }
        }
        Ok(_) => ApiOutcome::Rejected {
            message: None,
            payload: JsonMap::new(),
        },
        Err(e) => ApiOutcome::Failed {
            request: request.clone(),
            error: format!("Invalid JSON in response: {}", e),
        },
    }
}

/// Performs API calls and publishes their lifecycle as [`ApiEvent`]s
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    events: mpsc::UnboundedSender<ApiEvent>,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, mpsc::UnboundedReceiver<ApiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                transport,
                notifier,
                events: tx,
            },
            rx,
        )
    }

    /// Perform one API call.
    ///
    /// An empty `action_type` is reported through the notifier but the
    /// request is still performed.
    pub async fn call(
        &self,
        endpoint: &str,
        action_type: &str,
        method: Method,
        body: JsonMap,
        options: RequestOptions,
    ) -> ApiOutcome {
        if action_type.is_empty() {
            log::warn!("API: {} {} dispatched without an action type", method, endpoint);
            self.notifier.notify(Notification::error(ERROR_INVALID_ACTION_TYPE));
        }

        let request = RequestDescriptor::new(endpoint, action_type, method, body, options);
        log::debug!("API: {} {} started ({})", method, endpoint, request.id());
        self.emit(ApiEvent::Started(request.clone()));

        let outcome = match self.transport.send(&request).await {
            Ok(response) => {
                log::debug!("API: {} {} answered HTTP {}", method, endpoint, response.status);
                decode_response(&request, &response.body)
            }
            Err(e) => ApiOutcome::Failed {
                request: request.clone(),
                error: e.to_string(),
            },
        };

        match &outcome {
            ApiOutcome::Succeeded(_) => {}
            ApiOutcome::Rejected { message, .. } => {
                log::warn!("API: {} {} rejected: {:?}", method, endpoint, message);
                let text = message.clone().unwrap_or_else(|| ERROR_REQUEST_REJECTED.to_string());
                self.notifier.notify(Notification::error(text));
            }
            ApiOutcome::Failed { error, .. } => {
                log::error!("API: {} {} failed: {}", method, endpoint, error);
                self.notifier.notify(Notification::error(error.clone()));
            }
        }

        self.emit(outcome.to_event(&request));
        outcome
    }

    /// Run [`Dispatcher::call`] as an independent task
    pub fn spawn_call(
        &self,
        endpoint: impl Into<String>,
        action_type: impl Into<String>,
        method: Method,
        body: JsonMap,
        options: RequestOptions,
    ) -> JoinHandle<ApiOutcome> {
        let dispatcher = self.clone();
        let endpoint = endpoint.into();
        let action_type = action_type.into();
        tokio::spawn(async move { dispatcher.call(&endpoint, &action_type, method, body, options).await })
    }

    /// GET; the parameters end up in the query string
    pub async fn get(&self, endpoint: &str, action_type: &str, params: JsonMap) -> ApiOutcome {
        self.call(endpoint, action_type, Method::Get, params, RequestOptions::default())
            .await
    }

    pub async fn post(&self, endpoint: &str, action_type: &str, body: JsonMap) -> ApiOutcome {
        self.call(endpoint, action_type, Method::Post, body, RequestOptions::default())
            .await
    }

    pub async fn put(&self, endpoint: &str, action_type: &str, body: JsonMap) -> ApiOutcome {
        self.call(endpoint, action_type, Method::Put, body, RequestOptions::default())
            .await
    }

    pub async fn patch(&self, endpoint: &str, action_type: &str, body: JsonMap) -> ApiOutcome {
        self.call(endpoint, action_type, Method::Patch, body, RequestOptions::default())
            .await
    }

    /// DELETE, optionally with a JSON body (some endpoints identify the
    /// target through the body rather than the path)
    pub async fn delete(&self, endpoint: &str, action_type: &str, body: Option<JsonMap>) -> ApiOutcome {
        self.call(
            endpoint,
            action_type,
            Method::Delete,
            body.unwrap_or_default(),
            RequestOptions::default(),
        )
        .await
    }

    fn emit(&self, event: ApiEvent) {
        // Nobody listening is fine: the outcome is still returned.
        let _ = self.events.send(event);
    }
}
