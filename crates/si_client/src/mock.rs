//! Mock transport for deterministic client testing
//!
//! Provides canned responses without network calls. Responses are consumed in
//! order; if none is queued the call fails, which catches test setup
//! mistakes. Every request is recorded for assertions.

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

/// Transport that replays queued responses.
///
/// Clones share the same queue and request log, so a test can keep a handle
/// after moving a clone into a client.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<ApiResponse>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock with a successful `/whoami` already queued.
    pub fn authenticated(workspace_id: &str) -> Self {
        let mock = Self::new();
        mock.queue_whoami(workspace_id);
        mock
    }

    pub fn queue_response(&self, response: ApiResponse) {
        lock(&self.responses).push_back(response);
    }

    pub fn queue_json(&self, status: u16, body: Value) {
        self.queue_response(ApiResponse::json(status, &body));
    }

    pub fn queue_whoami(&self, workspace_id: &str) {
        self.queue_json(
            200,
            json!({
                "userId": "user-1",
                "userEmail": "dev@example.test",
                "workspaceId": workspace_id,
                "token": {"role": "owner"},
            }),
        );
    }

    /// Responses for a lookup that misses followed by a create.
    pub fn queue_new_change_set(&self, id: &str, name: &str) {
        self.queue_json(200, json!({"changeSets": []}));
        self.queue_json(200, json!({"changeSet": {"id": id, "name": name}}));
    }

    /// Response for a lookup that finds `name`.
    pub fn queue_existing_change_set(&self, id: &str, name: &str) {
        self.queue_json(200, json!({"changeSets": [{"id": id, "name": name}]}));
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Requests matching a method whose path ends with `suffix`.
    pub fn requests_to(&self, method: Method, suffix: &str) -> Vec<ApiRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(suffix))
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn responses_remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        lock(&self.requests).push(request.clone());
        lock(&self.responses).pop_front().ok_or_else(|| {
            ClientError::Transport(format!(
                "no canned response queued for {} {}",
                request.method, request.path
            ))
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
