//! Hand-driven collaborator doubles
//!
//! Every call records a request and parks its [`TokenSource`]. Tests take
//! the sources back out and complete them, so they decide exactly which
//! tick observes a completion.

use crate::provider::AnchorProvider;
use enklu_core::token::pair;
use enklu_core::{AsyncToken, HttpResponse, HttpService, TokenSource};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// ANCHOR PROVIDER
// =============================================================================

#[derive(Default)]
pub struct FakeAnchorProvider {
    exports: Mutex<VecDeque<(String, TokenSource<Vec<u8>>)>>,
    imports: Mutex<VecDeque<(String, Vec<u8>, TokenSource<()>)>>,
    export_calls: Mutex<usize>,
    import_calls: Mutex<usize>,
}

impl FakeAnchorProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest outstanding export as `(anchor_id, source)`
    pub fn take_export(&self) -> Option<(String, TokenSource<Vec<u8>>)> {
        lock(&self.exports).pop_front()
    }

    /// Oldest outstanding import as `(anchor_id, bytes, source)`
    pub fn take_import(&self) -> Option<(String, Vec<u8>, TokenSource<()>)> {
        lock(&self.imports).pop_front()
    }

    pub fn pending_exports(&self) -> usize {
        lock(&self.exports).len()
    }

    pub fn pending_imports(&self) -> usize {
        lock(&self.imports).len()
    }

    pub fn export_calls(&self) -> usize {
        *lock(&self.export_calls)
    }

    pub fn import_calls(&self) -> usize {
        *lock(&self.import_calls)
    }
}

impl AnchorProvider for FakeAnchorProvider {
    fn export(&self, anchor_id: &str) -> AsyncToken<Vec<u8>> {
        let (source, token) = pair();
        *lock(&self.export_calls) += 1;
        lock(&self.exports).push_back((anchor_id.to_string(), source));
        token
    }

    fn import(&self, anchor_id: &str, bytes: Vec<u8>) -> AsyncToken<()> {
        let (source, token) = pair();
        *lock(&self.import_calls) += 1;
        lock(&self.imports).push_back((anchor_id.to_string(), bytes, source));
        token
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// A request seen by [`FakeHttpService`]
#[derive(Clone, Debug, PartialEq)]
pub struct FakeRequest {
    pub method: &'static str,
    pub url: String,
    pub file_name: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct FakeHttpService {
    pending: Mutex<VecDeque<(FakeRequest, TokenSource<HttpResponse>)>>,
    history: Mutex<Vec<FakeRequest>>,
}

impl FakeHttpService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest outstanding request and its source
    pub fn take_request(&self) -> Option<(FakeRequest, TokenSource<HttpResponse>)> {
        lock(&self.pending).pop_front()
    }

    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Every request issued so far, in order
    pub fn history(&self) -> Vec<FakeRequest> {
        lock(&self.history).clone()
    }

    fn issue(
        &self,
        method: &'static str,
        url: &str,
        file_name: Option<&str>,
        body: Vec<u8>,
    ) -> AsyncToken<HttpResponse> {
        let request = FakeRequest {
            method,
            url: url.to_string(),
            file_name: file_name.map(str::to_string),
            body,
        };
        let (source, token) = pair();
        lock(&self.history).push(request.clone());
        lock(&self.pending).push_back((request, source));
        token
    }
}

impl HttpService for FakeHttpService {
    fn get(&self, url: &str) -> AsyncToken<HttpResponse> {
        self.issue("GET", url, None, Vec::new())
    }

    fn post(&self, url: &str, json: serde_json::Value) -> AsyncToken<HttpResponse> {
        self.issue("POST", url, None, json.to_string().into_bytes())
    }

    fn put(&self, url: &str, json: serde_json::Value) -> AsyncToken<HttpResponse> {
        self.issue("PUT", url, None, json.to_string().into_bytes())
    }

    fn delete(&self, url: &str) -> AsyncToken<HttpResponse> {
        self.issue("DELETE", url, None, Vec::new())
    }

    fn post_file(&self, url: &str, file_name: &str, bytes: Vec<u8>) -> AsyncToken<HttpResponse> {
        self.issue("POST", url, Some(file_name), bytes)
    }

    fn download(&self, url: &str) -> AsyncToken<HttpResponse> {
        self.issue("GET", url, None, Vec::new())
    }
}
