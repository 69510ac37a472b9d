//! axum-side adapters: the persisted token travels in the page URL.

use std::collections::{BTreeMap, HashMap};

use axum::http::HeaderMap;

use super::error::FilterFormError;
use super::host::{PersistentState, RequestContext};

/// Persistent parameters of a page, kept in its query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    params: BTreeMap<String, String>,
}

impl QueryState {
    pub fn from_params(params: HashMap<String, String>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn set_param(&mut self, key: &str, value: impl Into<String>) {
        self.params.insert(key.to_string(), value.into());
    }

    pub fn remove_param(&mut self, key: &str) {
        self.params.remove(key);
    }

    pub fn to_query_string(&self) -> String {
        serde_qs::to_string(&self.params).unwrap_or_else(|e| {
            tracing::warn!("Failed to encode persistent parameters, dropping them: {}", e);
            String::new()
        })
    }

    /// Link to `path` that keeps every persistent parameter
    pub fn link(&self, path: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query)
        }
    }
}

impl PersistentState for QueryState {
    fn get(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => self.set_param(key, value),
            None => self.remove_param(key),
        }
    }
}

/// Request seen by the control, remembers whether a redirect to self was asked for
#[derive(Debug, Clone, Default)]
pub struct HttpRequestContext {
    ajax: bool,
    redirect_requested: bool,
}

impl HttpRequestContext {
    pub fn new(ajax: bool) -> Self {
        Self {
            ajax,
            redirect_requested: false,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(is_ajax(headers))
    }

    pub fn redirect_requested(&self) -> bool {
        self.redirect_requested
    }
}

impl RequestContext for HttpRequestContext {
    fn is_ajax(&self) -> bool {
        self.ajax
    }

    fn redirect_this(&mut self) -> Result<(), FilterFormError> {
        if self.ajax {
            return Err(FilterFormError::Redirect(
                "AJAX requests are patched in place".to_string(),
            ));
        }
        self.redirect_requested = true;
        Ok(())
    }
}

/// `X-Requested-With: XMLHttpRequest`, as sent by the page script
pub fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.eq_ignore_ascii_case("XMLHttpRequest"))
}
